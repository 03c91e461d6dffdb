// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Per-protocol strategy.
//!
//! Discovery, collection listing and object retrieval share one skeleton for
//! `CalDAV` and `CardDAV`. The pieces that differ (property names, resource
//! type, content type, default filter) are answered by [`AccountKind`].

use crate::request::{ObjectFilter, Prop};
use crate::response::Properties;
use crate::types::{AccountKind, Href};
use crate::xml::Namespace;

/// Calendar components this library knows how to handle.
pub const SUPPORTED_COMPONENTS: [&str; 3] = ["VEVENT", "VTODO", "VJOURNAL"];

const CALENDAR_PROPS: &[Prop] = &[
    Prop::CalendarDescription,
    Prop::CalendarTimezone,
    Prop::DisplayName,
    Prop::GetCTag,
    Prop::ResourceType,
    Prop::SupportedCalendarComponents,
    Prop::SyncToken,
];

const ADDRESSBOOK_PROPS: &[Prop] = &[
    Prop::AddressbookDescription,
    Prop::DisplayName,
    Prop::GetCTag,
    Prop::ResourceType,
    Prop::SyncToken,
];

impl AccountKind {
    /// Service name, also the `/.well-known/` path segment.
    #[must_use]
    pub const fn service_name(self) -> &'static str {
        match self {
            Self::CalDav => "caldav",
            Self::CardDav => "carddav",
        }
    }

    /// Namespace of the protocol-specific elements.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::CalDav => Namespace::CalDav,
            Self::CardDav => Namespace::CardDav,
        }
    }

    /// Property holding the home collection on the principal.
    #[must_use]
    pub const fn home_set_prop(self) -> Prop {
        match self {
            Self::CalDav => Prop::CalendarHomeSet,
            Self::CardDav => Prop::AddressbookHomeSet,
        }
    }

    /// Property holding an object's body.
    #[must_use]
    pub const fn data_prop(self) -> Prop {
        match self {
            Self::CalDav => Prop::CalendarData,
            Self::CardDav => Prop::AddressData,
        }
    }

    /// Resource type marking a collection of this protocol.
    #[must_use]
    pub const fn collection_type(self) -> &'static str {
        match self {
            Self::CalDav => "calendar",
            Self::CardDav => "addressbook",
        }
    }

    /// Properties requested when listing collections.
    #[must_use]
    pub const fn collection_props(self) -> &'static [Prop] {
        match self {
            Self::CalDav => CALENDAR_PROPS,
            Self::CardDav => ADDRESSBOOK_PROPS,
        }
    }

    /// Local name of the query REPORT.
    #[must_use]
    pub const fn query_report(self) -> &'static str {
        match self {
            Self::CalDav => "calendar-query",
            Self::CardDav => "addressbook-query",
        }
    }

    /// Local name of the multiget REPORT.
    #[must_use]
    pub const fn multiget_report(self) -> &'static str {
        match self {
            Self::CalDav => "calendar-multiget",
            Self::CardDav => "addressbook-multiget",
        }
    }

    /// Content type of object bodies.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::CalDav => "text/calendar; charset=utf-8",
            Self::CardDav => "text/vcard; charset=utf-8",
        }
    }

    /// File extension of object resources.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::CalDav => "ics",
            Self::CardDav => "vcf",
        }
    }

    /// Filter used when the caller does not supply one: every event of a
    /// calendar, every card with a formatted name of an address book.
    #[must_use]
    pub fn default_filter(self) -> ObjectFilter {
        match self {
            Self::CalDav => ObjectFilter::component("VEVENT"),
            Self::CardDav => ObjectFilter::property("FN"),
        }
    }

    /// A fresh, random object file name such as `{uuid}.ics`.
    #[must_use]
    pub fn object_filename(self) -> String {
        format!("{}.{}", uuid::Uuid::new_v4(), self.extension())
    }

    pub(crate) const fn home_set(self, props: &Properties) -> Option<&Href> {
        match self {
            Self::CalDav => props.calendar_home_set.as_ref(),
            Self::CardDav => props.addressbook_home_set.as_ref(),
        }
    }

    pub(crate) fn object_data(self, props: &Properties) -> Option<&str> {
        match self {
            Self::CalDav => props.calendar_data.as_deref(),
            Self::CardDav => props.address_data.as_deref(),
        }
    }

    pub(crate) const fn description(self, props: &Properties) -> Option<&String> {
        match self {
            Self::CalDav => props.calendar_description.as_ref(),
            Self::CardDav => props.addressbook_description.as_ref(),
        }
    }

    /// Whether a listed resource is a collection this protocol can use.
    ///
    /// Calendars must also advertise at least one supported component; a
    /// missing or empty component set excludes the calendar.
    pub(crate) fn accepts_collection(self, props: &Properties) -> bool {
        let is_collection = props
            .resource_type
            .as_ref()
            .is_some_and(|types| types.iter().any(|t| t == self.collection_type()));
        match self {
            Self::CalDav => {
                is_collection
                    && props
                        .supported_calendar_components
                        .as_ref()
                        .is_some_and(|comps| {
                            comps
                                .iter()
                                .any(|c| SUPPORTED_COMPONENTS.contains(&c.as_str()))
                        })
            }
            Self::CardDav => is_collection,
        }
    }
}
