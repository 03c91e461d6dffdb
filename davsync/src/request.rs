// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request body builders for `CalDAV` and `CardDAV` operations.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::DavError;
use crate::types::AccountKind;
use crate::xml::{Namespace, declare_namespaces, finish, new_writer};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Properties that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// `ETag`.
    GetETag,
    /// Collection tag (calendar server extension).
    GetCTag,
    /// RFC 6578 sync token.
    SyncToken,
    /// Current user principal (RFC 5397).
    CurrentUserPrincipal,
    /// Reports supported on a resource.
    SupportedReportSet,
    /// Calendar data.
    CalendarData,
    /// Calendar home set.
    CalendarHomeSet,
    /// Supported calendar components.
    SupportedCalendarComponents,
    /// Calendar description.
    CalendarDescription,
    /// Calendar timezone.
    CalendarTimezone,
    /// vCard data.
    AddressData,
    /// Address book home set.
    AddressbookHomeSet,
    /// Address book description.
    AddressbookDescription,
}

impl Prop {
    /// Local element name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::GetETag => "getetag",
            Self::GetCTag => "getctag",
            Self::SyncToken => "sync-token",
            Self::CurrentUserPrincipal => "current-user-principal",
            Self::SupportedReportSet => "supported-report-set",
            Self::CalendarData => "calendar-data",
            Self::CalendarHomeSet => "calendar-home-set",
            Self::SupportedCalendarComponents => "supported-calendar-component-set",
            Self::CalendarDescription => "calendar-description",
            Self::CalendarTimezone => "calendar-timezone",
            Self::AddressData => "address-data",
            Self::AddressbookHomeSet => "addressbook-home-set",
            Self::AddressbookDescription => "addressbook-description",
        }
    }

    /// Namespace the property lives in.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::DisplayName
            | Self::ResourceType
            | Self::GetETag
            | Self::SyncToken
            | Self::CurrentUserPrincipal
            | Self::SupportedReportSet => Namespace::Dav,
            Self::GetCTag => Namespace::CalendarServer,
            Self::CalendarData
            | Self::CalendarHomeSet
            | Self::SupportedCalendarComponents
            | Self::CalendarDescription
            | Self::CalendarTimezone => Namespace::CalDav,
            Self::AddressData | Self::AddressbookHomeSet | Self::AddressbookDescription => {
                Namespace::CardDav
            }
        }
    }

    fn qualified(self) -> String {
        self.namespace().qualify(self.name())
    }
}

/// Writes `<D:prop>` with one empty element per property.
fn write_props(writer: &mut XmlWriter, props: &[Prop]) -> Result<(), DavError> {
    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
    for prop in props {
        let name = prop.qualified();
        writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
    Ok(())
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), DavError> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Adds several properties to the request.
    pub fn add_properties(&mut self, props: &[Prop]) -> &mut Self {
        self.props.extend_from_slice(props);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = new_writer();

        // <D:propfind xmlns:D="DAV:" ...>
        let mut propfind = BytesStart::new("D:propfind");
        declare_namespaces(
            &mut propfind,
            std::iter::once(Namespace::Dav).chain(self.props.iter().map(|p| p.namespace())),
        );
        writer.write_event(Event::Start(propfind))?;
        write_props(&mut writer, &self.props)?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        finish(writer)
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Time range filter for calendar queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    /// Start date/time, UTC (e.g. `20250101T000000Z`).
    pub start: String,
    /// End date/time, UTC.
    pub end: Option<String>,
}

/// Filter of a `calendar-query` or `addressbook-query` REPORT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFilter {
    /// Calendar component filter nested inside `VCALENDAR`.
    Component {
        /// Component name (VEVENT, VTODO, ...).
        name: String,
        /// Optional time range the component must overlap.
        time_range: Option<TimeRange>,
    },
    /// vCard property filter; matches cards that carry the property.
    Property {
        /// Property name (FN, EMAIL, ...).
        name: String,
    },
}

impl ObjectFilter {
    /// Component filter without a time range.
    #[must_use]
    pub fn component(name: impl Into<String>) -> Self {
        Self::Component {
            name: name.into(),
            time_range: None,
        }
    }

    /// vCard property filter.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property { name: name.into() }
    }

    /// Restricts a component filter to a time range. No-op on property filters.
    #[must_use]
    pub fn time_range(self, start: String, end: Option<String>) -> Self {
        match self {
            Self::Component { name, .. } => Self::Component {
                name,
                time_range: Some(TimeRange { start, end }),
            },
            other @ Self::Property { .. } => other,
        }
    }

    /// The protocol this filter applies to.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        match self {
            Self::Component { .. } => AccountKind::CalDav,
            Self::Property { .. } => AccountKind::CardDav,
        }
    }

    fn write(&self, writer: &mut XmlWriter) -> Result<(), DavError> {
        match self {
            Self::Component { name, time_range } => {
                // <C:filter><C:comp-filter name="VCALENDAR"><C:comp-filter name="...">
                writer.write_event(Event::Start(BytesStart::new("C:filter")))?;
                let mut calendar = BytesStart::new("C:comp-filter");
                calendar.push_attribute(("name", "VCALENDAR"));
                writer.write_event(Event::Start(calendar))?;

                let mut component = BytesStart::new("C:comp-filter");
                component.push_attribute(("name", name.as_str()));
                writer.write_event(Event::Start(component))?;
                if let Some(tr) = time_range {
                    let mut range = BytesStart::new("C:time-range");
                    range.push_attribute(("start", tr.start.as_str()));
                    if let Some(end) = &tr.end {
                        range.push_attribute(("end", end.as_str()));
                    }
                    writer.write_event(Event::Empty(range))?;
                }
                writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;

                writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
                writer.write_event(Event::End(BytesEnd::new("C:filter")))?;
            }
            Self::Property { name } => {
                // <CR:filter><CR:prop-filter name="..."/></CR:filter>
                writer.write_event(Event::Start(BytesStart::new("CR:filter")))?;
                let mut prop_filter = BytesStart::new("CR:prop-filter");
                prop_filter.push_attribute(("name", name.as_str()));
                writer.write_event(Event::Empty(prop_filter))?;
                writer.write_event(Event::End(BytesEnd::new("CR:filter")))?;
            }
        }
        Ok(())
    }
}

/// `calendar-query` / `addressbook-query` REPORT builder.
#[derive(Debug)]
pub struct ObjectQueryRequest {
    kind: AccountKind,
    filter: ObjectFilter,
}

impl ObjectQueryRequest {
    /// Creates a query with the protocol's default filter.
    #[must_use]
    pub fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            filter: kind.default_filter(),
        }
    }

    /// Replaces the filter.
    #[must_use]
    pub fn filter(mut self, filter: ObjectFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builds the XML body for the query.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = new_writer();
        let namespace = self.kind.namespace();
        let root = namespace.qualify(self.kind.query_report());

        // <C:calendar-query xmlns:C=... xmlns:D="DAV:">
        let mut query = BytesStart::new(root.as_str());
        declare_namespaces(&mut query, [Namespace::Dav, namespace]);
        writer.write_event(Event::Start(query))?;
        write_props(&mut writer, &[Prop::GetETag, self.kind.data_prop()])?;
        self.filter.write(&mut writer)?;
        writer.write_event(Event::End(BytesEnd::new(root.as_str())))?;

        finish(writer)
    }
}

/// `calendar-multiget` / `addressbook-multiget` REPORT builder.
#[derive(Debug)]
pub struct MultiGetRequest {
    kind: AccountKind,
    hrefs: Vec<String>,
}

impl MultiGetRequest {
    /// Creates a new multiget request.
    #[must_use]
    pub const fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            hrefs: Vec::new(),
        }
    }

    /// Adds an href to the request.
    pub fn add_href(&mut self, href: String) -> &mut Self {
        self.hrefs.push(href);
        self
    }

    /// Whether no href was added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty()
    }

    /// Builds the XML body for the multiget request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = new_writer();
        let namespace = self.kind.namespace();
        let root = namespace.qualify(self.kind.multiget_report());

        let mut multiget = BytesStart::new(root.as_str());
        declare_namespaces(&mut multiget, [Namespace::Dav, namespace]);
        writer.write_event(Event::Start(multiget))?;
        write_props(&mut writer, &[Prop::GetETag, self.kind.data_prop()])?;
        for href in &self.hrefs {
            write_text_element(&mut writer, "D:href", href)?;
        }
        writer.write_event(Event::End(BytesEnd::new(root.as_str())))?;

        finish(writer)
    }
}

/// MKCALENDAR request builder.
#[derive(Debug)]
pub struct MkCalendarRequest {
    display_name: String,
    description: Option<String>,
}

impl MkCalendarRequest {
    /// Creates a new MKCALENDAR request.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: None,
        }
    }

    /// Sets the calendar description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the XML body for the MKCALENDAR request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = new_writer();

        // <C:mkcalendar xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:D="DAV:">
        let mut mkcalendar = BytesStart::new("C:mkcalendar");
        declare_namespaces(&mut mkcalendar, [Namespace::Dav, Namespace::CalDav]);
        writer.write_event(Event::Start(mkcalendar))?;
        writer.write_event(Event::Start(BytesStart::new("D:set")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        write_text_element(&mut writer, "D:displayname", &self.display_name)?;
        if let Some(desc) = &self.description {
            write_text_element(&mut writer, "C:calendar-description", desc)?;
        }

        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:set")))?;
        writer.write_event(Event::End(BytesEnd::new("C:mkcalendar")))?;

        finish(writer)
    }
}

/// RFC 6578 `sync-collection` REPORT builder.
#[derive(Debug)]
pub struct SyncCollectionRequest {
    sync_token: Option<String>,
    props: Vec<Prop>,
}

impl SyncCollectionRequest {
    /// Creates a request; `None` asks for an initial full listing.
    #[must_use]
    pub fn new(sync_token: Option<String>) -> Self {
        Self {
            sync_token,
            props: vec![Prop::GetETag],
        }
    }

    /// Builds the XML body for the sync-collection request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, DavError> {
        let mut writer = new_writer();

        let mut sync = BytesStart::new("D:sync-collection");
        declare_namespaces(
            &mut sync,
            std::iter::once(Namespace::Dav).chain(self.props.iter().map(|p| p.namespace())),
        );
        writer.write_event(Event::Start(sync))?;
        write_text_element(
            &mut writer,
            "D:sync-token",
            self.sync_token.as_deref().unwrap_or_default(),
        )?;
        write_text_element(&mut writer, "D:sync-level", "1")?;
        write_props(&mut writer, &self.props)?;
        writer.write_event(Event::End(BytesEnd::new("D:sync-collection")))?;

        finish(writer)
    }
}
