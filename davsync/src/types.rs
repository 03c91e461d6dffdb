// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use url::Url;

use crate::error::DavError;

/// Resource href as returned by the server.
///
/// An `Href` is kept exactly as it appeared in a multistatus response, such as
/// `/calendars/user/event1.ics`. It must be resolved against the account root
/// before being compared with any other URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Entity tag for change detection.
///
/// An `ETag` is an opaque, strong or weak validator returned by the server,
/// used for optimistic concurrency control on writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        Self(etag)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// The protocol an account speaks.
///
/// Everything that differs between calendars and contacts hangs off this
/// type; see the strategy methods in the `protocol` module.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AccountKind {
    /// `CalDAV` (RFC 4791): calendars of events, todos and journals.
    #[serde(rename = "caldav")]
    #[default]
    CalDav,
    /// `CardDAV` (RFC 6352): address books of vCards.
    #[serde(rename = "carddav")]
    CardDav,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

/// A `CalDAV` or `CardDAV` account.
///
/// An account starts out holding only the server URL the user entered and is
/// then resolved stage by stage: root URL, principal URL, home URL and
/// finally collections. Every `with_*` method consumes the account and
/// returns a new value, so an account handed out is never modified behind
/// the holder's back.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    server_url: Url,
    kind: AccountKind,
    #[serde(default)]
    root_url: Option<Url>,
    #[serde(default)]
    principal_url: Option<Url>,
    #[serde(default)]
    home_url: Option<Url>,
    #[serde(default)]
    collections: Vec<Collection>,
}

impl Account {
    /// Creates an unresolved account.
    #[must_use]
    pub const fn new(server_url: Url, kind: AccountKind) -> Self {
        Self {
            server_url,
            kind,
            root_url: None,
            principal_url: None,
            home_url: None,
            collections: Vec::new(),
        }
    }

    /// The server URL the account was created with.
    #[must_use]
    pub const fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// The protocol of the account.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        self.kind
    }

    /// The service root resolved by well-known discovery.
    #[must_use]
    pub const fn root_url(&self) -> Option<&Url> {
        self.root_url.as_ref()
    }

    /// The current user principal.
    #[must_use]
    pub const fn principal_url(&self) -> Option<&Url> {
        self.principal_url.as_ref()
    }

    /// The calendar or address book home.
    #[must_use]
    pub const fn home_url(&self) -> Option<&Url> {
        self.home_url.as_ref()
    }

    /// Collections loaded under the home URL.
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Consumes the account, returning its collections.
    #[must_use]
    pub fn into_collections(self) -> Vec<Collection> {
        self.collections
    }

    /// Returns the account with its root URL set.
    #[must_use]
    pub fn with_root_url(self, root_url: Url) -> Self {
        Self {
            root_url: Some(root_url),
            ..self
        }
    }

    /// Returns the account with its principal URL set.
    #[must_use]
    pub fn with_principal_url(self, principal_url: Url) -> Self {
        Self {
            principal_url: Some(principal_url),
            ..self
        }
    }

    /// Returns the account with its home URL set.
    #[must_use]
    pub fn with_home_url(self, home_url: Url) -> Self {
        Self {
            home_url: Some(home_url),
            ..self
        }
    }

    /// Returns the account with its collections replaced.
    #[must_use]
    pub fn with_collections(self, collections: Vec<Collection>) -> Self {
        Self {
            collections,
            ..self
        }
    }

    pub(crate) fn require_root(&self) -> Result<&Url, DavError> {
        self.root_url
            .as_ref()
            .ok_or_else(|| DavError::Precondition(vec!["root_url"]))
    }

    /// Returns `(root_url, principal_url)`.
    pub(crate) fn require_principal(&self) -> Result<(&Url, &Url), DavError> {
        match (&self.root_url, &self.principal_url) {
            (Some(root), Some(principal)) => Ok((root, principal)),
            (root, principal) => Err(DavError::Precondition(missing([
                ("principal_url", principal.is_none()),
                ("root_url", root.is_none()),
            ]))),
        }
    }

    /// Returns `(root_url, home_url)`.
    pub(crate) fn require_home(&self) -> Result<(&Url, &Url), DavError> {
        match (&self.root_url, &self.home_url) {
            (Some(root), Some(home)) => Ok((root, home)),
            (root, home) => Err(DavError::Precondition(missing([
                ("root_url", root.is_none()),
                ("home_url", home.is_none()),
            ]))),
        }
    }
}

fn missing<const N: usize>(fields: [(&'static str, bool); N]) -> Vec<&'static str> {
    fields
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect()
}

/// A calendar or address book collection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Collection {
    /// Absolute URL of the collection; its identity.
    pub url: Url,
    /// Whether this is a calendar or an address book.
    pub kind: AccountKind,
    /// The display name.
    pub display_name: Option<String>,
    /// The calendar or address book description.
    pub description: Option<String>,
    /// The calendar timezone (`VTIMEZONE` text), calendars only.
    pub timezone: Option<String>,
    /// The collection tag (`CTag`) for change detection.
    pub ctag: Option<String>,
    /// The RFC 6578 sync token.
    pub sync_token: Option<String>,
    /// Supported component types (VEVENT, VTODO, etc.).
    #[serde(default)]
    pub supported_components: Vec<String>,
    /// REPORT names the server advertises for this collection.
    #[serde(default)]
    pub supported_reports: Vec<String>,
    /// Resource types, e.g. `collection` and `calendar`.
    #[serde(default)]
    pub resource_types: Vec<String>,
    /// Member objects, only filled when explicitly loaded.
    #[serde(default)]
    pub objects: Vec<CollectionObject>,
}

impl Collection {
    /// Creates a new `Collection` with no metadata.
    #[must_use]
    pub const fn new(url: Url, kind: AccountKind) -> Self {
        Self {
            url,
            kind,
            display_name: None,
            description: None,
            timezone: None,
            ctag: None,
            sync_token: None,
            supported_components: Vec::new(),
            supported_reports: Vec::new(),
            resource_types: Vec::new(),
            objects: Vec::new(),
        }
    }
}

/// A calendar object or vCard stored in a collection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CollectionObject {
    /// Absolute URL of the object.
    pub url: Url,
    /// Whether the body is iCalendar or vCard.
    pub kind: AccountKind,
    /// The entity tag, when the server reported one.
    pub etag: Option<ETag>,
    /// The raw iCalendar or vCard text.
    pub data: String,
}

impl CollectionObject {
    /// Creates a new `CollectionObject`.
    #[must_use]
    pub const fn new(url: Url, kind: AccountKind, etag: Option<ETag>, data: String) -> Self {
        Self {
            url,
            kind,
            etag,
            data,
        }
    }
}
