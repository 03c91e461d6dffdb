// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for `CalDAV` (RFC 4791) and `CardDAV` (RFC 6352) servers.
//!
//! Resolves an account from a bare server URL, lists its calendars or
//! address books, reads and writes their objects and reconciles a locally
//! cached collection list with the server.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod client;
mod collection;
mod config;
mod discovery;
mod error;
mod http;
mod object;
mod protocol;
mod request;
mod response;
mod sync;
mod types;
mod urls;
mod xml;

pub use crate::client::DavClient;
pub use crate::config::{AuthMethod, DavConfig, LoadOptions};
pub use crate::error::DavError;
pub use crate::http::{Depth, HttpClient};
pub use crate::object::WriteResponse;
pub use crate::protocol::SUPPORTED_COMPONENTS;
pub use crate::request::{
    MkCalendarRequest, MultiGetRequest, ObjectFilter, ObjectQueryRequest, Prop, PropFindRequest,
    SyncCollectionRequest, TimeRange,
};
pub use crate::response::{MultiStatusResponse, PropStat, Properties, ResponseRecord};
pub use crate::sync::{
    ChangedObject, CollectionChanges, CollectionDelta, reconcile_collections,
};
pub use crate::types::{Account, AccountKind, Collection, CollectionObject, ETag, Href};
pub use crate::urls::{resolve, urls_match};
pub use crate::xml::{Namespace, ns};
