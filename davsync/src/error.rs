// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;
use url::Url;

/// `CalDAV`/`CardDAV` client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    /// Required account fields are missing; no request was sent.
    #[error("Missing required account fields: {}", .0.join(", "))]
    Precondition(Vec<&'static str>),

    /// Network-level failure while talking to the server.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with an unexpected HTTP status.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Status code returned by the server.
        status: StatusCode,
        /// Response body or reason.
        message: String,
    },

    /// Conditional write rejected; the object changed on the server.
    #[error("Stale ETag for {0}, re-fetch the object before retrying")]
    StaleETag(Url),

    /// The resource to create already exists.
    #[error("Resource already exists: {0}")]
    Conflict(Url),

    /// XML parsing/writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// A URL or href could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<quick_xml::Error> for DavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<url::ParseError> for DavError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<std::io::Error> for DavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(format!("IO error: {e}"))
    }
}
