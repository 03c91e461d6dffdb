// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV`/`CardDAV` client.

use std::sync::Arc;

use crate::config::DavConfig;
use crate::error::DavError;
use crate::http::HttpClient;

/// Client for `CalDAV` and `CardDAV` servers.
///
/// Operations are spread over several modules: discovery and the account
/// bootstrap, collection listing, object retrieval and mutation, and sync.
///
/// # Example
///
/// ```ignore
/// use davsync::{AuthMethod, DavClient, DavConfig, LoadOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DavConfig {
///     server_url: "https://dav.example.com".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = DavClient::new(&config)?;
/// let account = client
///     .create_account(config.account()?, LoadOptions::COLLECTIONS)
///     .await?;
/// for calendar in account.collections() {
///     println!("{}", calendar.url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DavClient {
    pub(crate) http: Arc<HttpClient>,
}

impl DavClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: &DavConfig) -> Result<Self, DavError> {
        let http = HttpClient::new(config)?;
        Ok(Self {
            http: Arc::new(http),
        })
    }
}
