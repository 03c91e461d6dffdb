// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use url::Url;

use crate::error::DavError;
use crate::types::{Account, AccountKind};

/// Authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// Server and transport configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DavConfig {
    /// URL of the `CalDAV`/`CardDAV` server, as entered by the user.
    pub server_url: String,
    /// Which protocol the account speaks.
    #[serde(default)]
    pub account_type: AccountKind,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds. Requests never time out when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("davsync/", env!("CARGO_PKG_VERSION")).to_string()
}

impl DavConfig {
    /// Builds the unresolved account described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `server_url` is not an absolute URL.
    pub fn account(&self) -> Result<Account, DavError> {
        let url = Url::parse(&self.server_url)
            .map_err(|e| DavError::Config(format!("invalid server URL {}: {e}", self.server_url)))?;
        Ok(Account::new(url, self.account_type))
    }
}

impl Default for DavConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            account_type: AccountKind::default(),
            auth: AuthMethod::default(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

/// What the account bootstrap should load after resolving the home URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fetch the collections under the home URL.
    pub collections: bool,
    /// Fetch every collection's objects. Implies `collections`.
    pub objects: bool,
}

impl LoadOptions {
    /// Resolve discovery only.
    pub const DISCOVERY_ONLY: Self = Self {
        collections: false,
        objects: false,
    };

    /// Resolve discovery and list collections.
    pub const COLLECTIONS: Self = Self {
        collections: true,
        objects: false,
    };

    /// Resolve discovery, list collections and fetch all their objects.
    pub const EVERYTHING: Self = Self {
        collections: true,
        objects: true,
    };

    pub(crate) const fn wants_collections(self) -> bool {
        self.collections || self.objects
    }
}
