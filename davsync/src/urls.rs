// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! URL resolution and comparison.
//!
//! Servers are free to answer with relative or absolute hrefs, with or
//! without a trailing slash on collections. Everything is resolved against
//! the account root first and compared with [`urls_match`].

use url::Url;

use crate::error::DavError;

/// Resolves a server href against `base`.
///
/// Absolute hrefs are returned as-is (after normalization by the parser).
///
/// # Errors
///
/// Returns an error if the href cannot be joined onto `base`.
pub fn resolve(base: &Url, href: &str) -> Result<Url, DavError> {
    base.join(href.trim())
        .map_err(|e| DavError::InvalidUrl(format!("{href} (relative to {base}): {e}")))
}

/// Compares two resolved URLs for identity.
///
/// Scheme, host and default port are already normalized by [`Url`]; this
/// additionally ignores a single trailing slash on the path. Everything else,
/// including path case, must match exactly.
#[must_use]
pub fn urls_match(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host() == b.host()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.username() == b.username()
        && trim_slash(a.path()) == trim_slash(b.path())
        && a.query() == b.query()
}

fn trim_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some("") | None => path,
        Some(trimmed) => trimmed,
    }
}

/// Builds `{scheme}://{host[:port]}/.well-known/{service}` for `server`.
///
/// # Errors
///
/// Returns an error if `server` has no host.
pub(crate) fn well_known(server: &Url, service: &str) -> Result<Url, DavError> {
    if server.host().is_none() {
        return Err(DavError::InvalidUrl(format!("{server} has no host")));
    }
    let mut url = server.clone();
    url.set_path(&format!("/.well-known/{service}"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Joins a file name onto a collection URL, adding the separating slash.
///
/// # Errors
///
/// Returns an error if the result is not a valid URL.
pub(crate) fn join_member(collection: &Url, filename: &str) -> Result<Url, DavError> {
    let mut base = collection.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    resolve(&base, filename.trim_start_matches('/'))
}
