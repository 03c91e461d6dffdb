// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Service discovery and the account bootstrap.

use futures::future::try_join_all;
use reqwest::Method;
use reqwest::header::LOCATION;
use url::Url;

use crate::client::DavClient;
use crate::config::LoadOptions;
use crate::error::DavError;
use crate::http::Depth;
use crate::request::{Prop, PropFindRequest};
use crate::response::MultiStatusResponse;
use crate::types::{Account, AccountKind};
use crate::urls::{resolve, urls_match, well_known};

impl DavClient {
    /// Resolves the service root through `/.well-known/caldav` or
    /// `/.well-known/carddav` (RFC 6764).
    ///
    /// Redirects are not followed: a 3xx answer with a `Location` header
    /// yields that location, resolved against the server's origin.
    ///
    /// This is best effort and never fails. Any transport error, a
    /// non-redirect answer or an unusable location returns `server_url`
    /// unchanged, on the assumption that the server hosts the service at the
    /// URL the user entered.
    pub async fn discover_service(&self, server_url: &Url, kind: AccountKind) -> Url {
        match self.well_known_location(server_url, kind).await {
            Ok(Some(root)) => {
                tracing::debug!(%root, "well-known redirect found");
                root
            }
            Ok(None) => {
                tracing::debug!(%server_url, "no well-known redirect, using server URL");
                server_url.clone()
            }
            Err(err) => {
                tracing::warn!(%server_url, error = %err, "service discovery failed, using server URL");
                server_url.clone()
            }
        }
    }

    async fn well_known_location(
        &self,
        server_url: &Url,
        kind: AccountKind,
    ) -> Result<Option<Url>, DavError> {
        let url = well_known(server_url, kind.service_name())?;
        tracing::debug!(%url, "probing well-known URL");
        let resp = self
            .http
            .send(self.http.build_unredirected(Method::GET, &url))
            .await?;

        if !resp.status().is_redirection() {
            return Ok(None);
        }
        let Some(location) = resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()) else {
            return Ok(None);
        };

        let mut origin = url.clone();
        origin.set_path("/");
        resolve(&origin, location).map(Some)
    }

    /// Looks up the `current-user-principal` of the account.
    ///
    /// Returns `None` when the server does not report a principal. A failed
    /// answer is logged and still read when its body is a multistatus.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Precondition`] without contacting the server if
    /// the account has no root URL, or an error if the request fails.
    pub async fn fetch_principal_url(&self, account: &Account) -> Result<Option<Url>, DavError> {
        let root = account.require_root()?;

        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::CurrentUserPrincipal);
        let req = self
            .http
            .xml_request("PROPFIND", root, Some(Depth::Zero), propfind.build()?)?;
        let resp = self.http.send(req).await?;
        let status = resp.status();
        let body = resp.text().await?;

        let multistatus = if status.is_success() {
            MultiStatusResponse::from_xml(&body)?
        } else {
            match MultiStatusResponse::from_xml(&body) {
                Ok(multistatus) if !multistatus.responses.is_empty() => {
                    tracing::warn!(%root, %status, "principal lookup failed, reading its multistatus anyway");
                    multistatus
                }
                _ => return Err(DavError::Http { status, message: body }),
            }
        };

        for record in multistatus.responses.iter().filter(|r| !r.is_ok()) {
            tracing::warn!(href = %record.href, status = ?record.status_code(), "principal lookup returned a failed record");
        }

        let principal = multistatus
            .responses
            .iter()
            .find_map(|r| r.props().current_user_principal);
        match principal {
            Some(href) => resolve(root, &href).map(Some),
            None => {
                tracing::warn!(%root, "server did not report a current-user-principal");
                Ok(None)
            }
        }
    }

    /// Looks up the calendar or address book home of the account's principal.
    ///
    /// Returns `None` when no record matches the principal or the home-set
    /// property is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Precondition`] naming every missing field without
    /// contacting the server if the principal or root URL is missing, or an
    /// error if the request fails.
    pub async fn fetch_home_url(&self, account: &Account) -> Result<Option<Url>, DavError> {
        let (root, principal) = account.require_principal()?;
        let kind = account.kind();

        let mut propfind = PropFindRequest::new();
        propfind.add_property(kind.home_set_prop());
        let multistatus = self
            .http
            .multistatus("PROPFIND", principal, Some(Depth::Zero), propfind.build()?)
            .await?;

        let record = multistatus.responses.iter().find(|r| {
            resolve(root, &r.href).is_ok_and(|url| urls_match(&url, principal))
        });
        let Some(record) = record else {
            tracing::warn!(%principal, "no response matched the principal URL");
            return Ok(None);
        };

        match kind.home_set(&record.props()) {
            Some(href) => resolve(root, href).map(Some),
            None => {
                tracing::warn!(%principal, %kind, "principal has no home set");
                Ok(None)
            }
        }
    }

    /// Resolves an account from its server URL.
    ///
    /// Runs service discovery, the principal lookup and the home lookup in
    /// order, then loads collections and objects as `options` asks. Each
    /// stage is committed only once it has fully succeeded; the account
    /// passed in is consumed and a new one returned.
    ///
    /// # Errors
    ///
    /// Returns an error if any step after service discovery fails. A server
    /// that reports no principal surfaces as [`DavError::Precondition`] from
    /// the home lookup.
    #[tracing::instrument(skip_all, fields(server = %account.server_url(), kind = %account.kind()))]
    pub async fn create_account(
        &self,
        account: Account,
        options: LoadOptions,
    ) -> Result<Account, DavError> {
        let root = self
            .discover_service(account.server_url(), account.kind())
            .await;
        let account = account.with_root_url(root);

        let account = match self.fetch_principal_url(&account).await? {
            Some(principal) => account.with_principal_url(principal),
            None => account,
        };

        let account = match self.fetch_home_url(&account).await? {
            Some(home) => account.with_home_url(home),
            None => account,
        };

        if !options.wants_collections() {
            return Ok(account);
        }

        let mut collections = self.fetch_collections(&account).await?;
        if options.objects {
            let objects = try_join_all(
                collections
                    .iter()
                    .map(|c| self.fetch_collection_objects(c, &account, None)),
            )
            .await?;
            for (collection, objects) in collections.iter_mut().zip(objects) {
                collection.objects = objects;
            }
        }

        tracing::debug!(collections = collections.len(), "account resolved");
        Ok(account.with_collections(collections))
    }
}
