// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar and address book listing.

use futures::future::try_join_all;
use url::Url;

use crate::client::DavClient;
use crate::error::DavError;
use crate::http::{Depth, HttpClient};
use crate::request::{MkCalendarRequest, Prop, PropFindRequest};
use crate::response::Properties;
use crate::types::{Account, AccountKind, Collection};
use crate::urls::resolve;

impl DavClient {
    /// Lists the collections under the account's home URL.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Precondition`] if the root or home URL is missing,
    /// or an error if a request fails.
    pub async fn fetch_collections(&self, account: &Account) -> Result<Vec<Collection>, DavError> {
        self.fetch_collections_of(account, account.kind()).await
    }

    /// Lists the calendars under the account's home URL.
    ///
    /// # Errors
    ///
    /// See [`DavClient::fetch_collections`].
    pub async fn fetch_calendars(&self, account: &Account) -> Result<Vec<Collection>, DavError> {
        self.fetch_collections_of(account, AccountKind::CalDav).await
    }

    /// Lists the address books under the account's home URL.
    ///
    /// # Errors
    ///
    /// See [`DavClient::fetch_collections`].
    pub async fn fetch_address_books(
        &self,
        account: &Account,
    ) -> Result<Vec<Collection>, DavError> {
        self.fetch_collections_of(account, AccountKind::CardDav).await
    }

    async fn fetch_collections_of(
        &self,
        account: &Account,
        kind: AccountKind,
    ) -> Result<Vec<Collection>, DavError> {
        let (root, home) = account.require_home()?;

        let mut propfind = PropFindRequest::new();
        propfind.add_properties(kind.collection_props());
        let multistatus = self
            .http
            .multistatus("PROPFIND", home, Some(Depth::One), propfind.build()?)
            .await?;

        let mut collections = Vec::new();
        for record in &multistatus.responses {
            let props = record.props();
            if !kind.accepts_collection(&props) {
                tracing::debug!(href = %record.href, "skipping non-collection resource");
                continue;
            }
            let url = resolve(root, &record.href)?;
            collections.push(into_collection(url, kind, props));
        }

        let reports = try_join_all(
            collections
                .iter()
                .map(|c| self.fetch_supported_reports(&c.url)),
        )
        .await?;
        for (collection, reports) in collections.iter_mut().zip(reports) {
            collection.supported_reports = reports;
        }

        tracing::debug!(%home, count = collections.len(), "collections fetched");
        Ok(collections)
    }

    /// Lists the REPORT names a collection advertises.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_supported_reports(&self, url: &Url) -> Result<Vec<String>, DavError> {
        let mut propfind = PropFindRequest::new();
        propfind.add_property(Prop::SupportedReportSet);
        let multistatus = self
            .http
            .multistatus("PROPFIND", url, Some(Depth::Zero), propfind.build()?)
            .await?;

        Ok(multistatus
            .responses
            .iter()
            .find_map(|r| r.props().supported_reports)
            .unwrap_or_default())
    }

    /// Creates a calendar collection at `url` (MKCALENDAR).
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the request.
    pub async fn make_calendar(
        &self,
        url: &Url,
        display_name: &str,
        description: Option<&str>,
    ) -> Result<(), DavError> {
        let mut request = MkCalendarRequest::new(display_name);
        if let Some(description) = description {
            request = request.description(description);
        }

        let req = self
            .http
            .build_request(HttpClient::method("MKCALENDAR")?, url)
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(request.build()?);
        self.http.execute(req).await?;

        tracing::debug!(%url, "calendar created");
        Ok(())
    }
}

fn into_collection(url: Url, kind: AccountKind, props: Properties) -> Collection {
    let description = kind.description(&props).cloned();
    Collection {
        url,
        kind,
        display_name: props.display_name,
        description,
        timezone: props.calendar_timezone,
        ctag: props.get_ctag,
        sync_token: props.sync_token,
        supported_components: props.supported_calendar_components.unwrap_or_default(),
        supported_reports: Vec::new(),
        resource_types: props.resource_type.unwrap_or_default(),
        objects: Vec::new(),
    }
}
