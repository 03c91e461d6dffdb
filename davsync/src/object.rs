// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Object retrieval and mutation.

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::client::DavClient;
use crate::error::DavError;
use crate::http::{Depth, HttpClient};
use crate::request::{MultiGetRequest, ObjectFilter, ObjectQueryRequest};
use crate::response::ResponseRecord;
use crate::types::{Account, AccountKind, Collection, CollectionObject, ETag};
use crate::urls::{join_member, resolve};

/// Outcome of a successful PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    /// URL of the written object.
    pub url: Url,
    /// Status the server answered with (201 or 204 usually).
    pub status: StatusCode,
    /// New entity tag, when the server returned one.
    pub etag: Option<ETag>,
}

impl WriteResponse {
    fn from_response(url: Url, resp: &Response) -> Self {
        Self {
            url,
            status: resp.status(),
            etag: HttpClient::extract_etag(resp),
        }
    }
}

impl DavClient {
    /// Fetches the member objects of a collection.
    ///
    /// Runs a `calendar-query` or `addressbook-query` REPORT with `filter`
    /// (or the protocol's default filter). When the server inlines object
    /// data, the query answer is used directly; otherwise one multiget
    /// REPORT fetches every returned href. Records reporting failure are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Precondition`] if the account has no root URL,
    /// [`DavError::Config`] if the filter belongs to the other protocol, or
    /// an error if a request fails.
    pub async fn fetch_collection_objects(
        &self,
        collection: &Collection,
        account: &Account,
        filter: Option<&ObjectFilter>,
    ) -> Result<Vec<CollectionObject>, DavError> {
        let root = account.require_root()?;
        let kind = collection.kind;

        let filter = filter.cloned().unwrap_or_else(|| kind.default_filter());
        if filter.kind() != kind {
            return Err(DavError::Config(format!(
                "{} filter cannot query {kind} collection {}",
                filter.kind(),
                collection.url
            )));
        }

        let query = ObjectQueryRequest::new(kind).filter(filter).build()?;
        let queried = self
            .http
            .multistatus("REPORT", &collection.url, Some(Depth::One), query)
            .await?
            .responses;

        let records = if has_inline_data(kind, &queried) {
            tracing::debug!(url = %collection.url, count = queried.len(), "query returned inline data");
            queried
        } else {
            let mut multiget = MultiGetRequest::new(kind);
            for record in &queried {
                multiget.add_href(resolve(root, &record.href)?.to_string());
            }
            if multiget.is_empty() {
                return Ok(Vec::new());
            }
            tracing::debug!(url = %collection.url, count = queried.len(), "fetching objects by multiget");
            self.http
                .multistatus("REPORT", &collection.url, Some(Depth::One), multiget.build()?)
                .await?
                .responses
        };

        into_objects(kind, root, records)
    }

    /// Creates `filename` in `collection`.
    ///
    /// Sends `If-None-Match: *` so an existing object is never overwritten;
    /// `headers` are applied last and may replace it.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::Conflict`] if the object already exists, or an
    /// error if the request fails.
    pub async fn create_object(
        &self,
        collection: &Collection,
        filename: &str,
        data: &str,
        headers: &HeaderMap,
    ) -> Result<WriteResponse, DavError> {
        let url = join_member(&collection.url, filename)?;
        let req = HttpClient::if_none_match(self.http.build_request(Method::PUT, &url), "*")
            .header(CONTENT_TYPE, collection.kind.content_type())
            .headers(headers.clone())
            .body(data.to_string());

        tracing::debug!(%url, "creating object");
        let resp = self.http.send(req).await?;
        match resp.status() {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Err(DavError::Conflict(url)),
            status if status.is_success() => Ok(WriteResponse::from_response(url, &resp)),
            _ => Err(HttpClient::status_error(resp).await),
        }
    }

    /// Replaces an object's body on the server.
    ///
    /// The write is conditional on the object's `ETag` when it is known.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::StaleETag`] if the object changed on the server,
    /// or an error if the request fails.
    pub async fn update_object(
        &self,
        object: &CollectionObject,
        headers: &HeaderMap,
    ) -> Result<WriteResponse, DavError> {
        let req = self
            .conditional(Method::PUT, object)
            .header(CONTENT_TYPE, object.kind.content_type())
            .headers(headers.clone())
            .body(object.data.clone());

        tracing::debug!(url = %object.url, "updating object");
        let resp = self.http.send(req).await?;
        match resp.status() {
            StatusCode::PRECONDITION_FAILED => Err(DavError::StaleETag(object.url.clone())),
            status if status.is_success() => {
                Ok(WriteResponse::from_response(object.url.clone(), &resp))
            }
            _ => Err(HttpClient::status_error(resp).await),
        }
    }

    /// Deletes an object.
    ///
    /// An object that is already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::StaleETag`] if the object changed on the server,
    /// or an error if the request fails.
    pub async fn delete_object(
        &self,
        object: &CollectionObject,
        headers: &HeaderMap,
    ) -> Result<(), DavError> {
        let req = self
            .conditional(Method::DELETE, object)
            .headers(headers.clone());

        tracing::debug!(url = %object.url, "deleting object");
        let resp = self.http.send(req).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!(url = %object.url, "object already deleted");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => Err(DavError::StaleETag(object.url.clone())),
            status if status.is_success() => Ok(()),
            _ => Err(HttpClient::status_error(resp).await),
        }
    }

    fn conditional(&self, method: Method, object: &CollectionObject) -> RequestBuilder {
        let req = self.http.build_request(method, &object.url);
        match &object.etag {
            Some(etag) => HttpClient::if_match(req, etag),
            None => req,
        }
    }
}

/// Whether any record of a query answer carries non-empty object data.
fn has_inline_data(kind: AccountKind, records: &[ResponseRecord]) -> bool {
    records
        .iter()
        .any(|r| kind.object_data(&r.props()).is_some_and(|data| !data.is_empty()))
}

fn into_objects(
    kind: AccountKind,
    root: &Url,
    records: Vec<ResponseRecord>,
) -> Result<Vec<CollectionObject>, DavError> {
    let mut objects = Vec::with_capacity(records.len());
    for record in records {
        if !record.is_ok() {
            tracing::warn!(href = %record.href, status = ?record.status_code(), "skipping failed object record");
            continue;
        }
        let props = record.props();
        let url = resolve(root, &record.href)?;
        let data = kind.object_data(&props).unwrap_or_default().to_string();
        objects.push(CollectionObject::new(url, kind, props.get_etag, data));
    }
    Ok(objects)
}
