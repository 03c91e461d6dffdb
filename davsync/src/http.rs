// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and `ETag` handling.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, redirect};
use url::Url;

use crate::config::{AuthMethod, DavConfig};
use crate::error::DavError;
use crate::response::MultiStatusResponse;
use crate::types::ETag;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Value of the `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The resource itself.
    Zero,
    /// The resource and its direct members.
    One,
}

impl Depth {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

/// HTTP client for `WebDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    unredirected: Client,
    auth: AuthMethod,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: &DavConfig) -> Result<Self, DavError> {
        let client = client_builder(config).build()?;
        let unredirected = client_builder(config)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            unredirected,
            auth: config.auth.clone(),
        })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.authenticate(self.client.request(method, url.clone()))
    }

    /// Builds a request that does not follow redirects.
    pub fn build_unredirected(&self, method: Method, url: &Url) -> RequestBuilder {
        self.authenticate(self.unredirected.request(method, url.clone()))
    }

    fn authenticate(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            AuthMethod::Basic { username, password } => req.basic_auth(username, Some(password)),
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::None => req,
        }
    }

    /// Sends a request, whatever status the server answers with.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn send(&self, req: RequestBuilder) -> Result<Response, DavError> {
        Ok(req.send().await?)
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status code.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, DavError> {
        let resp = self.send(req).await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::status_error(resp).await)
        }
    }

    /// Sends an XML body and decodes the multistatus answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx or the
    /// body is not valid multistatus XML.
    pub async fn multistatus(
        &self,
        method: &str,
        url: &Url,
        depth: Option<Depth>,
        body: String,
    ) -> Result<MultiStatusResponse, DavError> {
        let req = self.xml_request(method, url, depth, body)?;
        let resp = self.execute(req).await?;
        let xml = resp.text().await?;
        MultiStatusResponse::from_xml(&xml)
    }

    /// Builds a request carrying an XML body and an optional `Depth` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the method name is not a valid token.
    pub fn xml_request(
        &self,
        method: &str,
        url: &Url,
        depth: Option<Depth>,
        body: String,
    ) -> Result<RequestBuilder, DavError> {
        tracing::debug!(method, %url, ?depth, "sending WebDAV request");

        let req = self
            .build_request(Self::method(method)?, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body);
        Ok(match depth {
            Some(depth) => req.header("Depth", depth.as_str()),
            None => req,
        })
    }

    /// Parses an extension method such as `PROPFIND` or `REPORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the method name is not a valid token.
    pub fn method(name: &str) -> Result<Method, DavError> {
        Method::from_bytes(name.as_bytes())
            .map_err(|e| DavError::Config(format!("Invalid method {name}: {e}")))
    }

    /// Converts a non-2xx response into an error carrying its body.
    pub async fn status_error(resp: Response) -> DavError {
        let status = resp.status();
        let message = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        DavError::Http { status, message }
    }

    /// Adds If-Match header for conditional updates.
    pub fn if_match(req: RequestBuilder, etag: &ETag) -> RequestBuilder {
        req.header(IF_MATCH, etag.as_str())
    }

    /// Adds If-None-Match header for conditional creation.
    pub fn if_none_match(req: RequestBuilder, value: &str) -> RequestBuilder {
        req.header(IF_NONE_MATCH, value)
    }

    /// Extracts `ETag` from response headers, if the server sent one.
    pub fn extract_etag(resp: &Response) -> Option<ETag> {
        resp.headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| ETag::new(s.to_string()))
    }
}

fn client_builder(config: &DavConfig) -> ClientBuilder {
    let builder = Client::builder().user_agent(&config.user_agent);
    match config.timeout_secs {
        Some(secs) => builder.timeout(Duration::from_secs(secs)),
        None => builder,
    }
}
