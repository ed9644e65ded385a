// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::Method;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::token::TokenStore;

/// Request path relative to the server base URL, kept as raw segments so
/// values such as office names are percent-encoded exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn push(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self, path: &ApiPath) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// The body as JSON, or `None` when it is not JSON at all.
    pub fn value(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Authenticated request capability shared by every endpoint.
///
/// Implementations attach the stored bearer token, fail fast without one,
/// and clear it when the server answers 401.
pub trait Transport {
    fn get(&self, path: &ApiPath) -> ApiResult<RawResponse>;

    fn post_json(&self, path: &ApiPath, body: &Value) -> ApiResult<RawResponse>;

    fn delete(&self, path: &ApiPath) -> ApiResult<RawResponse>;

    /// POST without a token; used to obtain one.
    fn post_anonymous(&self, path: &ApiPath, body: &Value) -> ApiResult<RawResponse>;

    fn tokens(&self) -> &dyn TokenStore;

    fn base_url(&self) -> &str;
}

#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    base: Url,
    http: HttpClient,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base = Url::parse(&base_url)
            .with_context(|| format!("server.base_url {base_url:?} is not a valid URL"))?;
        if base.cannot_be_a_base() {
            bail!("server.base_url {base_url:?} must be an http(s) URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            base,
            http,
            tokens,
        })
    }

    fn url_for(&self, path: &ApiPath) -> ApiResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| ApiError::InvalidBaseUrl {
                        base_url: self.base_url.clone(),
                    })?;
            segments.pop_if_empty();
            segments.extend(path.segments());
        }
        Ok(url)
    }

    fn send(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&Value>,
        authenticated: bool,
    ) -> ApiResult<RawResponse> {
        let url = self.url_for(path)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");

        if authenticated {
            let token = self
                .tokens
                .load()
                .map_err(|error| ApiError::TokenStore(format!("{error:#}")))?
                .ok_or(ApiError::MissingToken)?;
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %path, "sending request");
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| connection_error(&self.base_url, error))?;
        debug!(%method, %path, status, bytes = body.len(), "received response");

        if authenticated && status == 401 {
            warn!(%path, "server rejected the session token; clearing it");
            if let Err(error) = self.tokens.clear() {
                warn!(error = %format!("{error:#}"), "failed to clear session token");
            }
            return Err(ApiError::Unauthorized);
        }

        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &ApiPath) -> ApiResult<RawResponse> {
        self.send(Method::GET, path, None, true)
    }

    fn post_json(&self, path: &ApiPath, body: &Value) -> ApiResult<RawResponse> {
        self.send(Method::POST, path, Some(body), true)
    }

    fn delete(&self, path: &ApiPath) -> ApiResult<RawResponse> {
        self.send(Method::DELETE, path, None, true)
    }

    fn post_anonymous(&self, path: &ApiPath, body: &Value) -> ApiResult<RawResponse> {
        self.send(Method::POST, path, Some(body), false)
    }

    fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> ApiError {
    ApiError::Connection {
        base_url: base_url.to_owned(),
        detail: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiPath, HttpTransport, RawResponse};
    use crate::token::MemoryTokenStore;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn api_path_displays_with_leading_slashes() {
        let path = ApiPath::new("/api/qr-office-list/").push("City Hall");
        assert_eq!(path.segments(), ["api", "qr-office-list", "City Hall"]);
        assert_eq!(path.to_string(), "/api/qr-office-list/City Hall");
    }

    #[test]
    fn url_encodes_segments_under_base_path() -> anyhow::Result<()> {
        let transport = HttpTransport::new(
            "http://dts.example/mobile/",
            Duration::from_secs(1),
            Arc::new(MemoryTokenStore::default()),
        )?;
        let url = transport.url_for(&ApiPath::new("api/qr-office-list").push("City Hall"))?;
        assert_eq!(
            url.as_str(),
            "http://dts.example/mobile/api/qr-office-list/City%20Hall"
        );
        Ok(())
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let tokens = Arc::new(MemoryTokenStore::default());
        assert!(HttpTransport::new("", Duration::from_secs(1), tokens.clone()).is_err());
        assert!(HttpTransport::new("not a url", Duration::from_secs(1), tokens.clone()).is_err());
        assert!(HttpTransport::new("mailto:ops@example.com", Duration::from_secs(1), tokens).is_err());
    }

    #[test]
    fn raw_response_success_range() {
        let ok = RawResponse {
            status: 201,
            body: "{}".to_owned(),
        };
        let not_found = RawResponse {
            status: 404,
            body: "missing".to_owned(),
        };
        assert!(ok.is_success());
        assert!(ok.value().is_some());
        assert!(!not_found.is_success());
        assert!(not_found.value().is_none());
    }
}
