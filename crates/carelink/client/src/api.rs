//! Purpose-of-use tagged request client.
//!
//! Thin wrapper over `reqwest` with one hard rule: every request that
//! leaves this client carries exactly one `X-Purpose-Of-Use` value —
//! explicit caller override, else the method-based default. The backend
//! treats the header's absence as a policy violation, not a convention.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use carelink_types::PurposeOfUse;

use crate::error::{ClientError, ClientResult};

/// Header the backend's compliance middleware requires on every call.
pub const PURPOSE_HEADER: &str = "X-Purpose-Of-Use";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the carelink backend.
///
/// Session credentials are cookie-based and ride along automatically;
/// there is no token handling anywhere in this layer. Cloning is cheap
/// and shares the underlying connection pool and cookie store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://localhost:8000`).
    pub fn new(base: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Start a request for `path` (must begin with `/`).
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            method,
            path: path.into(),
            purpose: None,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET shorthand. Purpose defaults to OPERATIONS.
    pub fn get(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Bodyless POST shorthand. Purpose defaults to TREATMENT.
    pub fn post(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// POST-with-JSON shorthand. Purpose defaults to TREATMENT.
    pub fn post_json<T: Serialize>(&self, path: impl Into<String>, body: &T) -> RequestBuilder {
        self.request(Method::POST, path).json_body(body)
    }
}

/// Builder for a single outbound request.
pub struct RequestBuilder {
    client: ApiClient,
    method: Method,
    path: String,
    purpose: Option<PurposeOfUse>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Result<serde_json::Value>>,
}

impl RequestBuilder {
    /// Override the purpose-of-use classification for this call.
    pub fn purpose(mut self, purpose: PurposeOfUse) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a custom header. A `Content-Type` set here overrides the JSON
    /// default applied when a body is present.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body. Content type defaults to `application/json`
    /// unless an explicit `Content-Type` header was supplied.
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body));
        self
    }

    /// Send the request and parse the response.
    pub async fn send(self) -> ClientResult<ApiResponse> {
        let purpose = self
            .purpose
            .unwrap_or_else(|| PurposeOfUse::default_for_method(self.method.as_str()));

        debug!(
            method = %self.method,
            path = %self.path,
            purpose = %purpose,
            "outbound request"
        );

        let url = format!("{}{}", self.client.base, self.path);
        let mut req = self.client.http.request(self.method, url);

        if !self.query.is_empty() {
            req = req.query(&self.query);
        }

        // The purpose header is attached before anything else; no code
        // path may skip it.
        req = req.header(PURPOSE_HEADER, purpose.as_str());

        let mut content_type_overridden = false;
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("content-type") {
                content_type_overridden = true;
            }
            req = req.header(name, value);
        }

        if let Some(body) = self.body {
            let value = body?;
            if content_type_overridden {
                req = req.body(serde_json::to_string(&value)?);
            } else {
                req = req.json(&value);
            }
        }

        let resp = req.send().await?;
        ApiResponse::read(resp).await
    }
}

/// Parsed response body: JSON when the backend declared it, raw text
/// otherwise.
#[derive(Clone, Debug)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

/// A successful (2xx) response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    async fn read(resp: reqwest::Response) -> ClientResult<Self> {
        let status = resp.status();
        let declared_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let text = resp.text().await?;
        let body = if declared_json {
            match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(text),
            }
        } else {
            ResponseBody::Text(text)
        };

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(Self { status, body })
    }

    /// Decode the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        match &self.body {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value.clone())?),
            ResponseBody::Text(text) => Ok(serde_json::from_str(text)?),
        }
    }

    /// The decoded JSON body, when there is one.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// Build a message callers can display verbatim: the backend's `detail`
/// field when present, else the JSON body, else the raw text, else the
/// status line.
fn error_message(status: StatusCode, body: &ResponseBody) -> String {
    match body {
        ResponseBody::Json(value) => match value.get("detail").and_then(|d| d.as_str()) {
            Some(detail) => detail.to_string(),
            None => value.to_string(),
        },
        ResponseBody::Text(text) if !text.trim().is_empty() => text.clone(),
        ResponseBody::Text(_) => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    }
}
