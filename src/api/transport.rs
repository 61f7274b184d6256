//! Minimal JSON-over-HTTP helper.
//!
//! Every call sends JSON headers, parses the body as JSON (an empty or
//! non-JSON body reads as `{}`), and turns a non-2xx status into
//! [`RequestError::Status`] carrying the server's message.

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::infra::{config::ApiConfig, error::AppError};

use super::error::RequestError;

const JSON_MEDIA_TYPE: &str = "application/json";
const API_REQUEST_FAILED: &str = "API_REQUEST_FAILED";

/// Method, query, extra headers and JSON body of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post<B: Serialize + ?Sized>(body: &B) -> Result<Self, RequestError> {
        Self::new(Method::POST).with_json(body)
    }

    pub fn put<B: Serialize + ?Sized>(body: &B) -> Result<Self, RequestError> {
        Self::new(Method::PUT).with_json(body)
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)
            .map_err(|error| RequestError::InvalidRequest(format!("request body: {error}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, RequestError> {
        let value = self.request_value(path, options).await?;
        serde_json::from_value(value).map_err(|error| RequestError::Decode(error.to_string()))
    }

    /// Same as [`Self::request`] for endpoints whose body carries nothing useful.
    pub async fn request_status(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<(), RequestError> {
        self.request_value(path, options).await.map(|_| ())
    }

    async fn request_value(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let url = endpoint_url(&self.base_url, path);
        let method = options.method.clone();

        let headers = build_headers(&options.headers)?;

        let mut builder = self.client.request(options.method, &url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let result = match builder.send().await {
            Ok(response) => {
                let status = response.status();
                match response.bytes().await {
                    Ok(bytes) => decode_response(status, &bytes),
                    Err(error) => Err(RequestError::from(error)),
                }
            }
            Err(error) => Err(RequestError::from(error)),
        };

        match &result {
            Ok(_) => tracing::debug!(%method, path, "api request succeeded"),
            Err(error) => tracing::warn!(
                code = API_REQUEST_FAILED,
                %method,
                path,
                status = ?error.status(),
                error = %error,
                "api request failed"
            ),
        }

        result
    }
}

/// JSON defaults first; caller headers replace them on a name clash.
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

    for (name, value) in extra {
        let invalid = |error: &dyn std::fmt::Display| {
            RequestError::InvalidRequest(format!("header `{name}`: {error}"))
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| invalid(&error))?;
        let header_value = HeaderValue::from_str(value).map_err(|error| invalid(&error))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Joins `base_url` and `path` with exactly one slash between them.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Percent-encodes one path segment (ids, emails). `@` stays readable.
pub fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'@' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<Value, RequestError> {
    let data: Value =
        serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()));

    if !status.is_success() {
        return Err(RequestError::Status {
            status: status.as_u16(),
            message: server_error_message(status, &data),
        });
    }

    Ok(data)
}

fn server_error_message(status: StatusCode, data: &Value) -> String {
    ["error", "detail"]
        .iter()
        .filter_map(|field| data.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
