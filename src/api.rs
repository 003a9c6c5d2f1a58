use std::time::Duration;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder, Response};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// IPC error code the failure maps to.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } => "api_unreachable",
            ApiError::Api { .. } => "api_error",
            ApiError::Decode(_) => "bad_response",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin client over the institution's attendance REST API. All reads and
/// writes go through here; the daemon holds no authoritative data itself.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: normalize_base_url(base_url.into()),
            token: None,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, rb: RequestBuilder, url: &str) -> Result<serde_json::Value, ApiError> {
        let rb = match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        };
        let resp = rb.send().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        decode_response(resp, url)
    }

    pub fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        self.send(self.http.get(&url), &url)
    }

    pub fn post(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        self.send(self.http.post(&url).json(body), &url)
    }

    pub fn put(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        self.send(self.http.put(&url).json(body), &url)
    }

    pub fn delete(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        self.send(self.http.delete(&url), &url)
    }

    pub fn post_multipart(&self, path: &str, form: Form) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        self.send(self.http.post(&url).multipart(form), &url)
    }
}

fn normalize_base_url(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

fn decode_response(resp: Response, url: &str) -> Result<serde_json::Value, ApiError> {
    let status = resp.status();
    let text = resp.text().map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }
        serde_json::from_str(&text).map_err(|_| ApiError::Decode(truncate(&text)))
    } else {
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &text),
        })
    }
}

/// Backends answer errors as `{"message": "..."}`; anything else falls back
/// to the status line.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
