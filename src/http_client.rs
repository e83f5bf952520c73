use std::thread;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{AppConfig, RetryPolicy};
use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-apisports-key";
const SNIPPET_CHARS: usize = 200;

/// Anything that can answer `GET path?params` with a JSON body.
pub trait JsonSource {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError>;
}

pub struct ApiClient {
    client: Client,
    base: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(cfg: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            client,
            base: cfg.api_base.clone(),
            api_key: cfg.api_key.clone(),
            retry: cfg.retry,
        })
    }

    fn get_once(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(ApiError::NoCredentials);
        };
        let url = format!("{}{}", self.base, path);
        debug!(%url, ?params, "GET");
        let resp = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, key)
            .query(params)
            .send()?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                snippet: snippet(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl JsonSource for ApiClient {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        with_retry(&self.retry, || self.get_once(path, params))
    }
}

/// Runs `op`, retrying only on `RateLimited` with exponential backoff.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    mut op: impl FnMut() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(ApiError::RateLimited) if attempt < policy.max_attempts => {
                let wait = policy.delay_after(attempt);
                warn!(attempt, wait_ms = wait.as_millis() as u64, "rate limited, backing off");
                if !wait.is_zero() {
                    thread::sleep(wait);
                }
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(SNIPPET_CHARS)
        .collect()
}
