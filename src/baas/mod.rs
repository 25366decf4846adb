//! Thin client for the hosted backend: GoTrue-style auth under `/auth/v1` and
//! PostgREST tables under `/rest/v1`.
//!
//! Nothing here caches or retries; every call is one request.

mod auth;
mod tables;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{config::BaasConfig, models::User};

pub use auth::{Credentials, SignUp};

#[derive(Debug, thiserror::Error)]
pub enum BaasError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// An authenticated session handed out by sign in.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}

#[derive(Clone)]
pub struct Baas {
    http: reqwest::Client,
    config: BaasConfig,
}

impl Baas {
    pub fn new(http: reqwest::Client, config: BaasConfig) -> Baas {
        Baas { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    /// A request carrying the project key, and the user's token when there is one.
    fn request(&self, method: reqwest::Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.config.anon_key);
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }
}

async fn check(response: Response) -> Result<Response, BaasError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BaasError::Api { status, message: error_message(&body) })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, BaasError> {
    Ok(check(response).await?.json().await?)
}

/// Auth and PostgREST disagree on where the message goes.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
        .unwrap_or_else(|| body.to_owned())
}
