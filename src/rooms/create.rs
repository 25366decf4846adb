use std::time::Duration;

use axum::{debug_handler, extract::State, http::{header, StatusCode}, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::{config::ProviderConfig, Config};

pub const DEFAULT_PROVIDER_ERROR: &str = "invalid-request-error";
pub const DEFAULT_PROVIDER_INFO: &str = "Check your Daily.co API key and room properties.";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0} is not set")]
    MissingKey(String),
    #[error("Failed to create room: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Invalid response from Daily API")]
    InvalidBody(String),
    #[error("provider rejected room creation ({status}): {error}")]
    Rejected { status: StatusCode, error: Value, info: Value },
}

impl ProxyError {
    /// The JSON the caller sees. Every variant is a 500.
    pub fn body(&self) -> Value {
        use ProxyError::*;
        match self {
            MissingKey(var) => json!({ "error": format!("{var} is not set") }),
            Unreachable(err) => json!({ "error": "Failed to create room", "info": err.to_string() }),
            InvalidBody(raw) => json!({ "error": "Invalid response from Daily API", "info": raw }),
            Rejected { error, info, .. } => json!({ "error": error, "info": info }),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.body())).into_response()
    }
}

#[derive(Debug, Serialize)]
struct RoomRequest {
    privacy: &'static str,
    properties: RoomProperties,
}

#[derive(Debug, Serialize)]
struct RoomProperties {
    exp: i64,
    enable_screenshare: bool,
    enable_recording: &'static str,
    enable_chat: bool,
    start_video_off: bool,
    start_audio_off: bool,
}

impl RoomRequest {
    fn expiring_in(expiry: Duration) -> RoomRequest {
        let secs = i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX);
        let exp = OffsetDateTime::now_utc().unix_timestamp().saturating_add(secs);
        RoomRequest {
            privacy: "public",
            properties: RoomProperties {
                exp,
                enable_screenshare: true,
                enable_recording: "local",
                enable_chat: true,
                start_video_off: false,
                start_audio_off: false,
            },
        }
    }
}

/// The typed view of a room the provider created.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub properties: Value,
}

/// A successful provider response, kept verbatim.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub raw: String,
    pub json: Value,
}

impl CreatedRoom {
    pub fn descriptor(&self) -> Result<RoomDescriptor, serde_json::Error> {
        RoomDescriptor::deserialize(&self.json)
    }
}

impl IntoResponse for CreatedRoom {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            self.raw,
        )
            .into_response()
    }
}

/// Asks the provider for a new room. One attempt, no retries.
pub async fn create_room(http: &reqwest::Client, provider: &ProviderConfig) -> Result<CreatedRoom, ProxyError> {
    let Some(api_key) = provider.api_key() else {
        tracing::error!(var = %provider.api_key_var, "provider api key is not set");
        return Err(ProxyError::MissingKey(provider.api_key_var.clone()));
    };

    let response = http.post(provider.rooms_endpoint())
        .bearer_auth(api_key)
        .json(&RoomRequest::expiring_in(provider.room_expiry))
        .send()
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "error creating room");
            ProxyError::Unreachable(err)
        })?;

    let status = response.status();
    let raw = response.text().await.map_err(ProxyError::Unreachable)?;

    let json: Value = match serde_json::from_str(&raw) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(%status, body = %raw, error = %err, "failed to parse provider response");
            return Err(ProxyError::InvalidBody(raw));
        }
    };

    if !status.is_success() || is_truthy(json.get("error")) {
        tracing::error!(%status, body = %raw, "provider rejected room creation");
        let pick = |key: &str, default: &str| match json.get(key) {
            Some(value) if is_truthy(Some(value)) => value.clone(),
            _ => Value::from(default),
        };
        return Err(ProxyError::Rejected {
            status,
            error: pick("error", DEFAULT_PROVIDER_ERROR),
            info: pick("info", DEFAULT_PROVIDER_INFO),
        });
    }

    tracing::info!(%status, "room created");
    Ok(CreatedRoom { raw, json })
}

/// Loose truthiness for provider JSON: absent, null, false, 0 and "" are all "no error".
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create(
    State(http): State<reqwest::Client>,
    State(config): State<Config>,
) -> Result<CreatedRoom, ProxyError> {
    create_room(&http, &config.provider).await
}

pub(crate) async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method not allowed" })))
}
