use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_API_URL: &str = "https://api.daily.co/v1";
pub const DEFAULT_API_KEY_VAR: &str = "DAILY_API_KEY";
pub const DEFAULT_ROOM_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
/// Rooms can't be asked to outlive a year.
pub const MAX_ROOM_EXPIRY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Everything the server needs, read once at startup.
///
/// The provider secret is the exception: only the *name* of its variable lives
/// here, the value is looked up on every room request so a missing key fails
/// that request instead of the whole process.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub provider: ProviderConfig,
    pub baas: BaasConfig,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key_var: String,
    /// Tenant subdomain used to build a URL from a bare room name.
    pub domain: Option<String>,
    pub room_expiry: Duration,
}

#[derive(Debug, Clone)]
pub struct BaasConfig {
    pub url: String,
    pub anon_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let room_expiry = room_expiry(optional("ROOM_EXPIRY_SECS").as_deref())?;

        Ok(Config {
            bind_address: optional("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_owned()),
            provider: ProviderConfig {
                api_url: optional("DAILY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
                api_key_var: optional("DAILY_API_KEY_VAR").unwrap_or_else(|| DEFAULT_API_KEY_VAR.to_owned()),
                domain: optional("DAILY_DOMAIN"),
                room_expiry,
            },
            baas: BaasConfig {
                url: required("SUPABASE_URL")?,
                anon_key: required("SUPABASE_ANON_KEY")?,
            },
            secure_cookies: optional("SECURE_COOKIES").is_some_and(|v| v == "true" || v == "1"),
        })
    }
}

impl ProviderConfig {
    pub fn new(api_url: impl Into<String>, api_key_var: impl Into<String>) -> ProviderConfig {
        ProviderConfig {
            api_url: api_url.into(),
            api_key_var: api_key_var.into(),
            domain: None,
            room_expiry: DEFAULT_ROOM_EXPIRY,
        }
    }

    /// The provider secret as currently set, empty counts as unset.
    pub fn api_key(&self) -> Option<String> {
        optional(&self.api_key_var)
    }

    pub fn rooms_endpoint(&self) -> String {
        format!("{}/rooms", self.api_url.trim_end_matches('/'))
    }
}

fn room_expiry(secs: Option<&str>) -> anyhow::Result<Duration> {
    let Some(secs) = secs else {
        return Ok(DEFAULT_ROOM_EXPIRY);
    };
    let expiry = Duration::from_secs(
        secs.parse().with_context(|| format!("ROOM_EXPIRY_SECS={secs} is not a number of seconds"))?
    );
    anyhow::ensure!(
        expiry <= MAX_ROOM_EXPIRY,
        "ROOM_EXPIRY_SECS={secs} exceeds the maximum of {} seconds",
        MAX_ROOM_EXPIRY.as_secs()
    );
    Ok(expiry)
}

fn optional(key: &str) -> Option<String> {
    dotenv::var(key).ok().filter(|v| !v.is_empty())
}

fn required(key: &str) -> anyhow::Result<String> {
    optional(key).with_context(|| format!("{key} is not set"))
}
