use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use url::Url;

use crate::{baas::{self, Baas, BaasError}, models::User, AppResult};

pub const ACCESS_TOKEN: &str = "access_token";
pub const USER_ID: &str = "user_id";
pub const RETURN_URL: &str = "return_url";
pub const FLASH: &str = "flash";

/// The signed-in state of one browser, scoped to the request that extracted it.
///
/// The BaaS access token lives in the server-side session; nothing about who is
/// signed in is kept anywhere else.
pub struct AuthSession(pub Session);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(AuthSession)
    }
}

impl AuthSession {
    pub async fn access_token(&self) -> AppResult<Option<String>> {
        Ok(self.0.get::<String>(ACCESS_TOKEN).await?)
    }

    pub async fn is_signed_in(&self) -> AppResult<bool> {
        Ok(self.access_token().await?.is_some())
    }

    pub async fn store(&self, session: &baas::Session) -> AppResult<()> {
        self.0.cycle_id().await?;
        self.0.insert(ACCESS_TOKEN, &session.access_token).await?;
        self.0.insert(USER_ID, session.user.id).await?;
        Ok(())
    }

    /// Resolves the token against the BaaS. A rejected token signs the browser out.
    pub async fn current_user(&self, baas: &Baas) -> AppResult<Option<(String, User)>> {
        let Some(token) = self.access_token().await? else {
            return Ok(None);
        };

        match baas.get_user(&token).await {
            Ok(user) => Ok(Some((token, user))),
            Err(BaasError::Api { status, .. }) if status == 401 || status == 403 => {
                tracing::info!(%status, "stored access token rejected, clearing session");
                self.clear().await;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn clear(&self) {
        self.0.clear().await;
    }

    pub async fn set_return_url(&self, return_url: Option<String>) -> AppResult<()> {
        if let Some(return_url) = return_url.filter(|url| is_local_path(url)) {
            self.0.insert(RETURN_URL, return_url).await?;
        }
        Ok(())
    }

    pub async fn take_return_url(&self) -> AppResult<Option<String>> {
        Ok(self.0.remove::<String>(RETURN_URL).await?)
    }

    pub async fn flash(&self, message: impl Into<String>) -> AppResult<()> {
        self.0.insert(FLASH, message.into()).await?;
        Ok(())
    }

    pub async fn take_flash(&self) -> AppResult<Option<String>> {
        Ok(self.0.remove::<String>(FLASH).await?)
    }
}

const LOCAL_ORIGIN: &str = "http://ubuntumeet.invalid/";

/// Only same-site paths are followed after sign in or sign out.
///
/// The value is resolved against a placeholder origin the way a browser would
/// resolve it; anything that lands on another host is refused.
pub fn is_local_path(url: &str) -> bool {
    if !url.starts_with('/') || url.contains('\\') {
        return false;
    }
    let Ok(base) = Url::parse(LOCAL_ORIGIN) else {
        return false;
    };
    Url::options()
        .base_url(Some(&base))
        .parse(url)
        .is_ok_and(|resolved| resolved.origin() == base.origin())
}
