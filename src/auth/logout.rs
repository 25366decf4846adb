use axum::{debug_handler, extract::{Query, State}, response::Redirect};
use serde::Deserialize;

use crate::{baas::Baas, session::{is_local_path, AuthSession}, AppResult};

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

/// Revokes the token upstream (best effort) and forgets it locally.
pub(crate) async fn sign_out(baas: &Baas, auth: &AuthSession) -> AppResult<()> {
    if let Some(token) = auth.access_token().await? {
        if let Err(err) = baas.sign_out(&token).await {
            tracing::warn!(error = %err, "backend sign out failed");
        }
    }
    auth.clear().await;
    Ok(())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    State(baas): State<Baas>,
    auth: AuthSession,
) -> AppResult<Redirect> {
    sign_out(&baas, &auth).await?;
    let return_url = return_url.filter(|url| is_local_path(url)).unwrap_or("/".to_string());
    Ok(Redirect::to(return_url.as_str()))
}
