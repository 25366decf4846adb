use axum::{debug_handler, extract::{Query, State}, response::{Html, IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;

use crate::{baas::{Baas, BaasError, Credentials}, include_res, res, session::AuthSession, AppResult};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
}

pub(crate) fn login_view(flash: Option<&str>, email: &str) -> Html<String> {
    res::page(
        "Sign in",
        false,
        flash,
        &include_res!(str, "/pages/signin.html").replace("{email}", &res::escape(email)),
    )
}

#[debug_handler]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    auth: AuthSession,
) -> AppResult<Response> {
    if auth.is_signed_in().await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    auth.set_return_url(return_url).await?;

    let flash = auth.take_flash().await?;
    Ok(login_view(flash.as_deref(), "").into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(baas): State<Baas>,
    auth: AuthSession,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let credentials = Credentials { email: email.trim().to_owned(), password };

    let session = match baas.sign_in_with_password(&credentials).await {
        Ok(session) => session,
        Err(BaasError::Api { message, .. }) => {
            tracing::info!(email = %credentials.email, %message, "sign in rejected");
            return Ok(login_view(Some(&message), &credentials.email).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    auth.store(&session).await?;
    tracing::info!(user_id = %session.user.id, "signed in");

    let return_url = auth.take_return_url().await?.unwrap_or_else(|| "/dashboard".to_owned());
    Ok(Redirect::to(&return_url).into_response())
}
