use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;

use crate::{baas::{Baas, BaasError}, include_res, models::Profile, res::{self, escape}, session::AuthSession, AppResult};

#[derive(Deserialize)]
pub(crate) struct ProfileForm {
    display_name: String,
}

#[derive(Deserialize)]
pub(crate) struct PasswordForm {
    password: String,
}

fn sign_in_first() -> Response {
    Redirect::to("/signin?return_url=/profile").into_response()
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    State(baas): State<Baas>,
    auth: AuthSession,
) -> AppResult<Response> {
    let Some((token, user)) = auth.current_user(&baas).await? else {
        return Ok(sign_in_first());
    };

    let profile = baas.profile(&token, user.id).await.unwrap_or_else(|err| {
        tracing::warn!(user_id = %user.id, error = %err, "profile fetch failed, using fallback");
        Profile::fallback(&user)
    });

    let avatar = match &profile.avatar_url {
        Some(url) => format!(r#"<img class="avatar" src="{}" alt="Avatar">"#, escape(url)),
        None => r#"<div class="avatar placeholder"></div>"#.to_owned(),
    };
    let member_since = profile
        .created_at
        .map(|at| format!("Member since {}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day()))
        .unwrap_or_default();

    let body = include_res!(str, "/pages/profile.html")
        .replace("{avatar}", &avatar)
        .replace("{full_name}", &escape(profile.full_name.as_deref().unwrap_or_default()))
        .replace("{member_since}", &member_since)
        .replace("{display_name}", &escape(profile.display_name.as_deref().unwrap_or_default()));

    let flash = auth.take_flash().await?;
    Ok(res::page("Account Settings", true, flash.as_deref(), &body).into_response())
}

fn outcome(result: Result<(), BaasError>, success: &str) -> AppResult<String> {
    match result {
        Ok(()) => Ok(success.to_owned()),
        Err(BaasError::Api { message, .. }) => Ok(format!("Error: {message}")),
        Err(err) => Err(err.into()),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_profile(
    State(baas): State<Baas>,
    auth: AuthSession,
    Form(ProfileForm { display_name }): Form<ProfileForm>,
) -> AppResult<Response> {
    let Some((token, user)) = auth.current_user(&baas).await? else {
        return Ok(sign_in_first());
    };

    let result = baas.update_display_name(&token, user.id, display_name.trim()).await;
    auth.flash(outcome(result, "Profile updated successfully!")?).await?;
    Ok(Redirect::to("/profile").into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn change_password(
    State(baas): State<Baas>,
    auth: AuthSession,
    Form(PasswordForm { password }): Form<PasswordForm>,
) -> AppResult<Response> {
    let Some((token, _)) = auth.current_user(&baas).await? else {
        return Ok(sign_in_first());
    };
    if password.is_empty() {
        return Ok(Redirect::to("/profile").into_response());
    }

    let result = baas.update_password(&token, &password).await.map(|_| ());
    auth.flash(outcome(result, "Password changed successfully!")?).await?;
    Ok(Redirect::to("/profile").into_response())
}

/// Self-service deletion isn't offered; the request signs the user out and
/// points them at support.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_account(
    State(baas): State<Baas>,
    auth: AuthSession,
) -> AppResult<Response> {
    crate::auth::sign_out(&baas, &auth).await?;
    auth.flash("Account deletion request received. Please contact support to complete the process.").await?;
    Ok(Redirect::to("/").into_response())
}
