use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;

use crate::{baas::{Baas, BaasError, Credentials, SignUp}, include_res, res, session::AuthSession, AppResult};

#[derive(Deserialize)]
pub(crate) struct SignupForm {
    full_name: String,
    email: String,
    password: String,
}

fn signup_view(flash: Option<&str>, full_name: &str, email: &str) -> Html<String> {
    res::page(
        "Create an account",
        false,
        flash,
        &include_res!(str, "/pages/signup.html")
            .replace("{full_name}", &res::escape(full_name))
            .replace("{email}", &res::escape(email)),
    )
}

#[debug_handler]
pub(crate) async fn signup_page(auth: AuthSession) -> AppResult<Response> {
    if auth.is_signed_in().await? {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(signup_view(None, "", "").into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn signup(
    State(baas): State<Baas>,
    auth: AuthSession,
    Form(SignupForm { full_name, email, password }): Form<SignupForm>,
) -> AppResult<Response> {
    let full_name = full_name.trim().to_owned();
    let credentials = Credentials { email: email.trim().to_owned(), password };

    match baas.sign_up(&credentials, &full_name).await {
        Ok(SignUp::SignedIn(session)) => {
            auth.store(&session).await?;
            tracing::info!(user_id = %session.user.id, "account created");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Ok(SignUp::ConfirmationSent) => {
            tracing::info!(email = %credentials.email, "account created, awaiting confirmation");
            auth.flash("Check your email to confirm your account, then sign in.").await?;
            Ok(Redirect::to("/signin").into_response())
        }
        Err(BaasError::Api { message, .. }) => {
            Ok(signup_view(Some(&message), &full_name, &credentials.email).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
