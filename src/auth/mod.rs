mod login;
mod logout;
mod signup;

use axum::{routing::get, Router};

use crate::AppState;

pub(crate) use logout::sign_out;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(login::login_page).post(login::login))
        .route("/signup", get(signup::signup_page).post(signup::signup))
        .route("/signout", get(logout::logout).post(logout::logout))
}
