mod page;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::profile).post(page::update_profile))
        .route("/password", post(page::change_password))
        .route("/delete", post(page::delete_account))
}
