mod dashboard;

use axum::{debug_handler, response::Html, routing::{get, post}, Router};

use crate::{include_res, meeting, res, session::AuthSession, AppResult, AppState, Markdown};

/// Landing, dashboard and the meeting view, plus the stylesheet they share.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/style.css", get(res::stylesheet))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/start", post(dashboard::start_meeting))
        .route("/dashboard/join", post(dashboard::join_meeting))
        .merge(meeting::router())
}

#[debug_handler]
async fn landing(auth: AuthSession) -> AppResult<Html<String>> {
    let signed_in = auth.is_signed_in().await?;
    let flash = auth.take_flash().await?;
    let body = Markdown(include_res!(str, "/pages/landing.md")).to_html();

    Ok(res::page("UbuntuMeet", signed_in, flash.as_deref(), &format!(r#"<section class="landing">{body}</section>"#)))
}
