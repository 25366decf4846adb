pub mod auth;
pub mod baas;
pub mod config;
pub mod meeting;
pub mod models;
pub mod pages;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;

use std::ops::Deref;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use baas::Baas;
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub baas: Baas,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<AppState> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ubuntumeet/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let baas = Baas::new(http.clone(), config.baas.clone());

        Ok(AppState { config, http, baas })
    }
}

/// Builds the whole application: every feature router plus the session and tracing layers.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .nest("/api", rooms::router().layer(CorsLayer::permissive()))
        .nest("/profile", profiles::router())
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", self.0, self.0.backtrace()),
        )
            .into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(anyhow::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(reqwest::Error);
apperr_impl!(baas::BaasError);

pub struct Markdown<T>(pub T);

impl<T> Markdown<T>
where
    T: Deref<Target = str>
{
    pub fn to_html(&self) -> String {
        use pulldown_cmark::{Parser, Options};

        let parser = Parser::new_ext(&self.0, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        html_output
    }
}
