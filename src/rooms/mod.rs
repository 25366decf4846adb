mod create;
mod join;

use axum::{routing::post, Router};

use crate::AppState;

pub use create::{create_room, CreatedRoom, ProxyError, RoomDescriptor};
pub use join::{meeting_path, JoinError, JoinTarget};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-room", post(create::create).fallback(create::method_not_allowed))
}
