pub mod call;
pub mod controls;
pub mod lifecycle;
pub mod recording;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub use call::{CallError, CallObject, Participant};
pub use controls::Controls;
pub use lifecycle::{CallState, MeetingSession, Mount};
pub use recording::{Capture, CaptureError, CaptureSource, MediaTrack, Recorder, RecordingError, RecordingFile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meeting/{id}", get(page::meeting))
}
