use std::sync::Arc;

use super::{call::{CallError, CallObject}, lifecycle::DASHBOARD};

/// The in-call control bar. Each action goes straight to the SDK.
pub struct Controls<C: CallObject> {
    call: Arc<C>,
    whiteboard: bool,
}

impl<C: CallObject> Controls<C> {
    pub fn new(call: Arc<C>) -> Controls<C> {
        Controls { call, whiteboard: false }
    }

    /// Flips the local microphone. No-op before the local participant exists.
    pub async fn toggle_audio(&self) -> Result<(), CallError> {
        match self.call.local_participant() {
            Some(local) => self.call.set_local_audio(!local.audio).await,
            None => Ok(()),
        }
    }

    pub async fn toggle_video(&self) -> Result<(), CallError> {
        match self.call.local_participant() {
            Some(local) => self.call.set_local_video(!local.video).await,
            None => Ok(()),
        }
    }

    pub async fn toggle_screen_share(&self) -> Result<(), CallError> {
        if self.call.is_sharing_screen() {
            self.call.stop_screen_share().await
        } else {
            self.call.start_screen_share().await
        }
    }

    /// Shows or hides the whiteboard over the video grid; returns the new state.
    pub fn toggle_whiteboard(&mut self) -> bool {
        self.whiteboard = !self.whiteboard;
        self.whiteboard
    }

    pub fn whiteboard_visible(&self) -> bool {
        self.whiteboard
    }

    /// Leaves the call and returns where to navigate. Teardown is still the session's job.
    pub async fn leave(&self) -> &'static str {
        if let Err(err) = self.call.leave().await {
            tracing::warn!(error = %err, "error leaving call");
        }
        DASHBOARD
    }
}
