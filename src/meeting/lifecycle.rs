use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use super::{call::CallObject, controls::Controls};

pub const DASHBOARD: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Uninitialized,
    Joining,
    Joined,
    Leaving,
    Destroyed,
}

pub enum Mount<C: CallObject> {
    /// No room to join; the page goes back to the dashboard and stays there.
    Redirect(&'static str),
    Joining(MeetingSession<C>),
}

/// The room URL a meeting page was opened with, if it is usable.
pub fn join_url(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|url| !url.is_empty())
}

/// Owns a call object for as long as the meeting view is up.
///
/// Leave-then-destroy runs exactly once: through [`MeetingSession::dispose`],
/// or from `Drop` when the session goes away any other way. A join still in
/// flight at that point is abandoned.
pub struct MeetingSession<C: CallObject> {
    call: Option<Arc<C>>,
    join: Option<JoinHandle<()>>,
    state: Arc<watch::Sender<CallState>>,
}

impl<C: CallObject> MeetingSession<C> {
    /// Must be called inside a tokio runtime; the join runs as its own task.
    pub fn mount(url: Option<&str>, make_call: impl FnOnce() -> C) -> Mount<C> {
        let Some(url) = join_url(url) else {
            tracing::debug!("no room url, redirecting to dashboard");
            return Mount::Redirect(DASHBOARD);
        };

        let call = Arc::new(make_call());
        let state = Arc::new(watch::channel(CallState::Uninitialized).0);
        state.send_replace(CallState::Joining);

        let join = tokio::spawn({
            let call = call.clone();
            let state = state.clone();
            let url = url.to_owned();
            async move {
                match call.join(&url).await {
                    Ok(()) => {
                        state.send_if_modified(|s| {
                            let joining = *s == CallState::Joining;
                            if joining {
                                *s = CallState::Joined;
                            }
                            joining
                        });
                        tracing::info!(%url, "joined call");
                    }
                    Err(err) => tracing::error!(error = %err, "error joining call"),
                }
            }
        });

        Mount::Joining(MeetingSession {
            call: Some(call),
            join: Some(join),
            state,
        })
    }

    pub fn state(&self) -> CallState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.state.subscribe()
    }

    pub fn controls(&self) -> Option<Controls<C>> {
        self.call.clone().map(Controls::new)
    }

    pub async fn dispose(mut self) {
        if let Some(call) = self.call.take() {
            if let Some(join) = self.join.take() {
                join.abort();
            }
            teardown(call, self.state.clone()).await;
        }
    }
}

impl<C: CallObject> Drop for MeetingSession<C> {
    fn drop(&mut self) {
        let Some(call) = self.call.take() else {
            return;
        };
        if let Some(join) = self.join.take() {
            join.abort();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(teardown(call, self.state.clone()));
            }
            Err(_) => tracing::warn!("meeting session dropped outside a runtime, call left open"),
        }
    }
}

async fn teardown<C: CallObject>(call: Arc<C>, state: Arc<watch::Sender<CallState>>) {
    state.send_replace(CallState::Leaving);
    if let Err(err) = call.leave().await {
        tracing::warn!(error = %err, "error leaving call");
    }
    if let Err(err) = call.destroy().await {
        tracing::warn!(error = %err, "error destroying call object");
    }
    state.send_replace(CallState::Destroyed);
}
