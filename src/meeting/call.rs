use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CallError {
    #[error("failed to join {url}: {reason}")]
    Join { url: String, reason: String },
    #[error("call operation failed: {0}")]
    Sdk(String),
}

/// One participant as the video SDK reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub session_id: String,
    pub local: bool,
    pub audio: bool,
    pub video: bool,
}

impl Participant {
    /// "You" for the local participant, otherwise a short handle.
    pub fn label(&self) -> String {
        if self.local {
            "You".to_owned()
        } else {
            format!("User {}", self.session_id.chars().take(4).collect::<String>())
        }
    }
}

/// The video SDK's call object. Media transport lives entirely behind it.
#[async_trait]
pub trait CallObject: Send + Sync + 'static {
    async fn join(&self, url: &str) -> Result<(), CallError>;
    async fn leave(&self) -> Result<(), CallError>;
    async fn destroy(&self) -> Result<(), CallError>;

    async fn set_local_audio(&self, enabled: bool) -> Result<(), CallError>;
    async fn set_local_video(&self, enabled: bool) -> Result<(), CallError>;
    async fn start_screen_share(&self) -> Result<(), CallError>;
    async fn stop_screen_share(&self) -> Result<(), CallError>;

    fn participants(&self) -> Vec<Participant>;
    fn is_sharing_screen(&self) -> bool;

    fn local_participant(&self) -> Option<Participant> {
        self.participants().into_iter().find(|p| p.local)
    }
}
