use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const FALLBACK_NAME: &str = "User";

/// An identity as the BaaS auth service reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    /// Name derived from the identity alone: metadata full name, then the
    /// local part of the email, then [`FALLBACK_NAME`].
    pub fn derived_name(&self) -> String {
        non_empty(self.user_metadata.full_name.as_deref())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .and_then(|local| non_empty(Some(local)))
            })
            .unwrap_or(FALLBACK_NAME)
            .to_owned()
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Profile {
    /// Stand-in used when the profile row can't be read.
    pub fn fallback(user: &User) -> Profile {
        let name = user.derived_name();
        Profile {
            id: user.id,
            display_name: Some(name.clone()),
            full_name: Some(name),
            avatar_url: None,
            created_at: None,
        }
    }

    pub fn display_name(&self, user: &User) -> String {
        non_empty(self.display_name.as_deref())
            .or(non_empty(self.full_name.as_deref()))
            .map(str::to_owned)
            .unwrap_or_else(|| user.derived_name())
    }
}

/// A row of the `meetings` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Meeting {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub room_name: String,
    pub host_id: Uuid,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub participant_count: Option<u32>,
}

/// What gets written when a meeting starts; the BaaS fills in the rest.
#[derive(Debug, Clone, Serialize)]
pub struct NewMeeting<'a> {
    pub room_name: &'a str,
    pub host_id: Uuid,
}

impl Meeting {
    pub fn participants(&self) -> u32 {
        self.participant_count.unwrap_or(0)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
