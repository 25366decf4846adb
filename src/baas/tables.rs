use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use crate::models::{Meeting, NewMeeting, Profile};

use super::{check, parse_json, Baas, BaasError};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
pub const RECENT_MEETINGS: usize = 5;

impl Baas {
    pub async fn profile(&self, access_token: &str, user_id: Uuid) -> Result<Profile, BaasError> {
        let response = self.request(Method::GET, &format!("/rest/v1/profiles?id=eq.{user_id}&select=*"), Some(access_token))
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;
        parse_json(response).await
    }

    pub async fn update_display_name(&self, access_token: &str, user_id: Uuid, display_name: &str) -> Result<(), BaasError> {
        let response = self.request(Method::PATCH, &format!("/rest/v1/profiles?id=eq.{user_id}"), Some(access_token))
            .json(&json!({ "display_name": display_name }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// The most recent meetings hosted by `host_id`, newest first.
    pub async fn recent_meetings(&self, access_token: &str, host_id: Uuid) -> Result<Vec<Meeting>, BaasError> {
        let path = format!("/rest/v1/meetings?host_id=eq.{host_id}&select=*&order=started_at.desc&limit={RECENT_MEETINGS}");
        let response = self.request(Method::GET, &path, Some(access_token))
            .send()
            .await?;
        parse_json(response).await
    }

    pub async fn record_meeting(&self, access_token: &str, meeting: &NewMeeting<'_>) -> Result<(), BaasError> {
        let response = self.request(Method::POST, "/rest/v1/meetings", Some(access_token))
            .header("Prefer", "return=minimal")
            .json(meeting)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
