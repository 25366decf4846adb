use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::User;

use super::{check, parse_json, Baas, BaasError, Session};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub enum SignUp {
    SignedIn(Session),
    /// The project requires email confirmation before a session is issued.
    ConfirmationSent,
}

impl Baas {
    pub async fn sign_up(&self, credentials: &Credentials, full_name: &str) -> Result<SignUp, BaasError> {
        let response = self.request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await?;
        let body: Value = parse_json(response).await?;

        if body.get("access_token").is_some() {
            Ok(SignUp::SignedIn(serde_json::from_value(body).map_err(|err| BaasError::Api {
                status: reqwest::StatusCode::BAD_GATEWAY,
                message: format!("unreadable session: {err}"),
            })?))
        } else {
            Ok(SignUp::ConfirmationSent)
        }
    }

    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BaasError> {
        let response = self.request(Method::POST, "/auth/v1/token?grant_type=password", None)
            .json(credentials)
            .send()
            .await?;
        parse_json(response).await
    }

    pub async fn get_user(&self, access_token: &str) -> Result<User, BaasError> {
        let response = self.request(Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;
        parse_json(response).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), BaasError> {
        let response = self.request(Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<User, BaasError> {
        let response = self.request(Method::PUT, "/auth/v1/user", Some(access_token))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        parse_json(response).await
    }
}
