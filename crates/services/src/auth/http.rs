use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracker_core::model::{PatientSummary, Role, UserIdentity};

use super::{AuthSession, IdentityProvider, SignUpOutcome};
use crate::error::AuthError;

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
}

impl IdentityConfig {
    /// Read `TRACKER_AUTH_URL` and `TRACKER_AUTH_KEY`; `None` unless both are
    /// set and non-blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("TRACKER_AUTH_URL").ok()?;
        let api_key = env::var("TRACKER_AUTH_KEY").ok()?;
        Self::new(base_url, api_key)
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Option<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        if base_url.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self { base_url, api_key })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Identity provider speaking the hosted auth REST API.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    config: IdentityConfig,
}

impl HttpIdentityProvider {
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        IdentityConfig::from_env().map(Self::new)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.config.api_key)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let url = self.config.url("/auth/v1/token?grant_type=password");
        let response = self
            .request(self.client.post(url))
            .json(&Credentials { email, password })
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Err(AuthError::InvalidCredentials);
        }
        let body: TokenResponse = check(response).await?.json().await?;
        Ok(AuthSession {
            access_token: body.access_token,
            user: body.user.into_identity(),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let url = self.config.url("/auth/v1/signup");
        let response = self
            .request(self.client.post(url))
            .json(&Credentials { email, password })
            .send()
            .await?;

        let body: SignUpResponse = check(response).await?.json().await?;
        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Ok(SignUpOutcome::SignedIn(AuthSession {
                access_token,
                user: user.into_identity(),
            })),
            _ => Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            }),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<UserIdentity, AuthError> {
        let url = self.config.url("/auth/v1/user");
        let response = self
            .request(self.client.get(url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: UserPayload = check(response).await?.json().await?;
        Ok(user.into_identity())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.config.url("/auth/v1/logout");
        let response = self
            .request(self.client.post(url))
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn list_patients(&self, access_token: &str) -> Result<Vec<PatientSummary>, AuthError> {
        let url = self
            .config
            .url("/rest/v1/users?select=id,email,role,created_at&role=neq.admin");
        let response = self
            .request(self.client.get(url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let rows: Vec<PatientRow> = check(response).await?.json().await?;
        Ok(rows.into_iter().map(PatientRow::into_summary).collect())
    }
}

async fn check(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Rejected {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        }),
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    #[serde(default)]
    role: Option<String>,
}

impl UserPayload {
    fn into_identity(self) -> UserIdentity {
        let role = Role::from_claim(self.app_metadata.role.as_deref());
        UserIdentity::new(self.id, self.email.unwrap_or_default(), role)
    }
}

#[derive(Debug, Deserialize)]
struct PatientRow {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl PatientRow {
    fn into_summary(self) -> PatientSummary {
        PatientSummary {
            id: self.id,
            email: self.email.unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}
