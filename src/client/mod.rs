//! Typed client for the journal API.
//!
//! Mirrors the server's reconciliation model locally (see [`state`]) so a
//! frontend can render and merge entries without waiting on the network,
//! and keeps auth state in a single injected [`storage::Storage`] rather
//! than scattered ambient globals.

pub mod session;
pub mod state;
pub mod storage;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::models::journal::{DefaultAchievementInput, JournalSnapshot, SaveEntryRequest};
use crate::models::user::{AuthResponse, PublicUser};

use session::Session;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct JournalClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl JournalClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create an account. On success the returned token is stored in the
    /// session, so the client is immediately authenticated.
    pub async fn register(&self, username: &str, password: &str) -> ClientResult<PublicUser> {
        let response = self
            .http
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let auth: AuthResponse = decode_response(response).await?;
        self.session.login(&auth.token);
        Ok(auth.user)
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<PublicUser> {
        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let auth: AuthResponse = decode_response(response).await?;
        self.session.login(&auth.token);
        Ok(auth.user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    /// Fetch the full journal snapshot: all entries plus the user's
    /// default-achievement templates.
    pub async fn entries(&self) -> ClientResult<JournalSnapshot> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!("{}/api/journal/entries", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        decode_response(response).await
    }

    pub async fn save_entry(&self, entry: &SaveEntryRequest) -> ClientResult<()> {
        let token = self.token()?;
        let response = self
            .http
            .post(format!("{}/api/journal/entries", self.base_url))
            .bearer_auth(token)
            .json(entry)
            .send()
            .await?;

        check_response(response).await
    }

    pub async fn save_default_achievements(
        &self,
        items: &[DefaultAchievementInput],
    ) -> ClientResult<()> {
        let token = self.token()?;
        let response = self
            .http
            .post(format!("{}/api/journal/default-achievements", self.base_url))
            .bearer_auth(token)
            .json(&items)
            .send()
            .await?;

        check_response(response).await
    }

    fn token(&self) -> ClientResult<String> {
        self.session.token().ok_or(ClientError::Unauthenticated)
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        Err(api_error(status, response).await)
    }
}

async fn check_response(response: reqwest::Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(api_error(status, response).await)
    }
}

/// Decode the server's error envelope, `{"error": {"message", "code"}}`,
/// falling back to the raw status when the body is not JSON.
async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.to_string());

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
