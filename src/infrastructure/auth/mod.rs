use crate::error::{AppError, AppResult, ErrorResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

const SIGNUP_PATH: &str = "/signup";
const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

/// Session as returned by the auth provider's password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the hosted auth provider. Holds the current session; the
/// cart/feed core only ever asks whether one exists.
pub struct AuthClient {
    base_url: String,
    http_client: reqwest::Client,
    session: Mutex<Option<Session>>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
            session: Mutex::new(None),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, SIGNUP_PATH))
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        Ok(())
    }

    /// Signs in and stores the returned session
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let session: Session = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse session: {}", e)))?;

        tracing::info!(user_id = %session.user.id, "signed in");
        *self.lock_session() = Some(session.clone());
        Ok(session)
    }

    /// Rehydrates a session the embedding application kept across restarts
    pub fn restore_session(&self, session: Session) {
        *self.lock_session() = Some(session);
    }

    pub fn sign_out(&self) {
        self.lock_session().take();
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock_session().clone()
    }

    /// Bearer token for authenticated listing management, when signed in
    pub fn access_token(&self) -> Option<String> {
        self.lock_session()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    /// Whether a usable session exists; an expired one counts as signed out
    pub fn is_authenticated(&self) -> bool {
        match self.lock_session().as_ref() {
            Some(session) => session
                .expires_at
                .map(|at| at > Utc::now())
                .unwrap_or(true),
            None => false,
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn auth_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    match status {
        reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        reqwest::StatusCode::BAD_REQUEST => AppError::BadRequest(message),
        _ => AppError::ExternalService(message),
    }
}
