//! REST adapters for the hosted row-storage and authentication service.
//!
//! The remote side speaks a PostgREST-style API: rows are fetched with a
//! filtered GET (an empty result array is the not-found condition) and
//! written with an upsert POST keyed on `user_id`.

use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use storage::repository::{ProgressRecord, RemoteProgressStore, StorageError};
use tracker_core::model::{Account, AccountId, Identity, ProblemId};

const PROGRESS_TABLE: &str = "user_progress";

#[derive(Clone, Debug)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    /// Reads the hosted-service endpoint from `TRACKER_API_URL` and
    /// `TRACKER_API_KEY`. Returns `None` when the key is unset or blank,
    /// in which case the app runs local-only.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TRACKER_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("TRACKER_API_URL").ok()?;
        Some(Self { base_url, api_key })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url.trim_end_matches('/'))
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.base_url.trim_end_matches('/'))
    }
}

//
// ─── ROW STORAGE ───────────────────────────────────────────────────────────────
//

/// Wire shape of one progress row.
#[derive(Debug, Serialize, Deserialize)]
struct ProgressRow {
    user_id: AccountId,
    completed_problems: Vec<ProblemId>,
    updated_at: DateTime<Utc>,
}

/// `RemoteProgressStore` backed by the hosted row-storage endpoint.
#[derive(Clone)]
pub struct RestProgressStore {
    client: Client,
    config: RestConfig,
}

impl RestProgressStore {
    #[must_use]
    pub fn new(config: RestConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl RemoteProgressStore for RestProgressStore {
    async fn fetch(&self, account_id: AccountId) -> Result<Option<ProgressRecord>, StorageError> {
        let response = self
            .client
            .get(self.config.rest_url(PROGRESS_TABLE))
            .query(&[
                ("user_id", format!("eq.{account_id}")),
                ("select", "user_id,completed_problems,updated_at".to_string()),
            ])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Connection(format!(
                "progress fetch returned status {}",
                response.status()
            )));
        }

        let mut rows: Vec<ProgressRow> = response
            .json()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        // An empty result set is the genuine not-found condition.
        Ok(rows.pop().map(|row| {
            ProgressRecord::new(row.user_id, row.completed_problems, row.updated_at)
        }))
    }

    async fn upsert(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let row = ProgressRow {
            user_id: record.account_id,
            completed_problems: record.completed_problems.clone(),
            updated_at: record.updated_at,
        };

        let response = self
            .client
            .post(self.config.rest_url(PROGRESS_TABLE))
            .query(&[("on_conflict", "user_id")])
            .header("apikey", &self.config.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .bearer_auth(&self.config.api_key)
            .json(&[row])
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Connection(format!(
                "progress upsert returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

//
// ─── AUTHENTICATION ────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: Option<String>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: AccountId,
    email: Option<String>,
}

#[derive(Debug, Clone)]
struct SessionState {
    access_token: Option<String>,
    identity: Identity,
}

/// `AuthProvider` backed by the hosted service's token endpoints.
///
/// Holds the current session in memory only; no token persistence across
/// process restarts.
pub struct RestAuthProvider {
    client: Client,
    config: RestConfig,
    session: Arc<Mutex<SessionState>>,
}

impl RestAuthProvider {
    #[must_use]
    pub fn new(config: RestConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            session: Arc::new(Mutex::new(SessionState {
                access_token: None,
                identity: Identity::Anonymous,
            })),
        }
    }

    fn store_session(&self, response: SessionResponse) -> Result<Identity, AuthError> {
        let email = response
            .user
            .email
            .ok_or_else(|| AuthError::MalformedResponse("missing user email".to_string()))?;
        let identity = Identity::Account(Account::new(response.user.id, email));

        let mut guard = self
            .session
            .lock()
            .map_err(|err| AuthError::MalformedResponse(err.to_string()))?;
        guard.access_token = response.access_token;
        guard.identity = identity.clone();
        Ok(identity)
    }

    fn clear_session(&self) -> Identity {
        if let Ok(mut guard) = self.session.lock() {
            guard.access_token = None;
            guard.identity = Identity::Anonymous;
        }
        Identity::Anonymous
    }

    async fn credentials_call(
        &self,
        url: String,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let session: SessionResponse = response
                .json()
                .await
                .map_err(|err| AuthError::MalformedResponse(err.to_string()))?;
            self.store_session(session)
        } else if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            Err(AuthError::InvalidCredentials)
        } else {
            Err(AuthError::HttpStatus(status))
        }
    }
}

#[async_trait]
impl crate::auth::AuthProvider for RestAuthProvider {
    async fn current_identity(&self) -> Identity {
        self.session
            .lock()
            .map(|guard| guard.identity.clone())
            .unwrap_or(Identity::Anonymous)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = format!("{}?grant_type=password", self.config.auth_url("token"));
        self.credentials_call(url, email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = self.config.auth_url("signup");
        self.credentials_call(url, email, password).await
    }

    async fn sign_out(&self) -> Result<Identity, AuthError> {
        let token = self
            .session
            .lock()
            .ok()
            .and_then(|guard| guard.access_token.clone());

        if let Some(token) = token {
            let response = self
                .client
                .post(self.config.auth_url("logout"))
                .header("apikey", &self.config.api_key)
                .bearer_auth(token)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(AuthError::HttpStatus(response.status()));
            }
        }

        Ok(self.clear_session())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.config.auth_url("recover"))
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
