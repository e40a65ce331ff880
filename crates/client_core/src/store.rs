use async_trait::async_trait;
use serde::Serialize;
use shared::domain::{UserId, UserRecord};
use thiserror::Error;

/// Errors raised at the persistence boundary. The remote cause stays opaque;
/// callers only distinguish failed transport from undecodable payloads.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Transport(String),
    #[error("record store returned a malformed payload: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Stateless gateway to the remote record service. One suspend point per
/// operation; no retries, no caching.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError>;
    async fn create(&self, name: &str, email: &str) -> Result<UserRecord, StoreError>;
    async fn update(&self, id: UserId, name: &str, email: &str) -> Result<UserRecord, StoreError>;
    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize)]
struct CreateUserRequest {
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct UpdateUserRequest {
    name: String,
    email: String,
}

pub struct HttpUserStore {
    http: reqwest::Client,
    server_url: String,
}

impl HttpUserStore {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into(),
        }
    }
}

#[async_trait]
impl UserStore for HttpUserStore {
    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records: Vec<UserRecord> = self
            .http
            .get(format!("{}/users", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records)
    }

    async fn create(&self, name: &str, email: &str) -> Result<UserRecord, StoreError> {
        let record: UserRecord = self
            .http
            .post(format!("{}/users", self.server_url))
            .json(&CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(record)
    }

    async fn update(&self, id: UserId, name: &str, email: &str) -> Result<UserRecord, StoreError> {
        let record: UserRecord = self
            .http
            .put(format!("{}/users/{}", self.server_url, id.0))
            .json(&UpdateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(record)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.http
            .delete(format!("{}/users/{}", self.server_url, id.0))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
