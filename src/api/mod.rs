// Story game server client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{PlayRequest, PlayResponse};

/// Why an exchange with the server failed. The player only ever sees one
/// generic message; the variant goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach story server: {0}")]
    Request(#[from] reqwest::Error),
    #[error("story server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to parse play response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can answer a player's input with the next piece of story.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayBackend: Send + Sync {
    async fn play(&self, input: &str) -> Result<PlayResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct GameClient {
    base_url: String,
    client: Client,
}

impl GameClient {
    pub fn new(base_url: &str, request_timeout: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = request_timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn play_url(&self) -> String {
        format!("{}/play", self.base_url)
    }
}

#[async_trait]
impl PlayBackend for GameClient {
    async fn play(&self, input: &str) -> Result<PlayResponse, ApiError> {
        let url = self.play_url();
        let request = PlayRequest {
            input: input.to_string(),
        };

        debug!(%url, chars = input.chars().count(), "sending play request");
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        let result: PlayResponse = serde_json::from_str(&body)?;
        debug!(
            progress = ?result.progress,
            passed = result.passed,
            completed = result.completed,
            "received play response"
        );
        Ok(result)
    }
}
