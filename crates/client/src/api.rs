use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use storage::{
    dto::{leaderboard::LeaderboardResponse, submission::SubmitResponse},
    models::{Gender, Segment},
};

use crate::error::{ClientError, Result};

/// Body sent to `POST /api/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub name: String,
    pub segment: Segment,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Anything that can hand out leaderboard snapshots and accept times.
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    async fn fetch_leaderboard(&self) -> Result<LeaderboardResponse>;

    async fn submit(&self, submission: &Submission) -> Result<SubmitResponse>;
}

pub struct LeaderboardClient {
    base_url: String,
    client: reqwest::Client,
}

impl LeaderboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stromohrot-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl LeaderboardSource for LeaderboardClient {
    async fn fetch_leaderboard(&self) -> Result<LeaderboardResponse> {
        let response = self.client.get(self.url("/api/leaderboard")).send().await?;

        if !response.status().is_success() {
            tracing::warn!("Leaderboard request failed with status {}", response.status());
            return Err(ClientError::LeaderboardUnavailable);
        }

        Ok(response.json::<LeaderboardResponse>().await?)
    }

    async fn submit(&self, submission: &Submission) -> Result<SubmitResponse> {
        let response = self
            .client
            .post(self.url("/api/submit"))
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to submit");
            return Err(ClientError::Api(message.to_string()));
        }

        serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
