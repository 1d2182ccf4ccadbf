use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{Gender, Segment};
use crate::services::personal_best::{UpsertAction, UpsertOutcome};
use crate::services::time_format::parse_time;

/// Raw submission body. Fields are kept untyped so that a wrong JSON type is
/// reported with the same message as a missing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitRequest {
    #[schema(value_type = String, example = "Alice")]
    pub name: Option<Value>,
    #[schema(value_type = String, example = "5k")]
    pub segment: Option<Value>,
    #[schema(value_type = String, example = "25:30")]
    pub time: Option<Value>,
    #[schema(value_type = Option<String>, example = "female")]
    pub gender: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Name is required")]
    NameRequired,

    #[error("Segment must be 5k or 10k")]
    InvalidSegment,

    #[error("Time is required (format: mm:ss)")]
    TimeRequired,

    #[error("Invalid time format. Use mm:ss (e.g. 25:30)")]
    InvalidTime,

    #[error("Gender must be male or female")]
    InvalidGender,
}

/// Submission that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub segment: Segment,
    pub gender: Gender,
    pub time_in_seconds: i32,
}

impl SubmitRequest {
    /// Checks fields in order and stops at the first failure.
    pub fn validate(&self) -> Result<ValidSubmission, SubmissionError> {
        let name = self
            .name
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(SubmissionError::NameRequired)?;

        let segment: Segment = self
            .segment
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .ok_or(SubmissionError::InvalidSegment)?;

        let time = self
            .time
            .as_ref()
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(SubmissionError::TimeRequired)?;

        let time_in_seconds = parse_time(time)
            .filter(|seconds| *seconds > 0)
            .ok_or(SubmissionError::InvalidTime)?;

        let gender = match &self.gender {
            None | Some(Value::Null) => Gender::default(),
            Some(value) => value
                .as_str()
                .and_then(|g| g.parse().ok())
                .ok_or(SubmissionError::InvalidGender)?,
        };

        Ok(ValidSubmission {
            name: name.to_string(),
            segment,
            gender,
            time_in_seconds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub action: UpsertAction,
    pub message: String,
}

impl SubmitResponse {
    pub fn from_outcome(outcome: &UpsertOutcome) -> Self {
        let previous = outcome.previous_time_display.as_deref().unwrap_or("unknown");
        let message = match outcome.action {
            UpsertAction::Created => format!(
                "Time submitted! {} for {}.",
                outcome.record.time_display, outcome.record.segment
            ),
            UpsertAction::Updated => format!(
                "Time updated! {} (was {})",
                outcome.record.time_display, previous
            ),
            UpsertAction::Unchanged => {
                format!("Your existing time ({}) is already faster.", previous)
            }
        };

        Self {
            success: true,
            action: outcome.action,
            message,
        }
    }
}
