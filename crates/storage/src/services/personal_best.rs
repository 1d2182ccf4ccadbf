use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::AthleteRecord;

/// How a resubmission for an existing (name, segment) is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Only a strictly faster time replaces the stored one.
    #[default]
    FasterOnly,
    /// Every resubmission replaces the stored time.
    Always,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FasterOnly => f.write_str("faster_only"),
            Self::Always => f.write_str("always"),
        }
    }
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "faster_only" | "fasteronly" | "faster-only" => Ok(Self::FasterOnly),
            "always" => Ok(Self::Always),
            other => Err(format!(
                "unknown overwrite policy '{}', expected 'faster_only' or 'always'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
    Unchanged,
}

/// Result of applying a submission to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    /// Display time stored before this submission, if a record existed.
    pub previous_time_display: Option<String>,
    /// Record as stored after the submission.
    pub record: AthleteRecord,
}

/// What to do with a candidate time given the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Insert,
    Overwrite,
    Keep,
}

pub fn decide(
    existing: Option<&AthleteRecord>,
    new_time_in_seconds: i32,
    policy: OverwritePolicy,
) -> Decision {
    match existing {
        None => Decision::Insert,
        Some(_) if policy == OverwritePolicy::Always => Decision::Overwrite,
        Some(record) if new_time_in_seconds < record.time_in_seconds => Decision::Overwrite,
        Some(_) => Decision::Keep,
    }
}
