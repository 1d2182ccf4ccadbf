use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Gender, Segment};
use crate::services::time_format::{format_date, format_pace, format_time};

/// Personal best of one athlete on one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AthleteRecord {
    pub id: Uuid,
    pub name: String,
    pub segment: Segment,
    pub gender: Gender,
    pub time_in_seconds: i32,
    pub time_display: String,
    pub pace: String,
    pub date: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Time fields written together on every insert or overwrite. The display
/// strings are always derived from `time_in_seconds`, never set on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTiming {
    pub time_in_seconds: i32,
    pub time_display: String,
    pub pace: String,
    pub date: String,
}

impl RecordTiming {
    pub fn compute(time_in_seconds: i32, segment: Segment, on: NaiveDate) -> Self {
        Self {
            time_in_seconds,
            time_display: format_time(time_in_seconds),
            pace: format_pace(time_in_seconds, segment.distance_km()),
            date: format_date(on),
        }
    }
}

/// Candidate row produced by a validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAthleteRecord {
    pub name: String,
    pub segment: Segment,
    pub gender: Gender,
    pub timing: RecordTiming,
}

impl NewAthleteRecord {
    pub fn new(
        name: impl Into<String>,
        segment: Segment,
        gender: Gender,
        time_in_seconds: i32,
        on: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            segment,
            gender,
            timing: RecordTiming::compute(time_in_seconds, segment, on),
        }
    }
}

impl AthleteRecord {
    pub fn apply(&mut self, candidate: &NewAthleteRecord, now: NaiveDateTime) {
        self.gender = candidate.gender;
        self.time_in_seconds = candidate.timing.time_in_seconds;
        self.time_display = candidate.timing.time_display.clone();
        self.pace = candidate.timing.pace.clone();
        self.date = candidate.timing.date.clone();
        self.updated_at = now;
    }
}
