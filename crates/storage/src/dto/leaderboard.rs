use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AthleteRecord, Segment};

/// Snapshot of both segment rankings, fastest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    #[serde(rename = "athletes5k")]
    pub athletes_5k: Vec<AthleteRecord>,
    #[serde(rename = "athletes10k")]
    pub athletes_10k: Vec<AthleteRecord>,
}

impl LeaderboardResponse {
    pub fn segment(&self, segment: Segment) -> &[AthleteRecord] {
        match segment {
            Segment::FiveK => &self.athletes_5k,
            Segment::TenK => &self.athletes_10k,
        }
    }
}
