use storage::{
    dto::leaderboard::LeaderboardResponse, error::Result, models::Segment,
    repository::RecordStore,
};

/// Both segment rankings, queried concurrently.
pub async fn get_leaderboard(store: &dyn RecordStore) -> Result<LeaderboardResponse> {
    let (athletes_5k, athletes_10k) = tokio::try_join!(
        store.list_by_segment_ordered(Segment::FiveK),
        store.list_by_segment_ordered(Segment::TenK),
    )?;

    Ok(LeaderboardResponse {
        athletes_5k,
        athletes_10k,
    })
}
