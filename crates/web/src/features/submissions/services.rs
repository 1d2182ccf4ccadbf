use chrono::NaiveDate;
use storage::{
    dto::submission::ValidSubmission,
    error::Result,
    models::NewAthleteRecord,
    repository::RecordStore,
    services::personal_best::{OverwritePolicy, UpsertAction, UpsertOutcome},
};

/// Applies a validated submission to the store under `policy`.
pub async fn submit_time(
    store: &dyn RecordStore,
    policy: OverwritePolicy,
    submission: ValidSubmission,
    today: NaiveDate,
) -> Result<UpsertOutcome> {
    let candidate = NewAthleteRecord::new(
        submission.name,
        submission.segment,
        submission.gender,
        submission.time_in_seconds,
        today,
    );

    let outcome = store.upsert(&candidate, policy).await?;

    match outcome.action {
        UpsertAction::Created | UpsertAction::Updated => tracing::info!(
            athlete = %outcome.record.name,
            segment = %outcome.record.segment,
            time = %outcome.record.time_display,
            action = ?outcome.action,
            "Recorded time"
        ),
        UpsertAction::Unchanged => tracing::debug!(
            athlete = %outcome.record.name,
            segment = %outcome.record.segment,
            "Existing time kept"
        ),
    }

    Ok(outcome)
}
