pub mod athlete_record;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{AthleteRecord, NewAthleteRecord, Segment};
use crate::services::personal_best::{
    Decision, OverwritePolicy, UpsertAction, UpsertOutcome, decide,
};

pub use athlete_record::AthleteRecordRepository;
pub use memory::MemoryRecordStore;

/// Persistence seam for athlete records.
///
/// Implementations must enforce uniqueness of `(name, segment)`: a second
/// `insert` for the same pair fails with [`StorageError::ConstraintViolation`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_name_segment(
        &self,
        name: &str,
        segment: Segment,
    ) -> Result<Option<AthleteRecord>>;

    async fn insert(&self, record: &NewAthleteRecord) -> Result<AthleteRecord>;

    async fn update_by_id(&self, id: Uuid, record: &NewAthleteRecord) -> Result<AthleteRecord>;

    /// Fastest first; equal times keep insertion order.
    async fn list_by_segment_ordered(&self, segment: Segment) -> Result<Vec<AthleteRecord>>;

    /// Applies the personal-best rule for `candidate`.
    ///
    /// The default composes the primitives above. A lost insert race is
    /// resolved by re-reading the winning row and applying the rule to it.
    /// Stores that can do better override this with a single atomic write.
    async fn upsert(
        &self,
        candidate: &NewAthleteRecord,
        policy: OverwritePolicy,
    ) -> Result<UpsertOutcome> {
        let existing = self
            .find_by_name_segment(&candidate.name, candidate.segment)
            .await?;

        let Some(existing) = existing else {
            return match self.insert(candidate).await {
                Ok(record) => Ok(UpsertOutcome {
                    action: UpsertAction::Created,
                    previous_time_display: None,
                    record,
                }),
                Err(e) if e.is_unique_violation() => {
                    tracing::debug!(
                        athlete = %candidate.name,
                        segment = %candidate.segment,
                        "Lost insert race, re-reading record"
                    );
                    let winner = self
                        .find_by_name_segment(&candidate.name, candidate.segment)
                        .await?
                        .ok_or(StorageError::NotFound)?;
                    apply_to_existing(self, winner, candidate, policy).await
                }
                Err(e) => Err(e),
            };
        };

        apply_to_existing(self, existing, candidate, policy).await
    }
}

async fn apply_to_existing<S>(
    store: &S,
    existing: AthleteRecord,
    candidate: &NewAthleteRecord,
    policy: OverwritePolicy,
) -> Result<UpsertOutcome>
where
    S: RecordStore + ?Sized,
{
    let previous = existing.time_display.clone();

    match decide(Some(&existing), candidate.timing.time_in_seconds, policy) {
        Decision::Keep => Ok(UpsertOutcome {
            action: UpsertAction::Unchanged,
            previous_time_display: Some(previous),
            record: existing,
        }),
        Decision::Overwrite | Decision::Insert => {
            let record = store.update_by_id(existing.id, candidate).await?;
            Ok(UpsertOutcome {
                action: UpsertAction::Updated,
                previous_time_display: Some(previous),
                record,
            })
        }
    }
}
