use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::error::{Result, StorageError};
use crate::models::{AthleteRecord, NewAthleteRecord, Segment};
use crate::services::personal_best::{
    Decision, OverwritePolicy, UpsertAction, UpsertOutcome, decide,
};

/// Process-local store. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<AthleteRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn build_record(candidate: &NewAthleteRecord) -> AthleteRecord {
    let created_at = now();
    AthleteRecord {
        id: Uuid::new_v4(),
        name: candidate.name.clone(),
        segment: candidate.segment,
        gender: candidate.gender,
        time_in_seconds: candidate.timing.time_in_seconds,
        time_display: candidate.timing.time_display.clone(),
        pace: candidate.timing.pace.clone(),
        date: candidate.timing.date.clone(),
        created_at,
        updated_at: created_at,
    }
}

fn duplicate(candidate: &NewAthleteRecord) -> StorageError {
    StorageError::ConstraintViolation(format!(
        "record for '{}' on {} already exists",
        candidate.name, candidate.segment
    ))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_name_segment(
        &self,
        name: &str,
        segment: Segment,
    ) -> Result<Option<AthleteRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.name == name && r.segment == segment)
            .cloned())
    }

    async fn insert(&self, candidate: &NewAthleteRecord) -> Result<AthleteRecord> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.name == candidate.name && r.segment == candidate.segment)
        {
            return Err(duplicate(candidate));
        }

        let record = build_record(candidate);
        records.push(record.clone());
        Ok(record)
    }

    async fn update_by_id(&self, id: Uuid, candidate: &NewAthleteRecord) -> Result<AthleteRecord> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;

        record.apply(candidate, now());
        Ok(record.clone())
    }

    async fn list_by_segment_ordered(&self, segment: Segment) -> Result<Vec<AthleteRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<AthleteRecord> = records
            .iter()
            .filter(|r| r.segment == segment)
            .cloned()
            .collect();
        // stable sort keeps insertion order among equal times
        matching.sort_by_key(|r| r.time_in_seconds);
        Ok(matching)
    }

    async fn upsert(
        &self,
        candidate: &NewAthleteRecord,
        policy: OverwritePolicy,
    ) -> Result<UpsertOutcome> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.name == candidate.name && r.segment == candidate.segment);

        let existing = position.map(|i| &records[i]);
        match (decide(existing, candidate.timing.time_in_seconds, policy), position) {
            (Decision::Keep, Some(i)) => Ok(UpsertOutcome {
                action: UpsertAction::Unchanged,
                previous_time_display: Some(records[i].time_display.clone()),
                record: records[i].clone(),
            }),
            (_, Some(i)) => {
                let previous = records[i].time_display.clone();
                records[i].apply(candidate, now());
                Ok(UpsertOutcome {
                    action: UpsertAction::Updated,
                    previous_time_display: Some(previous),
                    record: records[i].clone(),
                })
            }
            (_, None) => {
                let record = build_record(candidate);
                records.push(record.clone());
                Ok(UpsertOutcome {
                    action: UpsertAction::Created,
                    previous_time_display: None,
                    record,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::Gender;

    fn submission(name: &str, segment: Segment, seconds: i32) -> NewAthleteRecord {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        NewAthleteRecord::new(name, segment, Gender::Male, seconds, today)
    }

    #[tokio::test]
    async fn test_first_submission_creates_record() {
        let store = MemoryRecordStore::new();
        let outcome = store
            .upsert(&submission("Alice", Segment::FiveK, 1530), OverwritePolicy::FasterOnly)
            .await
            .unwrap();

        assert_eq!(outcome.action, UpsertAction::Created);
        assert_eq!(outcome.previous_time_display, None);
        assert_eq!(outcome.record.time_in_seconds, 1530);
        assert_eq!(outcome.record.time_display, "25:30");
        assert_eq!(outcome.record.pace, "5:06 /km");
        assert_eq!(outcome.record.date, "Mar 14, 2026");
    }

    #[tokio::test]
    async fn test_slower_or_equal_resubmission_is_unchanged() {
        let store = MemoryRecordStore::new();
        let policy = OverwritePolicy::FasterOnly;
        store
            .upsert(&submission("Alice", Segment::FiveK, 1530), policy)
            .await
            .unwrap();

        for seconds in [1530, 1560] {
            let outcome = store
                .upsert(&submission("Alice", Segment::FiveK, seconds), policy)
                .await
                .unwrap();
            assert_eq!(outcome.action, UpsertAction::Unchanged);
            assert_eq!(outcome.previous_time_display.as_deref(), Some("25:30"));
        }

        let stored = store
            .find_by_name_segment("Alice", Segment::FiveK)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.time_in_seconds, 1530);
    }

    #[tokio::test]
    async fn test_faster_resubmission_updates_in_place() {
        let store = MemoryRecordStore::new();
        let policy = OverwritePolicy::FasterOnly;
        let created = store
            .upsert(&submission("Alice", Segment::FiveK, 1530), policy)
            .await
            .unwrap();
        let updated = store
            .upsert(&submission("Alice", Segment::FiveK, 1440), policy)
            .await
            .unwrap();

        assert_eq!(updated.action, UpsertAction::Updated);
        assert_eq!(updated.previous_time_display.as_deref(), Some("25:30"));
        assert_eq!(updated.record.id, created.record.id);
        assert_eq!(updated.record.time_in_seconds, 1440);
        assert_eq!(updated.record.time_display, "24:00");
        assert_eq!(updated.record.pace, "4:48 /km");
        assert_eq!(store.list_by_segment_ordered(Segment::FiveK).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_always_policy_overwrites_slower_time_and_gender() {
        let store = MemoryRecordStore::new();
        store
            .upsert(&submission("Alice", Segment::FiveK, 1440), OverwritePolicy::Always)
            .await
            .unwrap();

        let mut slower = submission("Alice", Segment::FiveK, 1530);
        slower.gender = Gender::Female;
        let outcome = store.upsert(&slower, OverwritePolicy::Always).await.unwrap();

        assert_eq!(outcome.action, UpsertAction::Updated);
        assert_eq!(outcome.previous_time_display.as_deref(), Some("24:00"));
        assert_eq!(outcome.record.time_in_seconds, 1530);
        assert_eq!(outcome.record.gender, Gender::Female);
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let store = MemoryRecordStore::new();
        let policy = OverwritePolicy::FasterOnly;
        store
            .upsert(&submission("alice", Segment::FiveK, 1530), policy)
            .await
            .unwrap();
        let outcome = store
            .upsert(&submission("Alice", Segment::FiveK, 1600), policy)
            .await
            .unwrap();

        assert_eq!(outcome.action, UpsertAction::Created);
        assert_eq!(store.list_by_segment_ordered(Segment::FiveK).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_same_name_on_other_segment_is_separate() {
        let store = MemoryRecordStore::new();
        let policy = OverwritePolicy::FasterOnly;
        store
            .upsert(&submission("Alice", Segment::FiveK, 1530), policy)
            .await
            .unwrap();
        let outcome = store
            .upsert(&submission("Alice", Segment::TenK, 3300), policy)
            .await
            .unwrap();

        assert_eq!(outcome.action, UpsertAction::Created);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_constraint_violation() {
        let store = MemoryRecordStore::new();
        let candidate = submission("Bob", Segment::TenK, 3000);
        store.insert(&candidate).await.unwrap();

        let err = store.insert(&candidate).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = store
            .update_by_id(Uuid::new_v4(), &submission("Bob", Segment::TenK, 3000))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_list_is_ordered_with_stable_ties() {
        let store = MemoryRecordStore::new();
        let policy = OverwritePolicy::FasterOnly;
        for (name, seconds) in [("Sylvestr", 1390), ("Kuba", 1307), ("Steven", 1390), ("Max", 1390)] {
            store
                .upsert(&submission(name, Segment::FiveK, seconds), policy)
                .await
                .unwrap();
        }
        store
            .upsert(&submission("Petr", Segment::TenK, 2800), policy)
            .await
            .unwrap();

        let five_k = store.list_by_segment_ordered(Segment::FiveK).await.unwrap();
        let names: Vec<&str> = five_k.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Kuba", "Sylvestr", "Steven", "Max"]);
        assert!(five_k
            .windows(2)
            .all(|w| w[0].time_in_seconds <= w[1].time_in_seconds));
    }

    /// Only the primitive operations, so `upsert` runs the trait default.
    /// `read_delay` stalls after each lookup to widen the find/insert window.
    struct Primitives {
        inner: MemoryRecordStore,
        read_delay: Option<Duration>,
    }

    impl Primitives {
        fn new(read_delay: Option<Duration>) -> Self {
            Self {
                inner: MemoryRecordStore::new(),
                read_delay,
            }
        }
    }

    #[async_trait]
    impl RecordStore for Primitives {
        async fn find_by_name_segment(
            &self,
            name: &str,
            segment: Segment,
        ) -> Result<Option<AthleteRecord>> {
            let found = self.inner.find_by_name_segment(name, segment).await;
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            found
        }
        async fn insert(&self, record: &NewAthleteRecord) -> Result<AthleteRecord> {
            self.inner.insert(record).await
        }
        async fn update_by_id(&self, id: Uuid, record: &NewAthleteRecord) -> Result<AthleteRecord> {
            self.inner.update_by_id(id, record).await
        }
        async fn list_by_segment_ordered(&self, segment: Segment) -> Result<Vec<AthleteRecord>> {
            self.inner.list_by_segment_ordered(segment).await
        }
    }

    #[tokio::test]
    async fn test_default_upsert_over_primitives_matches_rule() {
        let store = Primitives::new(None);
        let policy = OverwritePolicy::FasterOnly;
        let actions = [
            store.upsert(&submission("Alice", Segment::FiveK, 1530), policy).await.unwrap(),
            store.upsert(&submission("Alice", Segment::FiveK, 1560), policy).await.unwrap(),
            store.upsert(&submission("Alice", Segment::FiveK, 1440), policy).await.unwrap(),
        ]
        .map(|o| o.action);

        assert_eq!(
            actions,
            [UpsertAction::Created, UpsertAction::Unchanged, UpsertAction::Updated]
        );
    }

    #[tokio::test]
    async fn test_default_upsert_recovers_from_lost_insert_race() {
        let store = Primitives::new(Some(Duration::from_millis(20)));
        let candidate = submission("Alice", Segment::FiveK, 1530);
        let policy = OverwritePolicy::FasterOnly;

        // Both calls see no row, then race to insert.
        let (first, second) = tokio::join!(
            store.upsert(&candidate, policy),
            store.upsert(&candidate, policy)
        );
        let mut actions = vec![first.unwrap().action, second.unwrap().action];
        actions.sort_by_key(|a| matches!(a, UpsertAction::Unchanged));

        assert_eq!(actions, vec![UpsertAction::Created, UpsertAction::Unchanged]);
        let rows = store.list_by_segment_ordered(Segment::FiveK).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time_in_seconds, 1530);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_keep_one_row_per_pair() {
        let store = Arc::new(MemoryRecordStore::new());
        let mut handles = Vec::new();
        for seconds in (1400..1440).rev() {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert(&submission("Alice", Segment::FiveK, seconds), OverwritePolicy::FasterOnly)
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let rows = store.list_by_segment_ordered(Segment::FiveK).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time_in_seconds, 1400);

        let pairs: HashSet<(String, Segment)> =
            rows.iter().map(|r| (r.name.clone(), r.segment)).collect();
        assert_eq!(pairs.len(), rows.len());
    }
}
