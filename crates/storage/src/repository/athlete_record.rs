use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::RecordStore;
use crate::error::{Result, StorageError};
use crate::models::{AthleteRecord, Gender, NewAthleteRecord, Segment};
use crate::services::personal_best::{OverwritePolicy, UpsertAction, UpsertOutcome};

const RECORD_COLUMNS: &str = "id, name, segment, gender, time_in_seconds, time_display, pace, date, created_at, updated_at";

#[derive(FromRow)]
struct AthleteRow {
    id: Uuid,
    name: String,
    segment: String,
    gender: String,
    time_in_seconds: i32,
    time_display: String,
    pace: String,
    date: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    record: AthleteRow,
    inserted: bool,
    previous_time_display: Option<String>,
}

impl TryFrom<AthleteRow> for AthleteRecord {
    type Error = StorageError;

    fn try_from(row: AthleteRow) -> Result<Self> {
        let segment: Segment = row.segment.parse().map_err(StorageError::InvalidValue)?;
        let gender: Gender = row.gender.parse().map_err(StorageError::InvalidValue)?;

        Ok(Self {
            id: row.id,
            name: row.name,
            segment,
            gender,
            time_in_seconds: row.time_in_seconds,
            time_display: row.time_display,
            pace: row.pace,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_unique_violation(error: sqlx::Error, candidate: &NewAthleteRecord) -> StorageError {
    let error = StorageError::from(error);
    if error.is_unique_violation() {
        StorageError::ConstraintViolation(format!(
            "record for '{}' on {} already exists",
            candidate.name, candidate.segment
        ))
    } else {
        error
    }
}

/// Postgres-backed store over the `athletes` table.
#[derive(Clone)]
pub struct AthleteRecordRepository {
    pool: PgPool,
}

impl AthleteRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Removes every record whose name is in `names`. Used by the seeding tool.
    pub async fn delete_by_names(&self, names: &[String]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM athletes WHERE name = ANY($1)")
            .bind(names)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RecordStore for AthleteRecordRepository {
    async fn find_by_name_segment(
        &self,
        name: &str,
        segment: Segment,
    ) -> Result<Option<AthleteRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM athletes WHERE name = $1 AND segment = $2 LIMIT 1"
        );
        let row: Option<AthleteRow> = sqlx::query_as(&sql)
            .bind(name)
            .bind(segment.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AthleteRecord::try_from).transpose()
    }

    async fn insert(&self, candidate: &NewAthleteRecord) -> Result<AthleteRecord> {
        let sql = format!(
            r#"
            INSERT INTO athletes (name, segment, gender, time_in_seconds, time_display, pace, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RECORD_COLUMNS}
            "#
        );
        let row: AthleteRow = sqlx::query_as(&sql)
            .bind(&candidate.name)
            .bind(candidate.segment.as_str())
            .bind(candidate.gender.as_str())
            .bind(candidate.timing.time_in_seconds)
            .bind(&candidate.timing.time_display)
            .bind(&candidate.timing.pace)
            .bind(&candidate.timing.date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, candidate))?;

        row.try_into()
    }

    async fn update_by_id(&self, id: Uuid, candidate: &NewAthleteRecord) -> Result<AthleteRecord> {
        let sql = format!(
            r#"
            UPDATE athletes
            SET gender = $2,
                time_in_seconds = $3,
                time_display = $4,
                pace = $5,
                date = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING {RECORD_COLUMNS}
            "#
        );
        let row: AthleteRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(candidate.gender.as_str())
            .bind(candidate.timing.time_in_seconds)
            .bind(&candidate.timing.time_display)
            .bind(&candidate.timing.pace)
            .bind(&candidate.timing.date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        row.try_into()
    }

    async fn list_by_segment_ordered(&self, segment: Segment) -> Result<Vec<AthleteRecord>> {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM athletes
            WHERE segment = $1
            ORDER BY time_in_seconds ASC, seq ASC
            "#
        );
        let rows: Vec<AthleteRow> = sqlx::query_as(&sql)
            .bind(segment.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AthleteRecord::try_from).collect()
    }

    /// Single-statement upsert on the `(name, segment)` unique index. When the
    /// policy rejects the overwrite no row is returned and the stored record
    /// is read back to report it.
    async fn upsert(
        &self,
        candidate: &NewAthleteRecord,
        policy: OverwritePolicy,
    ) -> Result<UpsertOutcome> {
        let sql = format!(
            r#"
            WITH previous AS (
                SELECT time_display FROM athletes WHERE name = $1 AND segment = $2
            )
            INSERT INTO athletes (name, segment, gender, time_in_seconds, time_display, pace, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name, segment) DO UPDATE SET
                gender = EXCLUDED.gender,
                time_in_seconds = EXCLUDED.time_in_seconds,
                time_display = EXCLUDED.time_display,
                pace = EXCLUDED.pace,
                date = EXCLUDED.date,
                updated_at = CURRENT_TIMESTAMP
            WHERE $8 OR EXCLUDED.time_in_seconds < athletes.time_in_seconds
            RETURNING {RECORD_COLUMNS},
                (xmax = 0) AS inserted,
                (SELECT time_display FROM previous) AS previous_time_display
            "#
        );
        let row: Option<UpsertRow> = sqlx::query_as(&sql)
            .bind(&candidate.name)
            .bind(candidate.segment.as_str())
            .bind(candidate.gender.as_str())
            .bind(candidate.timing.time_in_seconds)
            .bind(&candidate.timing.time_display)
            .bind(&candidate.timing.pace)
            .bind(&candidate.timing.date)
            .bind(policy == OverwritePolicy::Always)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) if row.inserted => Ok(UpsertOutcome {
                action: UpsertAction::Created,
                previous_time_display: None,
                record: row.record.try_into()?,
            }),
            Some(row) => Ok(UpsertOutcome {
                action: UpsertAction::Updated,
                previous_time_display: row.previous_time_display,
                record: row.record.try_into()?,
            }),
            None => {
                let existing = self
                    .find_by_name_segment(&candidate.name, candidate.segment)
                    .await?
                    .ok_or(StorageError::NotFound)?;

                Ok(UpsertOutcome {
                    action: UpsertAction::Unchanged,
                    previous_time_display: Some(existing.time_display.clone()),
                    record: existing,
                })
            }
        }
    }
}
