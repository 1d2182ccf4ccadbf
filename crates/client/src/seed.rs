//! Fixture loader for a fresh leaderboard.

use chrono::NaiveDate;
use storage::{
    error::Result,
    models::{Gender, NewAthleteRecord, Segment},
    repository::RecordStore,
    services::{
        personal_best::{OverwritePolicy, UpsertAction},
        time_format::parse_time,
    },
};

pub struct SeedEntry {
    pub name: &'static str,
    pub time: &'static str,
    pub date: (i32, u32, u32),
}

pub const TOP_10_5K: &[SeedEntry] = &[
    SeedEntry { name: "Kuba Dostál", time: "21:47", date: (2024, 5, 3) },
    SeedEntry { name: "Petr Fojtík", time: "23:03", date: (2025, 11, 4) },
    SeedEntry { name: "Vladimír Pavlík", time: "23:04", date: (2025, 9, 11) },
    SeedEntry { name: "Sylvestr Janák", time: "23:10", date: (2025, 9, 9) },
    SeedEntry { name: "steven shaughnessy", time: "23:10", date: (2024, 12, 17) },
    SeedEntry { name: "Max Pierik", time: "23:10", date: (2024, 8, 1) },
    SeedEntry { name: "Franz Z", time: "23:24", date: (2025, 4, 4) },
    SeedEntry { name: "Standa Pech", time: "23:50", date: (2025, 9, 9) },
    SeedEntry { name: "Hepcat G", time: "24:33", date: (2023, 10, 4) },
    SeedEntry { name: "Ola Jedrzejewska", time: "24:36", date: (2023, 10, 5) },
];

pub fn seeded_names() -> Vec<String> {
    TOP_10_5K.iter().map(|e| e.name.to_string()).collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Loads the 5k fixture through the normal personal-best rule, so running
/// it twice leaves the store as it was.
pub async fn seed(store: &dyn RecordStore) -> Result<SeedReport> {
    tracing::info!("Seeding 5k leaderboard...");
    let mut report = SeedReport::default();

    for entry in TOP_10_5K {
        let Some(seconds) = parse_time(entry.time) else {
            tracing::warn!("Skipping {}: bad fixture time {}", entry.name, entry.time);
            continue;
        };
        let (y, m, d) = entry.date;
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            tracing::warn!("Skipping {}: bad fixture date {:?}", entry.name, entry.date);
            continue;
        };

        let candidate =
            NewAthleteRecord::new(entry.name, Segment::FiveK, Gender::default(), seconds, date);
        let outcome = store.upsert(&candidate, OverwritePolicy::FasterOnly).await?;

        match outcome.action {
            UpsertAction::Created => report.created += 1,
            UpsertAction::Updated => report.updated += 1,
            UpsertAction::Unchanged => report.unchanged += 1,
        }
        tracing::info!("  Added: {} - {}", entry.name, outcome.record.time_display);
    }

    tracing::info!("Done! {:?}", report);
    Ok(report)
}
