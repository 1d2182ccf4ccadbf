use std::future::Future;
use std::time::Duration;

use storage::dto::submission::SubmitResponse;
use tokio::time::MissedTickBehavior;

use crate::api::{LeaderboardSource, Submission};
use crate::error::Result;
use crate::view::{LeaderboardView, StatusKind, StatusMessage};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Keeps a [`LeaderboardView`] in sync with the server by polling.
pub struct Poller<S> {
    source: S,
    interval: Duration,
    view: LeaderboardView,
}

impl<S: LeaderboardSource> Poller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            view: LeaderboardView::default(),
        }
    }

    pub fn view(&self) -> &LeaderboardView {
        &self.view
    }

    /// Fetches once. Returns whether the displayed data changed. A failed
    /// fetch keeps the previous data and is surfaced in the status line.
    pub async fn refresh(&mut self) -> bool {
        match self.source.fetch_leaderboard().await {
            Ok(snapshot) => self.view.merge(snapshot),
            Err(e) => {
                tracing::warn!("Leaderboard refresh failed: {}", e);
                self.view
                    .set_status(StatusMessage::new(StatusKind::Error, e.to_string()));
                true
            }
        }
    }

    /// Submits a time and refreshes right away on success. The server's
    /// message stays in the status line even if that refresh fails.
    pub async fn submit(&mut self, submission: &Submission) -> Result<SubmitResponse> {
        self.view.set_status(StatusMessage::new(
            StatusKind::Info,
            "Submitting your time...",
        ));

        match self.source.submit(submission).await {
            Ok(response) => {
                self.view
                    .set_status(StatusMessage::new(StatusKind::Success, &response.message));
                match self.source.fetch_leaderboard().await {
                    Ok(snapshot) => {
                        self.view.merge(snapshot);
                    }
                    Err(e) => tracing::warn!("Refresh after submit failed: {}", e),
                }
                Ok(response)
            }
            Err(e) => {
                self.view
                    .set_status(StatusMessage::new(StatusKind::Error, e.to_string()));
                Err(e)
            }
        }
    }

    /// Polls until `shutdown` resolves, calling `on_change` after the first
    /// fetch and whenever the view changes.
    pub async fn run<F, Fut>(&mut self, mut on_change: F, shutdown: Fut)
    where
        F: FnMut(&LeaderboardView),
        Fut: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut first = true;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if self.refresh().await || first {
                        on_change(&self.view);
                    }
                    first = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use storage::{
        dto::leaderboard::LeaderboardResponse,
        models::{Gender, NewAthleteRecord, Segment},
        repository::{MemoryRecordStore, RecordStore},
        services::personal_best::{OverwritePolicy, UpsertAction},
    };

    use super::*;
    use crate::error::ClientError;

    /// In-process stand-in for the HTTP API.
    #[derive(Default)]
    struct FakeSource {
        store: MemoryRecordStore,
        fetches: AtomicUsize,
        offline: Mutex<bool>,
    }

    #[async_trait]
    impl LeaderboardSource for FakeSource {
        async fn fetch_leaderboard(&self) -> Result<LeaderboardResponse> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if *self.offline.lock().unwrap() {
                return Err(ClientError::LeaderboardUnavailable);
            }
            Ok(LeaderboardResponse {
                athletes_5k: self.store.list_by_segment_ordered(Segment::FiveK).await.unwrap(),
                athletes_10k: self.store.list_by_segment_ordered(Segment::TenK).await.unwrap(),
            })
        }

        async fn submit(&self, submission: &Submission) -> Result<SubmitResponse> {
            let seconds = storage::services::time_format::parse_time(&submission.time)
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    ClientError::Api("Invalid time format. Use mm:ss (e.g. 25:30)".to_string())
                })?;
            let candidate = NewAthleteRecord::new(
                submission.name.clone(),
                submission.segment,
                submission.gender.unwrap_or_default(),
                seconds,
                NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            );
            let outcome = self
                .store
                .upsert(&candidate, OverwritePolicy::FasterOnly)
                .await
                .unwrap();
            Ok(SubmitResponse::from_outcome(&outcome))
        }
    }

    fn submission(name: &str, time: &str) -> Submission {
        Submission {
            name: name.to_string(),
            segment: Segment::FiveK,
            time: time.to_string(),
            gender: Some(Gender::Female),
        }
    }

    #[tokio::test]
    async fn test_successful_submit_refreshes_immediately() {
        let mut poller = Poller::new(FakeSource::default(), DEFAULT_POLL_INTERVAL);

        let response = poller.submit(&submission("Alice", "25:30")).await.unwrap();

        assert_eq!(response.message, "Time submitted! 25:30 for 5k.");
        assert_eq!(poller.source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(poller.view().data().athletes_5k[0].name, "Alice");
        let status = poller.view().status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, "Time submitted! 25:30 for 5k.");
    }

    #[tokio::test]
    async fn test_rejected_submit_shows_server_message_without_refresh() {
        let mut poller = Poller::new(FakeSource::default(), DEFAULT_POLL_INTERVAL);

        let err = poller.submit(&submission("Bob", "0:00")).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid time format. Use mm:ss (e.g. 25:30)");
        assert_eq!(poller.source.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(poller.view().status().unwrap().kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_data() {
        let mut poller = Poller::new(FakeSource::default(), DEFAULT_POLL_INTERVAL);
        poller.submit(&submission("Alice", "25:30")).await.unwrap();

        *poller.source.offline.lock().unwrap() = true;
        assert!(poller.refresh().await);

        assert_eq!(poller.view().data().athletes_5k.len(), 1);
        assert_eq!(
            poller.view().status().unwrap().text,
            "Failed to fetch leaderboard"
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_after_submit_keeps_success_message() {
        let mut poller = Poller::new(FakeSource::default(), DEFAULT_POLL_INTERVAL);
        *poller.source.offline.lock().unwrap() = true;

        let response = poller.submit(&submission("Alice", "25:30")).await.unwrap();

        assert_eq!(response.action, UpsertAction::Created);
        assert_eq!(poller.source.fetches.load(Ordering::SeqCst), 1);
        assert!(poller.view().data().athletes_5k.is_empty());
        let status = poller.view().status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, "Time submitted! 25:30 for 5k.");
    }

    #[tokio::test]
    async fn test_run_polls_until_shutdown() {
        let mut poller = Poller::new(FakeSource::default(), Duration::from_millis(10));
        let mut renders = 0;

        poller
            .run(
                |_| renders += 1,
                tokio::time::sleep(Duration::from_millis(65)),
            )
            .await;

        assert!(poller.source.fetches.load(Ordering::SeqCst) >= 3);
        // only the first fetch renders; the data never changes afterwards
        assert_eq!(renders, 1);
    }
}
