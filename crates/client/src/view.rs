use std::fmt::Write;

use storage::{dto::leaderboard::LeaderboardResponse, models::Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// What the terminal currently shows.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardView {
    data: LeaderboardResponse,
    status: Option<StatusMessage>,
}

impl LeaderboardView {
    pub fn data(&self) -> &LeaderboardResponse {
        &self.data
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    /// Replaces the displayed snapshot. Returns whether anything changed.
    pub fn merge(&mut self, snapshot: LeaderboardResponse) -> bool {
        if self.data == snapshot {
            return false;
        }
        self.data = snapshot;
        true
    }

    pub fn render(&self, segment: Segment) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", segment.label());

        if let Some(status) = &self.status {
            let tag = match status.kind {
                StatusKind::Success => "ok",
                StatusKind::Error => "error",
                StatusKind::Info => "info",
            };
            let _ = writeln!(out, "[{}] {}", tag, status.text);
        }

        let athletes = self.data.segment(segment);
        if athletes.is_empty() {
            out.push_str("No times yet. Be the first to submit your time!\n");
            return out;
        }

        let name_width = athletes
            .iter()
            .map(|a| a.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());

        let _ = writeln!(
            out,
            "{:>4}  {:<name_width$}  {:<12}  {:>9}  {:>7}",
            "#", "Name", "Date", "Pace", "Time"
        );

        for (i, athlete) in athletes.iter().enumerate() {
            let rank = i + 1;
            let marker = if rank == 1 { " 🍾" } else { "" };
            let padding = name_width.saturating_sub(athlete.name.chars().count());
            let _ = writeln!(
                out,
                "{:>4}  {}{}  {:<12}  {:>9}  {:>7}{}",
                rank,
                athlete.name,
                " ".repeat(padding),
                athlete.date,
                athlete.pace,
                athlete.time_display,
                marker
            );
        }

        out
    }
}
