//! Conversions between `mm:ss` text, whole seconds and pace strings.

use chrono::NaiveDate;

/// Parses `mm:ss` (1-3 minute digits, exactly 2 second digits) into total
/// seconds. Surrounding whitespace is ignored. Seconds must be below 60.
pub fn parse_time(text: &str) -> Option<i32> {
    let (minutes, seconds) = text.trim().split_once(':')?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(1..=3).contains(&minutes.len()) || seconds.len() != 2 {
        return None;
    }
    if !all_digits(minutes) || !all_digits(seconds) {
        return None;
    }

    let minutes: i32 = minutes.parse().ok()?;
    let seconds: i32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }

    Some(minutes * 60 + seconds)
}

/// `M:SS`, minutes unpadded.
pub fn format_time(seconds: i32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `M:SS /km`, both parts truncated.
pub fn format_pace(seconds: i32, distance_km: f64) -> String {
    let pace_seconds = f64::from(seconds) / distance_km;
    let minutes = (pace_seconds / 60.0).floor() as i64;
    let secs = (pace_seconds % 60.0).floor() as i64;
    format!("{}:{:02} /km", minutes, secs)
}

/// `MMM D, YYYY`, e.g. `May 3, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
