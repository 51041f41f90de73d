// Countdown text and urgency derived from the time left before a race
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownStatus {
    Upcoming,
    StartingSoon,
    Started,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownDisplay {
    pub text: String,
    pub status: CountdownStatus,
}

impl CountdownDisplay {
    pub fn new(text: String, status: CountdownStatus) -> Self {
        Self { text, status }
    }

    pub fn is_critical(&self) -> bool {
        self.status != CountdownStatus::Upcoming
    }
}

/// Minutes under which a race is flagged as starting soon.
const STARTING_SOON_MINUTES: i64 = 5;

/// Format the time remaining until `advertised_start`, as seen at `now`.
pub fn format_countdown(now: DateTime<Utc>, advertised_start: DateTime<Utc>) -> CountdownDisplay {
    let diff = advertised_start - now;

    if diff <= TimeDelta::zero() {
        return CountdownDisplay::new("Started".to_string(), CountdownStatus::Started);
    }

    if diff < TimeDelta::minutes(1) {
        return CountdownDisplay::new(
            format!("{}s", diff.num_seconds()),
            CountdownStatus::StartingSoon,
        );
    }

    if diff < TimeDelta::hours(1) {
        let minutes = diff.num_minutes();
        let seconds = diff.num_seconds() - minutes * 60;
        let status = if minutes < STARTING_SOON_MINUTES {
            CountdownStatus::StartingSoon
        } else {
            CountdownStatus::Upcoming
        };
        return CountdownDisplay::new(format!("{}m {:02}s", minutes, seconds), status);
    }

    let hours = diff.num_hours();
    let minutes = diff.num_minutes() - hours * 60;
    CountdownDisplay::new(
        format!("{}h {:02}m", hours, minutes),
        CountdownStatus::Upcoming,
    )
}
