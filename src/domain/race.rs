// Race domain model
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of slots shown to the user, padded with placeholders.
pub const DISPLAY_CAPACITY: usize = 5;

/// How long past its advertised start a race is still shown.
pub const STALE_THRESHOLD: TimeDelta = TimeDelta::seconds(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceCategory {
    Horse,
    Harness,
    Greyhound,
}

impl RaceCategory {
    pub const ALL: [RaceCategory; 3] = [
        RaceCategory::Horse,
        RaceCategory::Harness,
        RaceCategory::Greyhound,
    ];

    /// Identifier used by the racing API for this category.
    pub fn external_id(self) -> &'static str {
        match self {
            RaceCategory::Horse => "4a2788f8-e825-4d36-9894-efd4baf1cfae",
            RaceCategory::Harness => "161d9be2-e909-4326-8c2c-35ed71fb460b",
            RaceCategory::Greyhound => "9daef0d7-bf3c-4f50-921d-8e818c60fe61",
        }
    }

    pub fn from_external_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.external_id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            RaceCategory::Horse => "Horse",
            RaceCategory::Harness => "Harness",
            RaceCategory::Greyhound => "Greyhound",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            RaceCategory::Horse => "horse",
            RaceCategory::Harness => "harness",
            RaceCategory::Greyhound => "greyhound",
        }
    }
}

impl fmt::Display for RaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown race category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for RaceCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Race {
    pub id: String,
    pub meeting_name: String,
    pub race_number: u32,
    pub category: RaceCategory,
    pub advertised_start: DateTime<Utc>,
}

impl Race {
    /// A race stops being shown once STALE_THRESHOLD has passed since its start.
    /// Starts too close to the end of the representable range never go stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.advertised_start
            .checked_add_signed(STALE_THRESHOLD)
            .is_some_and(|expiry| expiry <= now)
    }
}
