// Display state published to the rendering layer
use super::countdown::{format_countdown, CountdownDisplay};
use super::race::{Race, RaceCategory, DISPLAY_CAPACITY};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RaceListItem {
    RaceCard {
        id: String,
        meeting_name: String,
        race_number: u32,
        category: RaceCategory,
        countdown: CountdownDisplay,
        advertised_start: DateTime<Utc>,
    },
    Placeholder {
        key: String,
    },
}

impl RaceListItem {
    /// Stable identity for keyed rendering.
    pub fn key(&self) -> &str {
        match self {
            RaceListItem::RaceCard { id, .. } => id,
            RaceListItem::Placeholder { key } => key,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RaceListItem::Placeholder { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Network,
    Server,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl UiMessage {
    pub fn new(kind: MessageKind) -> Self {
        let text = match kind {
            MessageKind::Network => "Unable to reach the racing service. Check your connection.",
            MessageKind::Server => "The racing service returned an unexpected response.",
            MessageKind::Unknown => "Something went wrong while loading races.",
        };
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub items: Vec<RaceListItem>,
    pub selected_filters: HashSet<RaceCategory>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub message: Option<UiMessage>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            items: build_items(&[], Utc::now()),
            selected_filters: HashSet::new(),
            is_loading: true,
            is_refreshing: false,
            message: None,
            last_updated: None,
        }
    }
}

impl DisplayState {
    pub fn races(&self) -> impl Iterator<Item = &RaceListItem> {
        self.items.iter().filter(|item| !item.is_placeholder())
    }
}

/// Build exactly DISPLAY_CAPACITY items: one card per race, then placeholders.
pub fn build_items(races: &[Race], now: DateTime<Utc>) -> Vec<RaceListItem> {
    let mut items: Vec<RaceListItem> = races
        .iter()
        .take(DISPLAY_CAPACITY)
        .map(|race| RaceListItem::RaceCard {
            id: race.id.clone(),
            meeting_name: race.meeting_name.clone(),
            race_number: race.race_number,
            category: race.category,
            countdown: format_countdown(now, race.advertised_start),
            advertised_start: race.advertised_start,
        })
        .collect();

    let placeholders_needed = DISPLAY_CAPACITY - items.len();
    items.extend((0..placeholders_needed).map(|index| RaceListItem::Placeholder {
        key: format!("placeholder-{}", index),
    }));

    items
}
