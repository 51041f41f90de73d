// Data source trait for the remote racing API
use crate::application::error::AppResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// One page of "next to go" races as returned by the racing API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRacePage {
    pub status: i32,
    pub data: RawRaceData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRaceData {
    /// Race ids in the API's priority order
    pub next_to_go_ids: Vec<String>,
    #[serde(default)]
    pub race_summaries: HashMap<String, RawRaceSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRaceSummary {
    pub race_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub race_name: Option<String>,
    pub race_number: i64,
    #[allow(dead_code)]
    pub meeting_id: String,
    pub meeting_name: String,
    pub category_id: String,
    pub advertised_start: RawAdvertisedStart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAdvertisedStart {
    pub seconds: i64,
}

#[async_trait]
pub trait RaceDataSource: Send + Sync {
    /// Fetch up to `page_size` upcoming races. No retries happen here.
    async fn fetch(&self, page_size: u32) -> AppResult<RawRacePage>;
}
