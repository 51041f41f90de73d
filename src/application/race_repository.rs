// Repository trait consumed by the races coordinator
use crate::application::error::AppResult;
use crate::domain::race::{Race, RaceCategory};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait RaceRepository: Send + Sync {
    /// Next fresh races, sorted by advertised start, at most DISPLAY_CAPACITY long.
    /// An empty filter means every category.
    async fn get_next_races(&self, category_filter: &HashSet<RaceCategory>) -> AppResult<Vec<Race>>;
}
