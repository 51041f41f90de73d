// Next races service - Fetch pipeline that widens its page until enough fresh races survive filtering
use crate::application::clock::Clock;
use crate::application::error::{AppError, AppResult};
use crate::application::race_data_source::RaceDataSource;
use crate::application::race_mapper::map_races;
use crate::application::race_repository::RaceRepository;
use crate::domain::race::{Race, RaceCategory, DISPLAY_CAPACITY};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

const DEFAULT_COUNT: u32 = 10;
const FETCH_INCREMENT: u32 = 10;
const MAX_FETCH_COUNT: u32 = 50;

const STATUS_OK: i32 = 200;

#[derive(Clone)]
pub struct NextRacesService {
    data_source: Arc<dyn RaceDataSource>,
    clock: Arc<dyn Clock>,
}

impl NextRacesService {
    pub fn new(data_source: Arc<dyn RaceDataSource>, clock: Arc<dyn Clock>) -> Self {
        Self { data_source, clock }
    }
}

#[async_trait]
impl RaceRepository for NextRacesService {
    async fn get_next_races(&self, category_filter: &HashSet<RaceCategory>) -> AppResult<Vec<Race>> {
        tracing::debug!("Requested filters: {:?}", category_filter);
        let now = self.clock.now();
        let mut fetch_count = DEFAULT_COUNT;

        while fetch_count <= MAX_FETCH_COUNT {
            let page = self.data_source.fetch(fetch_count).await?;
            if page.status != STATUS_OK {
                return Err(AppError::Server { code: page.status });
            }

            let races = map_races(&page.data);
            tracing::debug!("Fetched ({}) races, {} mapped", fetch_count, races.len());

            let mut fresh: Vec<Race> = races
                .into_iter()
                .filter(|race| !race.is_stale(now))
                .filter(|race| category_filter.is_empty() || category_filter.contains(&race.category))
                .collect();
            fresh.sort_by_key(|race| race.advertised_start);

            tracing::debug!(
                "After filtering: {}",
                fresh
                    .iter()
                    .map(|race| format!("{} ({})", race.meeting_name, race.category))
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            if fresh.len() >= DISPLAY_CAPACITY || fetch_count >= MAX_FETCH_COUNT {
                fresh.truncate(DISPLAY_CAPACITY);
                tracing::debug!(
                    "Returning {} races (requested count={})",
                    fresh.len(),
                    fetch_count
                );
                return Ok(fresh);
            }

            fetch_count += FETCH_INCREMENT;
        }

        tracing::debug!("No races returned after reaching max fetch count");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::testing::FakeClock;
    use crate::application::race_data_source::{
        RawAdvertisedStart, RawRaceData, RawRacePage, RawRaceSummary,
    };
    use crate::domain::race::STALE_THRESHOLD;
    use chrono::{DateTime, TimeDelta, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const NOW: i64 = 1_700_000_000;

    /// Serves the same page for every request and records requested page sizes.
    struct ScriptedDataSource {
        response: AppResult<RawRacePage>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedDataSource {
        fn new(response: AppResult<RawRacePage>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RaceDataSource for ScriptedDataSource {
        async fn fetch(&self, page_size: u32) -> AppResult<RawRacePage> {
            self.requested.lock().unwrap().push(page_size);
            self.response.clone()
        }
    }

    fn page(races: &[(&str, RaceCategory, i64)]) -> RawRacePage {
        let summaries = races
            .iter()
            .map(|(id, category, offset)| {
                let summary = RawRaceSummary {
                    race_id: id.to_string(),
                    race_name: Some(format!("Race {}", id)),
                    race_number: 1,
                    meeting_id: format!("meeting{}", id),
                    meeting_name: format!("Meeting {}", id),
                    category_id: category.external_id().to_string(),
                    advertised_start: RawAdvertisedStart {
                        seconds: NOW + offset,
                    },
                };
                (id.to_string(), summary)
            })
            .collect::<HashMap<_, _>>();

        RawRacePage {
            status: 200,
            data: RawRaceData {
                next_to_go_ids: races.iter().map(|(id, _, _)| id.to_string()).collect(),
                race_summaries: summaries,
            },
        }
    }

    fn category_for(id: u32) -> RaceCategory {
        match id % 3 {
            0 => RaceCategory::Greyhound,
            1 => RaceCategory::Horse,
            _ => RaceCategory::Harness,
        }
    }

    fn six_races() -> RawRacePage {
        page(&[
            ("1", category_for(1), 30),
            ("2", category_for(2), 2 * 60),
            ("3", category_for(3), 5 * 60),
            ("4", category_for(4), 10 * 60),
            ("5", category_for(5), 20 * 60),
            ("6", category_for(6), -2 * 60),
        ])
    }

    fn service(source: Arc<ScriptedDataSource>) -> NextRacesService {
        NextRacesService::new(source, Arc::new(FakeClock::at_epoch_seconds(NOW)))
    }

    #[tokio::test]
    async fn test_returns_fresh_races_sorted_ascending() {
        let source = ScriptedDataSource::new(Ok(six_races()));
        let now = DateTime::from_timestamp(NOW, 0).unwrap();

        let races = service(source.clone()).get_next_races(&HashSet::new()).await.unwrap();

        assert_eq!(races.len(), 5);
        assert!(races.windows(2).all(|w| w[0].advertised_start <= w[1].advertised_start));
        assert!(races.iter().all(|r| r.advertised_start + STALE_THRESHOLD > now));
        assert!(races.iter().all(|r| r.id != "6"));
        assert_eq!(source.requested(), vec![10]);
    }

    #[tokio::test]
    async fn test_filters_races_by_selected_categories() {
        let source = ScriptedDataSource::new(Ok(six_races()));
        let filter = HashSet::from([RaceCategory::Greyhound]);

        let races = service(source).get_next_races(&filter).await.unwrap();

        assert!(!races.is_empty());
        assert!(races.iter().all(|r| r.category == RaceCategory::Greyhound));
    }

    #[tokio::test]
    async fn test_escalates_page_size_until_max_when_matches_are_scarce() {
        let source = ScriptedDataSource::new(Ok(page(&[
            ("1", RaceCategory::Horse, 60),
            ("2", RaceCategory::Harness, 120),
            ("3", RaceCategory::Greyhound, 180),
        ])));
        let filter = HashSet::from([RaceCategory::Greyhound]);

        let races = service(source.clone()).get_next_races(&filter).await.unwrap();

        assert_eq!(races.len(), 1);
        assert_eq!(races[0].id, "3");
        assert_eq!(source.requested(), vec![10, 20, 30, 40, 50]);
    }

    #[tokio::test]
    async fn test_empty_page_returns_empty_list() {
        let source = ScriptedDataSource::new(Ok(page(&[])));

        let races = service(source.clone()).get_next_races(&HashSet::new()).await.unwrap();

        assert!(races.is_empty());
        assert_eq!(source.requested().last(), Some(&MAX_FETCH_COUNT));
    }

    #[tokio::test]
    async fn test_network_failure_aborts_without_retry() {
        let source = ScriptedDataSource::new(Err(AppError::Network("network down".to_string())));

        let result = service(source.clone()).get_next_races(&HashSet::new()).await;

        assert!(matches!(result, Err(AppError::Network(_))));
        assert_eq!(source.requested(), vec![10]);
    }

    #[tokio::test]
    async fn test_non_ok_payload_status_is_server_error() {
        let mut response = six_races();
        response.status = 503;
        let source = ScriptedDataSource::new(Ok(response));

        let result = service(source).get_next_races(&HashSet::new()).await;

        assert_eq!(result, Err(AppError::Server { code: 503 }));
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_output() {
        let source = ScriptedDataSource::new(Ok(six_races()));
        let service = service(source);
        let filter = HashSet::from([RaceCategory::Horse, RaceCategory::Harness]);

        let first = service.get_next_races(&filter).await.unwrap();
        let second = service.get_next_races(&filter).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_staleness_follows_clock_between_calls() {
        let source = ScriptedDataSource::new(Ok(page(&[("1", RaceCategory::Horse, -59)])));
        let clock = Arc::new(FakeClock::at_epoch_seconds(NOW));
        let service = NextRacesService::new(source, clock.clone());

        assert_eq!(service.get_next_races(&HashSet::new()).await.unwrap().len(), 1);

        clock.advance(TimeDelta::seconds(1));
        assert!(service.get_next_races(&HashSet::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_at_end_of_time_range_is_kept_last() {
        let far = DateTime::<Utc>::MAX_UTC.timestamp() - NOW;
        let source = ScriptedDataSource::new(Ok(page(&[
            ("far", RaceCategory::Greyhound, far),
            ("1", RaceCategory::Horse, 60),
        ])));

        let races = service(source).get_next_races(&HashSet::new()).await.unwrap();

        let ids: Vec<&str> = races.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "far"]);
    }
}
