// Mapper from raw API records to domain races
use crate::application::race_data_source::{RawRaceData, RawRaceSummary};
use crate::domain::race::{Race, RaceCategory};
use chrono::DateTime;

/// Map races in `next_to_go_ids` order, dropping (and logging) records that
/// cannot be represented.
pub fn map_races(data: &RawRaceData) -> Vec<Race> {
    data.next_to_go_ids
        .iter()
        .filter_map(|race_id| {
            let Some(summary) = data.race_summaries.get(race_id) else {
                tracing::warn!("No summary for race {}, skipping", race_id);
                return None;
            };
            map_summary(summary)
        })
        .collect()
}

fn map_summary(summary: &RawRaceSummary) -> Option<Race> {
    let Some(category) = RaceCategory::from_external_id(&summary.category_id) else {
        tracing::warn!(
            "Unknown category {} for race {}, skipping",
            summary.category_id,
            summary.race_id
        );
        return None;
    };

    let Some(race_number) = u32::try_from(summary.race_number).ok().filter(|n| *n > 0) else {
        tracing::warn!(
            "Invalid race number {} for race {}, skipping",
            summary.race_number,
            summary.race_id
        );
        return None;
    };

    let Some(advertised_start) = DateTime::from_timestamp(summary.advertised_start.seconds, 0)
    else {
        tracing::warn!(
            "Advertised start {} out of range for race {}, skipping",
            summary.advertised_start.seconds,
            summary.race_id
        );
        return None;
    };

    Some(Race {
        id: summary.race_id.clone(),
        meeting_name: summary.meeting_name.clone(),
        race_number,
        category,
        advertised_start,
    })
}
