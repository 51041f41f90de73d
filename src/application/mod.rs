// Application layer - Fetch pipeline, ticking and display-state coordination
pub mod clock;
pub mod error;
pub mod next_races_service;
pub mod race_data_source;
pub mod race_mapper;
pub mod race_repository;
pub mod races_coordinator;
pub mod ticker;
