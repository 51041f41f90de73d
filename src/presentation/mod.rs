// Presentation layer - HTTP surface over the races coordinator
pub mod app_state;
pub mod error;
pub mod handlers;
