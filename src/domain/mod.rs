// Domain layer - Race values, countdown formatting and display state
pub mod countdown;
pub mod display;
pub mod race;
