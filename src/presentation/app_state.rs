// Application state for HTTP handlers
use crate::application::races_coordinator::RacesClient;

#[derive(Clone)]
pub struct AppState {
    pub races: RacesClient,
}
