// Races coordinator - Merges refresh ticks, countdown ticks and filter commands into one display state
use crate::application::clock::Clock;
use crate::application::error::{AppError, AppResult};
use crate::application::race_repository::RaceRepository;
use crate::application::ticker::RacesTicker;
use crate::domain::display::{build_items, DisplayState, MessageKind, UiMessage};
use crate::domain::race::{Race, RaceCategory};
use anyhow::Context;
use futures::{FutureExt, StreamExt};
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;
const RESULT_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacesCommand {
    ToggleFilter(RaceCategory),
    ClearFilters,
    DismissMessage,
}

/// Builds and starts the single task that owns race display state.
pub struct RacesCoordinator {
    repository: Arc<dyn RaceRepository>,
    clock: Arc<dyn Clock>,
    ticker: Arc<dyn RacesTicker>,
}

impl RacesCoordinator {
    pub fn new(
        repository: Arc<dyn RaceRepository>,
        clock: Arc<dyn Clock>,
        ticker: Arc<dyn RacesTicker>,
    ) -> Self {
        Self {
            repository,
            clock,
            ticker,
        }
    }

    pub fn start(self) -> RacesHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(DisplayState::default());
        let shutdown = CancellationToken::new();

        let event_loop = RacesLoop::new(self.repository, self.clock, state_tx);
        let task = tokio::spawn(event_loop.run(self.ticker, command_rx, shutdown.clone()));

        RacesHandle {
            client: RacesClient {
                commands: command_tx,
                state: state_rx,
            },
            shutdown,
            task,
        }
    }
}

/// Cheap, clonable access to published state and commands.
#[derive(Clone)]
pub struct RacesClient {
    commands: mpsc::Sender<RacesCommand>,
    state: watch::Receiver<DisplayState>,
}

impl RacesClient {
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    pub async fn toggle_filter(&self, category: RaceCategory) -> anyhow::Result<()> {
        self.send(RacesCommand::ToggleFilter(category)).await
    }

    pub async fn clear_filters(&self) -> anyhow::Result<()> {
        self.send(RacesCommand::ClearFilters).await
    }

    pub async fn dismiss_message(&self) -> anyhow::Result<()> {
        self.send(RacesCommand::DismissMessage).await
    }

    async fn send(&self, command: RacesCommand) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .await
            .context("races coordinator has stopped")
    }
}

/// Owner of the running coordinator; `shutdown` stops timers and any in-flight fetch.
pub struct RacesHandle {
    client: RacesClient,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl RacesHandle {
    pub fn client(&self) -> RacesClient {
        self.client.clone()
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!("Races coordinator task ended abnormally: {}", e);
        }
    }
}

struct FetchOutcome {
    generation: u64,
    result: AppResult<Vec<Race>>,
}

struct RacesLoop {
    repository: Arc<dyn RaceRepository>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<DisplayState>,
    selected_filters: HashSet<RaceCategory>,
    latest_races: Vec<Race>,
    has_loaded: bool,
    // Filter changes only trigger fetches once refreshing has begun.
    refresh_seen: bool,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl RacesLoop {
    fn new(
        repository: Arc<dyn RaceRepository>,
        clock: Arc<dyn Clock>,
        state: watch::Sender<DisplayState>,
    ) -> Self {
        Self {
            repository,
            clock,
            state,
            selected_filters: HashSet::new(),
            latest_races: Vec::new(),
            has_loaded: false,
            refresh_seen: false,
            generation: 0,
            in_flight: None,
        }
    }

    async fn run(
        mut self,
        ticker: Arc<dyn RacesTicker>,
        mut commands: mpsc::Receiver<RacesCommand>,
        shutdown: CancellationToken,
    ) {
        info!("Races coordinator started");

        let mut refresh_ticks = ticker.refresh_ticks();
        let mut countdown_ticks = ticker.countdown_ticks();
        let (results_tx, mut results_rx) = mpsc::channel(RESULT_BUFFER);
        let mut refresh_open = true;
        let mut countdown_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Races coordinator: shutdown requested");
                    break;
                }

                tick = refresh_ticks.next(), if refresh_open => match tick {
                    Some(()) => {
                        self.refresh_seen = true;
                        self.start_fetch(&results_tx);
                    }
                    None => {
                        debug!("Refresh ticks ended");
                        refresh_open = false;
                    }
                },

                tick = countdown_ticks.next(), if countdown_open => match tick {
                    Some(()) => self.on_countdown_tick(),
                    None => {
                        debug!("Countdown ticks ended");
                        countdown_open = false;
                    }
                },

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &results_tx),
                    None => {
                        info!("Command channel closed, stopping races coordinator");
                        break;
                    }
                },

                Some(outcome) = results_rx.recv() => self.apply_outcome(outcome),
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        info!("Races coordinator stopped");
    }

    fn handle_command(&mut self, command: RacesCommand, results: &mpsc::Sender<FetchOutcome>) {
        match command {
            RacesCommand::ToggleFilter(category) => {
                if !self.selected_filters.remove(&category) {
                    self.selected_filters.insert(category);
                }
                self.on_filters_changed(results);
            }
            RacesCommand::ClearFilters => {
                if !self.selected_filters.is_empty() {
                    self.selected_filters.clear();
                    self.on_filters_changed(results);
                }
            }
            RacesCommand::DismissMessage => {
                self.state.send_modify(|state| state.message = None);
            }
        }
    }

    fn on_filters_changed(&mut self, results: &mpsc::Sender<FetchOutcome>) {
        debug!("Selected filters now {:?}", self.selected_filters);
        let filters = self.selected_filters.clone();
        self.state.send_modify(|state| state.selected_filters = filters);

        if self.refresh_seen {
            self.start_fetch(results);
        }
    }

    /// Start a fetch for the current filters, cancelling any fetch still running.
    fn start_fetch(&mut self, results: &mpsc::Sender<FetchOutcome>) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.generation += 1;
        let generation = self.generation;

        let initial_load = !self.has_loaded;
        self.state.send_modify(|state| {
            state.is_loading = initial_load;
            state.is_refreshing = !initial_load;
        });

        let repository = self.repository.clone();
        let filters = self.selected_filters.clone();
        let results = results.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = AssertUnwindSafe(repository.get_next_races(&filters))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(AppError::Unknown("race fetch panicked".to_string())));
            let _ = results.send(FetchOutcome { generation, result }).await;
        }));
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            debug!(
                "Discarding result of superseded fetch {} (current {})",
                outcome.generation, self.generation
            );
            return;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(races) => {
                debug!("Loaded {} races", races.len());
                let now = self.clock.now();
                self.latest_races = races;
                self.has_loaded = true;

                let items = build_items(&self.latest_races, now);
                let filters = self.selected_filters.clone();
                self.state.send_modify(|state| {
                    state.items = items;
                    state.selected_filters = filters;
                    state.is_loading = false;
                    state.is_refreshing = false;
                    state.message = None;
                    state.last_updated = Some(now);
                });
            }
            Err(error) => {
                warn!("Failed to load races: {}", error);
                let message = message_for(&error);
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.is_refreshing = false;
                    state.message = Some(message);
                });
            }
        }
    }

    fn on_countdown_tick(&mut self) {
        if self.latest_races.is_empty() {
            return;
        }
        let items = build_items(&self.latest_races, self.clock.now());
        self.state.send_modify(|state| state.items = items);
    }
}

fn message_for(error: &AppError) -> UiMessage {
    let kind = match error {
        AppError::Network(_) => MessageKind::Network,
        AppError::Serialization(_) | AppError::Server { .. } => MessageKind::Server,
        AppError::Unknown(_) => MessageKind::Unknown,
    };
    UiMessage::new(kind)
}
