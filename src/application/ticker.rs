// Periodic refresh and countdown signals
use futures::stream::BoxStream;
use std::time::Duration;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(15);
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the two independent tick streams that drive the races coordinator.
/// Every call returns a fresh stream with its own timer; dropping it stops the timer.
pub trait RacesTicker: Send + Sync {
    fn refresh_ticks(&self) -> BoxStream<'static, ()>;
    fn countdown_ticks(&self) -> BoxStream<'static, ()>;
}

#[derive(Debug, Clone)]
pub struct DefaultRacesTicker {
    refresh_interval: Duration,
    countdown_interval: Duration,
}

impl DefaultRacesTicker {
    pub fn new(refresh_interval: Duration, countdown_interval: Duration) -> Self {
        Self {
            refresh_interval,
            countdown_interval,
        }
    }
}

impl Default for DefaultRacesTicker {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL, COUNTDOWN_INTERVAL)
    }
}

impl RacesTicker for DefaultRacesTicker {
    fn refresh_ticks(&self) -> BoxStream<'static, ()> {
        tick_stream(self.refresh_interval, true, None)
    }

    fn countdown_ticks(&self) -> BoxStream<'static, ()> {
        tick_stream(self.countdown_interval, false, None)
    }
}

/// Emit `()` every `interval`, optionally once right away, stopping after
/// `max_ticks` emissions when a cap is given.
pub fn tick_stream(
    interval: Duration,
    emit_immediately: bool,
    max_ticks: Option<usize>,
) -> BoxStream<'static, ()> {
    let reached = move |emitted: usize| max_ticks.is_some_and(|max| emitted >= max);

    Box::pin(async_stream::stream! {
        let mut emitted = 0usize;
        if reached(emitted) {
            return;
        }

        if emit_immediately {
            yield ();
            emitted += 1;
            if reached(emitted) {
                return;
            }
        }

        loop {
            tokio::time::sleep(interval).await;
            yield ();
            emitted += 1;
            if reached(emitted) {
                return;
            }
        }
    })
}
