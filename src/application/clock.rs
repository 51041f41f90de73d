// Injectable source of the current time
use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use chrono::TimeDelta;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    pub struct FakeClock {
        current: Mutex<DateTime<Utc>>,
    }

    impl FakeClock {
        pub fn at_epoch_seconds(secs: i64) -> Self {
            let start = DateTime::from_timestamp(secs, 0).expect("valid timestamp");
            Self {
                current: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: TimeDelta) {
            let mut current = self.current.lock().unwrap();
            *current += by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock().unwrap()
        }
    }
}
