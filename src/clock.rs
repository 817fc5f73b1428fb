//! Clocks used to decide which day "today" is

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::traits::Clock;

/// The wall clock of this machine. "Today" is the local calendar date.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Useful in tests, or to simulate the passing of days.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(NaiveDate, DateTime<Utc>)>,
}

impl ManualClock {
    /// Create a clock stopped at the beginning of `today` (UTC)
    pub fn new(today: NaiveDate) -> Self {
        Self { state: Mutex::new((today, start_of(today))) }
    }

    /// Move to another day. `now` is set to the beginning of that day
    pub fn set_today(&self, today: NaiveDate) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = (today, start_of(today));
    }

    /// Move the current instant, without changing the current day
    pub fn set_now(&self, now: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.1 = now;
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).0
    }

    fn now(&self) -> DateTime<Utc> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).1
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}
