use crate::countdown::clock::{compute_remaining, Clock, TimeRemaining};
use chrono::{DateTime, Utc};
use std::{fmt, sync::Arc};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Counting(TimeRemaining),
    Expired,
}

impl CountdownState {
    pub fn is_expired(&self) -> bool {
        matches!(self, CountdownState::Expired)
    }
}

impl From<TimeRemaining> for CountdownState {
    fn from(remaining: TimeRemaining) -> Self {
        if remaining.is_expired() {
            CountdownState::Expired
        } else {
            CountdownState::Counting(remaining)
        }
    }
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CountdownState::Counting(remaining) => write!(f, "{}", remaining),
            CountdownState::Expired => write!(f, "In progress"),
        }
    }
}

/// Live countdown to a single instant.
///
/// A background task recomputes the remaining time once per period and
/// publishes it through a watch channel. The task ends by itself right after
/// it first observes that the instant has passed, and is aborted when the
/// timer is cancelled or dropped.
pub struct CountdownTimer {
    target: DateTime<Utc>,
    state: watch::Receiver<CountdownState>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// Starts counting down to `target`. Must be called within a tokio runtime.
    pub fn spawn(target: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        let initial = CountdownState::from(compute_remaining(target, clock.now()));
        let (tx, rx) = watch::channel(initial);

        if initial.is_expired() {
            return CountdownTimer {
                target,
                state: rx,
                handle: None,
            };
        }

        let first_tick = Instant::now() + Self::PERIOD;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(first_tick, Self::PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let state = CountdownState::from(compute_remaining(target, clock.now()));
                tx.send_replace(state);

                if state.is_expired() {
                    tracing::debug!("countdown to {} reached zero", target);
                    break;
                }
            }
        });

        CountdownTimer {
            target,
            state: rx,
            handle: Some(handle),
        }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Latest published state.
    pub fn state(&self) -> CountdownState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state.clone()
    }

    /// Whether the background task is still scheduled.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
