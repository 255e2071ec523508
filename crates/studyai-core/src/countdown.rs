//! Practice-test countdown.
//!
//! A [`Countdown`] owns a spawned task that applies one tick per second to
//! the shared session. Dropping the countdown aborts the task, so whoever
//! holds it controls the timer's lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::events::{EventBroadcaster, SessionEvent};
use crate::session::{GenerationToken, Phase, SessionState, TickOutcome};

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running countdown. Aborts the task on drop.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Starts ticking `state` for the generation identified by `token`.
    ///
    /// The task stops by itself when the countdown expires or when a tick is
    /// rejected as stale.
    #[must_use]
    pub fn spawn(
        state: Arc<Mutex<SessionState>>,
        token: GenerationToken,
        events: EventBroadcaster,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let outcome = state.lock().await.tick(token);
                match outcome {
                    TickOutcome::Running(remaining) => {
                        events.send(SessionEvent::tick(remaining));
                    }
                    TickOutcome::Expired => {
                        info!("Practice test time expired");
                        events.send(SessionEvent::tick(0));
                        events.send(SessionEvent::TimeExpired);
                        events.send(SessionEvent::phase_changed(
                            Phase::Reviewing,
                            Phase::Completed,
                        ));
                        break;
                    }
                    TickOutcome::Ignored => {
                        debug!("Countdown tick ignored; stopping");
                        break;
                    }
                }
            }
        });

        Self { handle }
    }

    /// Returns `true` once the task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the countdown.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
