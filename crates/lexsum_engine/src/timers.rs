use std::time::Duration;

use lexsum_core::{Msg, SessionId};
use lexsum_logging::lexsum_trace;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub session_timeout: Duration,
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            session_timeout: Duration::from_secs(300),
            max_polls: lexsum_core::DEFAULT_MAX_POLLS,
        }
    }
}

struct ArmedTimers {
    session: SessionId,
    token: CancellationToken,
    ticker: JoinHandle<()>,
    deadline: JoinHandle<()>,
}

/// Recurring poll ticker plus the overall session timeout, cancelled together.
#[derive(Default)]
pub struct TimerSet {
    armed: Option<ArmedTimers>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms both timers for `session`, replacing any timers already running.
    pub fn start(&mut self, session: SessionId, settings: &PollSettings, tx: UnboundedSender<Msg>) {
        self.cancel_all();
        let token = CancellationToken::new();

        let ticker = {
            let token = token.clone();
            let tx = tx.clone();
            let interval = settings.interval;
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval_at(Instant::now() + interval, interval);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ticks.tick() => {
                            if tx.send(Msg::PollTick { session }).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
        };

        let deadline = {
            let token = token.clone();
            let timeout = settings.session_timeout;
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(timeout) => {
                        let _ = tx.send(Msg::SessionTimedOut { session });
                    }
                }
            })
        };

        lexsum_trace!("timers armed for session {}", session);
        self.armed = Some(ArmedTimers {
            session,
            token,
            ticker,
            deadline,
        });
    }

    /// Stops the timers if they belong to `session`. Safe to call repeatedly.
    pub fn cancel(&mut self, session: SessionId) {
        if self
            .armed
            .as_ref()
            .is_some_and(|armed| armed.session == session)
        {
            self.cancel_all();
        }
    }

    pub fn cancel_all(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.token.cancel();
            armed.ticker.abort();
            armed.deadline.abort();
            lexsum_trace!("timers cleared for session {}", armed.session);
        }
    }

    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.armed.as_ref().map(|armed| armed.session)
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
