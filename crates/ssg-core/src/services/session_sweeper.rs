// ============================================================================
// SSG Core - Session Sweeper
// File: crates/ssg-core/src/services/session_sweeper.rs
// ============================================================================
//! Background task that periodically drops expired sessions of every user.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::session_service::SessionService;

pub struct SessionSweeper {
    sessions: Arc<SessionService>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<SessionService>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Spawn the loop. It exits once `shutdown` carries `true` or its sender
    /// is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Session sweeper stopped");
    }

    /// One pass. Errors are logged and swallowed.
    pub async fn sweep_once(&self) -> u64 {
        match self.sessions.prune_all_expired().await {
            Ok(0) => {
                debug!("Sweep found no expired sessions");
                0
            }
            Ok(removed) => {
                info!(removed, "Swept expired sessions");
                removed
            }
            Err(e) => {
                error!(error = %e, "Session sweep failed");
                0
            }
        }
    }
}
