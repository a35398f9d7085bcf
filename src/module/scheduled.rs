///! Scheduled task manager
///!
///! Owns the two long-lived background activities: the poll worker that
///! runs bridge cycles, and the session's receive task (stopped through
///! the session itself). start/stop are cooperative: the poll worker
///! checks a running flag before each iteration, and stopping closes
///! the session socket so its blocked receive task unblocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::module::aprs::session::AprsSession;
use crate::module::bridge::Bridge;

pub struct ScheduledTaskManager {
    poll_interval: Duration,
    bridge: Arc<Bridge>,
    session: Arc<AprsSession>,
    running: Arc<AtomicBool>,
    poll_handle: Option<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(poll_interval: Duration, bridge: Arc<Bridge>, session: Arc<AprsSession>) -> Self {
        Self {
            poll_interval,
            bridge,
            session,
            running: Arc::new(AtomicBool::new(false)),
            poll_handle: None,
        }
    }

    /// Spawn the poll worker. Cycles never overlap: each one completes
    /// before the idle wait for the next begins.
    pub fn start(&mut self) {
        if self.poll_handle.is_some() {
            warn!("Poll worker already running");
            return;
        }

        info!(
            "Starting poll worker (interval: {}s)",
            self.poll_interval.as_secs()
        );
        self.running.store(true, Ordering::SeqCst);

        let bridge = self.bridge.clone();
        let running = self.running.clone();
        let interval = self.poll_interval;
        self.poll_handle = Some(tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                if let Err(e) = bridge.run_cycle().await {
                    warn!("Poll cycle failed, retrying next interval: {:#}", e);
                }
                tokio::time::sleep(interval).await;
            }
            info!("Poll worker stopped");
        }));
    }

    /// Stop both workers: flip the running flag, close the session
    /// socket (which unblocks the receive task), then wait for the poll
    /// worker to notice.
    pub async fn stop(&mut self) {
        info!("Stopping scheduled tasks");
        self.running.store(false, Ordering::SeqCst);
        self.session.stop().await;

        if let Some(handle) = self.poll_handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use chrono_tz::Tz;

    #[tokio::test]
    async fn test_start_stop_without_connection() {
        // The cycle fails (no such log file, no session) but the worker
        // must keep running and stop cleanly on request.
        let session = Arc::new(AprsSession::new());
        let bridge = Arc::new(Bridge::new(
            "/nonexistent/WiresAccess.log",
            Tz::UTC,
            "test",
            TimeDelta::minutes(5),
            session.clone(),
        ));

        let mut manager =
            ScheduledTaskManager::new(Duration::from_millis(10), bridge, session);
        manager.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let stopped =
            tokio::time::timeout(Duration::from_secs(5), manager.stop()).await;
        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let session = Arc::new(AprsSession::new());
        let bridge = Arc::new(Bridge::new(
            "/nonexistent/WiresAccess.log",
            Tz::UTC,
            "test",
            TimeDelta::minutes(5),
            session.clone(),
        ));

        let mut manager =
            ScheduledTaskManager::new(Duration::from_millis(10), bridge, session);
        manager.start();
        manager.start();
        manager.stop().await;
    }
}
