use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::ledger::Ledger;
use crate::store::TransactionHistory;

/// Periodically rebuilds a [`TransactionHistory`] from its ledger.
///
/// Rebuilds are synchronous, so each one runs on the blocking pool. Stopping
/// the refresher does not interrupt a rebuild already in flight; that rebuild
/// completes or fails on its own and the store stays consistent either way.
pub struct HistoryRefresher<L> {
    history: Arc<TransactionHistory>,
    ledger: Arc<L>,
    interval: Duration,
    enabled: bool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<L> HistoryRefresher<L>
where
    L: Ledger + Send + Sync + 'static,
{
    /// Create a refresher rebuilding every `interval`
    pub fn new(history: Arc<TransactionHistory>, ledger: Arc<L>, interval: Duration) -> Self {
        Self {
            history,
            ledger,
            interval,
            enabled: true,
            task: Mutex::new(None),
        }
    }

    /// Create a refresher using the configured interval and enablement
    pub fn from_config(
        history: Arc<TransactionHistory>,
        ledger: Arc<L>,
        config: &HistoryConfig,
    ) -> Self {
        Self {
            enabled: config.refresh_enabled,
            ..Self::new(history, ledger, config.refresh_interval())
        }
    }

    pub fn history(&self) -> &Arc<TransactionHistory> {
        &self.history
    }

    /// Start the background loop, replacing a running one.
    ///
    /// The first rebuild happens immediately. Returns `false` without
    /// spawning when background refresh is disabled or the interval is zero.
    pub async fn start(&self) -> bool {
        if !self.enabled {
            info!("Background history refresh disabled by configuration");
            return false;
        }
        if self.interval.is_zero() {
            warn!("History refresh interval is zero, background refresh not started");
            return false;
        }

        let mut task = self.task.lock().await;

        if let Some(handle) = task.take() {
            handle.abort();
        }

        let history = Arc::clone(self.history());
        let ledger = Arc::clone(&self.ledger);
        let interval = self.interval;
        *task = Some(tokio::spawn(async move {
            refresh_loop(history, ledger, interval).await;
        }));

        info!(interval_secs = self.interval.as_secs_f64(), "History refresher started");
        true
    }

    /// Stop the background loop. Safe to call when not running.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;

        if let Some(handle) = task.take() {
            handle.abort();
            info!("History refresher stopped");
        } else {
            debug!("No history refresher to stop");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Rebuild right now, independent of the background schedule
    pub async fn refresh_now(&self) -> Result<usize, HistoryError> {
        run_refresh(Arc::clone(self.history()), Arc::clone(&self.ledger)).await
    }
}

async fn run_refresh<L>(
    history: Arc<TransactionHistory>,
    ledger: Arc<L>,
) -> Result<usize, HistoryError>
where
    L: Ledger + Send + Sync + 'static,
{
    tokio::task::spawn_blocking(move || history.refresh(ledger.as_ref()))
        .await
        .map_err(|e| HistoryError::RefreshTask(e.to_string()))?
}

async fn refresh_loop<L>(history: Arc<TransactionHistory>, ledger: Arc<L>, interval: Duration)
where
    L: Ledger + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match run_refresh(Arc::clone(&history), Arc::clone(&ledger)).await {
            Ok(count) => debug!(count, "Background history refresh complete"),
            Err(e) => warn!(
                error = %e,
                retryable = e.is_retryable(),
                "Background history refresh failed"
            ),
        }
    }
}
