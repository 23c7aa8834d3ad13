use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::aggregator::CycleTrigger;
use crate::config::AppConfig;

/// Background timer that periodically asks the UI loop for a fetch cycle.
///
/// The timer never fetches by itself; the receiver decides whether the
/// request starts a cycle or is dropped because one is already running.
pub struct RefreshTimer {
    interval: Duration,
    trigger_tx: mpsc::UnboundedSender<CycleTrigger>,
}

impl RefreshTimer {
    pub fn new(interval: Duration, trigger_tx: mpsc::UnboundedSender<CycleTrigger>) -> Self {
        Self {
            interval,
            trigger_tx,
        }
    }

    /// Create a timer using `sync.refresh_interval_secs`
    pub fn from_config(config: &AppConfig, trigger_tx: mpsc::UnboundedSender<CycleTrigger>) -> Self {
        Self::new(
            Duration::from_secs(config.sync.refresh_interval_secs),
            trigger_tx,
        )
    }

    /// Tick until shutdown is signalled or the receiver goes away
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        // Skip if refresh is disabled (0)
        if self.interval.is_zero() {
            info!("Refresh timer disabled (refresh_interval_secs = 0)");
            let _ = shutdown.changed().await;
            return;
        }

        info!("Refresh timer started: every {}s", self.interval.as_secs());

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first tick (fires immediately); startup does its own load
        interval.tick().await;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Refresh timer received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    debug!("Refresh timer fired");
                    if self.trigger_tx.send(CycleTrigger::Timer).is_err() {
                        warn!("Refresh timer receiver dropped");
                        break;
                    }
                }
            }
        }

        info!("Refresh timer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_each_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(RefreshTimer::new(Duration::from_secs(300), tx).run(shutdown_rx));
        tokio::task::yield_now().await;

        // Nothing before the first interval elapses
        advance(Duration::from_secs(299)).await;
        assert!(rx.try_recv().is_err());

        advance(Duration::from_secs(1)).await;
        assert_eq!(rx.recv().await, Some(CycleTrigger::Timer));

        advance(Duration::from_secs(300)).await;
        assert_eq!(rx.recv().await, Some(CycleTrigger::Timer));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_timer_waits_for_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(RefreshTimer::new(Duration::ZERO, tx).run(shutdown_rx));

        advance(Duration::from_secs(3600)).await;
        assert!(rx.try_recv().is_err());

        shutdown_tx.send(true).unwrap();
        assert!(timeout(Duration::from_secs(1), handle).await.is_ok());
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(rx);

        let result = timeout(
            Duration::from_secs(1),
            RefreshTimer::new(Duration::from_millis(10), tx).run(shutdown_rx),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_from_config_uses_refresh_interval() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let timer = RefreshTimer::from_config(&AppConfig::default(), tx);
        assert_eq!(timer.interval, Duration::from_secs(300));
    }
}
