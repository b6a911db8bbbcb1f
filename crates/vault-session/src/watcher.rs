//! Transaction confirmation watcher
//!
//! Polls the chain provider for a submitted transaction until it reaches the
//! required confirmation count, the timeout elapses, or the watch is cancelled.

use std::sync::Arc;
use std::time::Duration;

use cardano_tx::ChainProvider;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use vault_core::{TxHash, WatchConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub min_confirmations: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self::from(&WatchConfig::default())
    }
}

impl From<&WatchConfig> for WatchSettings {
    fn from(config: &WatchConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            timeout: Duration::from_secs(config.timeout_secs),
            min_confirmations: config.min_confirmations.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WatchOutcome {
    Confirmed { confirmations: u64 },
    TimedOut,
    Cancelled,
}

/// Cancels the watch it was taken from. Cancelling before the task observes
/// it still takes effect.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<Notify>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.notify_one();
    }
}

/// A running watch
pub struct Subscription {
    tx_hash: TxHash,
    cancel: CancelHandle,
    handle: JoinHandle<WatchOutcome>,
}

impl Subscription {
    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the watch to resolve
    pub async fn outcome(self) -> WatchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(tx_hash = %self.tx_hash, "Watch task failed: {}", e);
                WatchOutcome::Cancelled
            }
        }
    }
}

#[derive(Clone)]
pub struct ConfirmationWatcher {
    chain: Arc<dyn ChainProvider>,
    settings: WatchSettings,
}

impl ConfirmationWatcher {
    pub fn new(chain: Arc<dyn ChainProvider>, settings: WatchSettings) -> Self {
        Self { chain, settings }
    }

    pub fn settings(&self) -> WatchSettings {
        self.settings
    }

    /// Spawn a polling task for `tx_hash`. The first poll happens one interval
    /// after the call.
    pub fn watch(&self, tx_hash: TxHash) -> Subscription {
        let notify = Arc::new(Notify::new());
        let cancelled = notify.clone();
        let chain = self.chain.clone();
        let settings = self.settings;
        let hash = tx_hash.clone();

        let handle = tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancelled.notified() => WatchOutcome::Cancelled,
                polled = tokio::time::timeout(settings.timeout, poll_until_confirmed(chain.as_ref(), &hash, settings)) => {
                    polled.unwrap_or(WatchOutcome::TimedOut)
                }
            };
            tracing::debug!(tx_hash = %hash, ?outcome, "Watch resolved");
            outcome
        });

        Subscription {
            tx_hash,
            cancel: CancelHandle(notify),
            handle,
        }
    }
}

async fn poll_until_confirmed(
    chain: &dyn ChainProvider,
    tx_hash: &TxHash,
    settings: WatchSettings,
) -> WatchOutcome {
    let mut ticker =
        tokio::time::interval_at(Instant::now() + settings.poll_interval, settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = 0u64;

    loop {
        ticker.tick().await;
        polls += 1;
        match chain.tx_confirmations(tx_hash).await {
            Ok(Some(confirmations)) if confirmations >= settings.min_confirmations => {
                return WatchOutcome::Confirmed { confirmations };
            }
            Ok(confirmations) => {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    polls,
                    confirmations = confirmations.unwrap_or(0),
                    "Transaction not yet confirmed"
                );
            }
            Err(e) => {
                tracing::warn!(tx_hash = %tx_hash, polls, "Confirmation poll failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardano_tx::Utxo;
    use std::sync::atomic::{AtomicU64, Ordering};
    use vault_core::{Address, ProviderError};

    /// Reports `confirmed_after` polls of pending, then one confirmation.
    /// Every third poll fails.
    struct CountingChain {
        polls: AtomicU64,
        confirmed_after: Option<u64>,
        flaky: bool,
    }

    impl CountingChain {
        fn new(confirmed_after: Option<u64>, flaky: bool) -> Arc<Self> {
            Arc::new(Self {
                polls: AtomicU64::new(0),
                confirmed_after,
                flaky,
            })
        }
    }

    #[async_trait]
    impl ChainProvider for CountingChain {
        async fn fetch_address_utxos(
            &self,
            _address: &Address,
            _asset: Option<&str>,
        ) -> Result<Vec<Utxo>, ProviderError> {
            Ok(vec![])
        }

        async fn tx_confirmations(&self, _tx_hash: &TxHash) -> Result<Option<u64>, ProviderError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.flaky && n % 3 == 0 {
                return Err(ProviderError::RateLimited);
            }
            match self.confirmed_after {
                Some(after) if n > after => Ok(Some(1)),
                _ => Ok(None),
            }
        }
    }

    fn tx_hash() -> TxHash {
        TxHash::from_array([1u8; 32])
    }

    #[test]
    fn test_settings_from_config() {
        let settings = WatchSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.timeout, Duration::from_secs(500));
        assert_eq!(settings.min_confirmations, 1);

        let settings = WatchSettings::from(&WatchConfig {
            poll_interval_secs: 0,
            timeout_secs: 10,
            min_confirmations: 0,
        });
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.min_confirmations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_polls() {
        let chain = CountingChain::new(Some(2), false);
        let watcher = ConfirmationWatcher::new(chain.clone(), WatchSettings::default());
        let started = Instant::now();

        let outcome = watcher.watch(tx_hash()).outcome().await;

        assert_eq!(outcome, WatchOutcome::Confirmed { confirmations: 1 });
        assert_eq!(chain.polls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_errors_are_retried() {
        let chain = CountingChain::new(Some(4), true);
        let watcher = ConfirmationWatcher::new(chain.clone(), WatchSettings::default());

        let outcome = watcher.watch(tx_hash()).outcome().await;

        // Poll 3 fails and the watcher keeps going
        assert_eq!(outcome, WatchOutcome::Confirmed { confirmations: 1 });
        assert_eq!(chain.polls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let chain = CountingChain::new(None, false);
        let settings = WatchSettings {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(22),
            min_confirmations: 1,
        };
        let watcher = ConfirmationWatcher::new(chain.clone(), settings);
        let started = Instant::now();

        let outcome = watcher.watch(tx_hash()).outcome().await;

        assert_eq!(outcome, WatchOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_secs(22));
        assert_eq!(chain.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let chain = CountingChain::new(None, false);
        let watcher = ConfirmationWatcher::new(chain.clone(), WatchSettings::default());

        let subscription = watcher.watch(tx_hash());
        assert_eq!(subscription.tx_hash(), &tx_hash());
        let handle = subscription.cancel_handle();
        tokio::time::sleep(Duration::from_secs(12)).await;
        handle.cancel();

        assert_eq!(subscription.outcome().await, WatchOutcome::Cancelled);
        assert_eq!(chain.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_poll() {
        let chain = CountingChain::new(Some(0), false);
        let watcher = ConfirmationWatcher::new(chain.clone(), WatchSettings::default());

        let subscription = watcher.watch(tx_hash());
        subscription.cancel();

        assert_eq!(subscription.outcome().await, WatchOutcome::Cancelled);
        assert_eq!(chain.polls.load(Ordering::SeqCst), 0);
    }
}
