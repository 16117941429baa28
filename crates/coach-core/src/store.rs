//! Insights store
//!
//! Holds the last successfully fetched [`InsightsSnapshot`] and the error of
//! the most recent failed fetch. A refresh in flight never clears the current
//! snapshot, so once data has been shown it stays on screen until a newer
//! snapshot replaces it.
//!
//! Concurrent refreshes are allowed. How they resolve depends on
//! [`RefreshOrdering`]:
//! - `LastProcessed`: the response handled last wins, whatever its issue order
//! - `LatestIssued`: each refresh carries a sequence id and responses older
//!   than the newest applied one are discarded

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::CoachApi;
use crate::config::RefreshOrdering;
use crate::models::InsightsSnapshot;

/// What happened to one refresh's response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response became the current snapshot
    Applied,
    /// The fetch failed; the previous snapshot (if any) is kept
    Failed(String),
    /// A newer response was already applied, so this one was dropped
    Stale,
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: Option<Arc<InsightsSnapshot>>,
    error: Option<String>,
    in_flight: usize,
    last_issued: u64,
    last_applied: Option<u64>,
    generation: u64,
}

/// Owner of the current insights snapshot
///
/// Cloning yields another handle onto the same store.
#[derive(Clone)]
pub struct InsightsStore {
    api: Arc<dyn CoachApi>,
    ordering: RefreshOrdering,
    state: Arc<Mutex<StoreState>>,
}

/// Decrements the in-flight count even if the refresh future is dropped
struct InFlight {
    state: Arc<Mutex<StoreState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl InsightsStore {
    pub fn new(api: Arc<dyn CoachApi>, ordering: RefreshOrdering) -> Self {
        Self {
            api,
            ordering,
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch insights and fold the response into the store
    pub async fn refresh(&self) -> RefreshOutcome {
        let (seq, guard) = {
            let mut state = self.lock();
            state.in_flight += 1;
            state.last_issued += 1;
            let guard = InFlight {
                state: self.state.clone(),
            };
            (state.last_issued, guard)
        };
        debug!("Refreshing insights (request {})", seq);

        let result = self.api.fetch_insights().await;

        drop(guard);
        let mut state = self.lock();

        if self.ordering == RefreshOrdering::LatestIssued {
            if let Some(applied) = state.last_applied {
                if seq < applied {
                    debug!(
                        "Discarding insights response {} (already applied {})",
                        seq, applied
                    );
                    return RefreshOutcome::Stale;
                }
            }
        }
        state.last_applied = Some(seq);

        match result {
            Ok(snapshot) => {
                state.snapshot = Some(Arc::new(snapshot));
                state.error = None;
                state.generation += 1;
                info!(
                    "Insights updated (request {}, generation {})",
                    seq, state.generation
                );
                RefreshOutcome::Applied
            }
            Err(e) => {
                let message = e.to_string();
                if state.snapshot.is_some() {
                    warn!("Insights refresh failed, keeping previous data: {}", message);
                } else {
                    warn!("Insights fetch failed: {}", message);
                }
                state.error = Some(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Start a refresh on the runtime without waiting for it
    pub fn spawn_refresh(&self) -> JoinHandle<RefreshOutcome> {
        let store = self.clone();
        tokio::spawn(async move { store.refresh().await })
    }

    /// Current snapshot, if any fetch has ever succeeded
    pub fn snapshot(&self) -> Option<Arc<InsightsSnapshot>> {
        self.lock().snapshot.clone()
    }

    /// Error of the latest applied failure, cleared by the next success
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// True while at least one refresh is outstanding
    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Number of snapshots applied so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::test_utils::{sample_insights, wait_until};
    use std::collections::BTreeMap;

    fn snapshot_with(category: &str, amount: f64) -> InsightsSnapshot {
        InsightsSnapshot {
            category_spend_last_30d: BTreeMap::from([(category.to_string(), amount)]),
            ..Default::default()
        }
    }

    fn store_for(api: &MockApi, ordering: RefreshOrdering) -> InsightsStore {
        InsightsStore::new(Arc::new(api.clone()), ordering)
    }

    #[tokio::test]
    async fn test_initial_state_is_empty() {
        let api = MockApi::new();
        let store = store_for(&api, RefreshOrdering::LastProcessed);

        assert!(store.snapshot().is_none());
        assert!(store.error().is_none());
        assert!(!store.loading());
        assert_eq!(api.insights_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_applies_snapshot() {
        let api = MockApi::with_insights(sample_insights());
        let store = store_for(&api, RefreshOrdering::LastProcessed);

        assert_eq!(store.refresh().await, RefreshOutcome::Applied);
        assert_eq!(*store.snapshot().unwrap(), sample_insights());
        assert_eq!(store.generation(), 1);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_first_fetch_failure_has_no_data() {
        let api = MockApi::new();
        api.fail_insights("connection refused");
        let store = store_for(&api, RefreshOrdering::LastProcessed);

        let outcome = store.refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Failed(ref m) if m.contains("connection refused")));
        assert!(store.snapshot().is_none());
        assert!(store.error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_failure_after_success_keeps_snapshot() {
        let api = MockApi::with_insights(sample_insights());
        let store = store_for(&api, RefreshOrdering::LastProcessed);
        store.refresh().await;

        api.fail_insights("bad gateway");
        store.refresh().await;

        assert_eq!(*store.snapshot().unwrap(), sample_insights());
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let api = MockApi::new();
        api.fail_insights("timeout");
        let store = store_for(&api, RefreshOrdering::LastProcessed);
        store.refresh().await;
        assert!(store.error().is_some());

        api.set_insights(sample_insights());
        store.refresh().await;
        assert!(store.error().is_none());
        assert!(store.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_stale_while_revalidate() {
        let api = MockApi::with_insights(snapshot_with("Old", 1.0));
        let store = store_for(&api, RefreshOrdering::LastProcessed);
        store.refresh().await;

        let gate = api.gate_insights();
        let pending = store.spawn_refresh();
        wait_until(|| api.insights_calls() == 2).await;

        assert!(store.loading());
        assert_eq!(*store.snapshot().unwrap(), snapshot_with("Old", 1.0));

        gate.succeed(snapshot_with("New", 2.0));
        assert_eq!(pending.await.unwrap(), RefreshOutcome::Applied);
        assert!(!store.loading());
        assert_eq!(*store.snapshot().unwrap(), snapshot_with("New", 2.0));
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_idempotent() {
        let api = MockApi::with_insights(sample_insights());
        let store = store_for(&api, RefreshOrdering::LastProcessed);

        store.refresh().await;
        let first = store.snapshot().unwrap();
        store.refresh().await;
        let second = store.snapshot().unwrap();

        assert_eq!(*first, *second);
        assert_eq!(second.subscriptions.len(), sample_insights().subscriptions.len());
        assert_eq!(store.generation(), 2);
    }

    /// Issue two refreshes, then complete them newest-first
    async fn run_out_of_order(ordering: RefreshOrdering) -> (InsightsStore, RefreshOutcome) {
        let api = MockApi::new();
        let store = store_for(&api, ordering);
        let first_gate = api.gate_insights();
        let second_gate = api.gate_insights();

        let first = store.spawn_refresh();
        wait_until(|| api.insights_calls() == 1).await;
        let second = store.spawn_refresh();
        wait_until(|| api.insights_calls() == 2).await;

        second_gate.succeed(snapshot_with("Second", 2.0));
        assert_eq!(second.await.unwrap(), RefreshOutcome::Applied);
        first_gate.succeed(snapshot_with("First", 1.0));
        let first_outcome = first.await.unwrap();

        (store, first_outcome)
    }

    #[tokio::test]
    async fn test_last_processed_response_wins() {
        let (store, first_outcome) = run_out_of_order(RefreshOrdering::LastProcessed).await;

        assert_eq!(first_outcome, RefreshOutcome::Applied);
        assert_eq!(*store.snapshot().unwrap(), snapshot_with("First", 1.0));
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn test_latest_issued_discards_stale_response() {
        let (store, first_outcome) = run_out_of_order(RefreshOrdering::LatestIssued).await;

        assert_eq!(first_outcome, RefreshOutcome::Stale);
        assert_eq!(*store.snapshot().unwrap(), snapshot_with("Second", 2.0));
        assert_eq!(store.generation(), 1);
    }

    #[tokio::test]
    async fn test_latest_issued_ignores_stale_failure() {
        let api = MockApi::new();
        let store = store_for(&api, RefreshOrdering::LatestIssued);
        let first_gate = api.gate_insights();
        let second_gate = api.gate_insights();

        let first = store.spawn_refresh();
        wait_until(|| api.insights_calls() == 1).await;
        let second = store.spawn_refresh();
        wait_until(|| api.insights_calls() == 2).await;

        second_gate.succeed(sample_insights());
        second.await.unwrap();
        first_gate.fail("late failure");

        assert_eq!(first.await.unwrap(), RefreshOutcome::Stale);
        assert!(store.error().is_none());
    }
}
