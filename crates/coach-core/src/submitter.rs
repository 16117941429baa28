//! Transaction submission flow
//!
//! `Idle → Submitting → Idle[cleared]` on success,
//! `Idle → Submitting → Idle[error, draft preserved]` on failure.
//!
//! The submitter owns the form draft. Invalid drafts never reach the network,
//! and the `submitting` flag rejects a second submission while one is in
//! flight. A successful submission resets the draft and kicks off an insights
//! refresh without waiting for it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::CoachApi;
use crate::error::{Error, Result};
use crate::models::TransactionDraft;
use crate::store::{InsightsStore, RefreshOutcome};

#[derive(Debug, Default)]
struct FormState {
    draft: TransactionDraft,
    submitting: bool,
    error: Option<String>,
}

/// Clears `submitting` even if the submission future is dropped
struct Submitting {
    state: Arc<Mutex<FormState>>,
}

impl Drop for Submitting {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.submitting = false;
    }
}

/// Owner of the transaction form
#[derive(Clone)]
pub struct TransactionSubmitter {
    api: Arc<dyn CoachApi>,
    store: InsightsStore,
    state: Arc<Mutex<FormState>>,
}

impl TransactionSubmitter {
    pub fn new(api: Arc<dyn CoachApi>, store: InsightsStore) -> Self {
        Self {
            api,
            store,
            state: Arc::new(Mutex::new(FormState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_amount(&self, amount: &str) {
        self.lock().draft.amount = amount.to_string();
    }

    pub fn set_category(&self, category: &str) {
        self.lock().draft.category = category.to_string();
    }

    pub fn set_description(&self, description: &str) {
        self.lock().draft.description = description.to_string();
    }

    /// Replace every field at once
    pub fn set_draft(&self, draft: TransactionDraft) {
        self.lock().draft = draft;
    }

    pub fn draft(&self) -> TransactionDraft {
        self.lock().draft.clone()
    }

    pub fn submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Message of the last failed submission, cleared on the next attempt
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Submit the current draft
    ///
    /// On success returns the handle of the insights refresh it triggered;
    /// callers may await it or drop it. Validation and in-progress rejections
    /// leave all state untouched and issue no request.
    pub async fn submit(&self) -> Result<JoinHandle<RefreshOutcome>> {
        let (request, guard) = {
            let mut state = self.lock();
            if state.submitting {
                return Err(Error::InProgress("Transaction submission"));
            }
            let request = state.draft.to_request()?;
            state.submitting = true;
            state.error = None;
            let guard = Submitting {
                state: self.state.clone(),
            };
            (request, guard)
        };

        let result = self.api.create_transaction(&request).await;

        drop(guard);
        {
            let mut state = self.lock();
            if let Err(ref e) = result {
                warn!("Transaction submission failed: {}", e);
                state.error = Some(e.to_string());
            } else {
                state.draft = TransactionDraft::default();
            }
        }
        result?;

        info!(
            "Transaction recorded: {:.2} in {}",
            request.amount, request.category
        );
        Ok(self.store.spawn_refresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::config::RefreshOrdering;
    use crate::test_utils::{sample_insights, wait_until};

    fn setup(api: &MockApi) -> (InsightsStore, TransactionSubmitter) {
        let api: Arc<dyn CoachApi> = Arc::new(api.clone());
        let store = InsightsStore::new(api.clone(), RefreshOrdering::LastProcessed);
        let submitter = TransactionSubmitter::new(api, store.clone());
        (store, submitter)
    }

    #[tokio::test]
    async fn test_draft_fields_edit_independently() {
        let (_, submitter) = setup(&MockApi::new());
        submitter.set_amount("12");
        submitter.set_category("Groceries");
        submitter.set_description("Market");
        submitter.set_amount("12.5");

        assert_eq!(
            submitter.draft(),
            TransactionDraft::new("12.5", "Groceries", "Market")
        );
    }

    #[tokio::test]
    async fn test_invalid_drafts_never_reach_network() {
        let api = MockApi::new();
        let (_, submitter) = setup(&api);

        for draft in [
            TransactionDraft::new("", "Groceries", "x"),
            TransactionDraft::new("10", "", "x"),
            TransactionDraft::new("abc", "Groceries", ""),
            TransactionDraft::default(),
        ] {
            submitter.set_draft(draft.clone());
            let result = submitter.submit().await;
            assert!(matches!(result, Err(Error::Validation(_))));
            assert_eq!(submitter.draft(), draft);
            assert!(!submitter.submitting());
        }

        assert_eq!(api.transaction_calls(), 0);
        assert_eq!(api.insights_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_clears_draft_and_refreshes_once() {
        let api = MockApi::with_insights(sample_insights());
        let (store, submitter) = setup(&api);
        submitter.set_draft(TransactionDraft::new("4.75", "Food & Drink", "Latte"));

        let refresh = submitter.submit().await.unwrap();

        assert_eq!(
            submitter.draft(),
            TransactionDraft {
                amount: String::new(),
                category: String::new(),
                description: String::new(),
            }
        );
        assert!(!submitter.submitting());
        assert!(submitter.error().is_none());

        assert_eq!(refresh.await.unwrap(), RefreshOutcome::Applied);
        assert_eq!(api.insights_calls(), 1);
        assert_eq!(*store.snapshot().unwrap(), sample_insights());

        let sent = api.transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].amount, 4.75);
        assert_eq!(sent[0].category, "Food & Drink");
        assert_eq!(sent[0].description, "Latte");
    }

    #[tokio::test]
    async fn test_failure_preserves_draft() {
        let api = MockApi::new();
        api.fail_transactions("disk full");
        let (_, submitter) = setup(&api);
        let draft = TransactionDraft::new(" 19.99", "Shopping ", "Socks & shoes");
        submitter.set_draft(draft.clone());

        let result = submitter.submit().await;

        assert!(matches!(result, Err(Error::Status { .. })));
        assert_eq!(submitter.draft(), draft);
        assert!(!submitter.submitting());
        assert!(submitter.error().unwrap().contains("disk full"));
        assert_eq!(api.insights_calls(), 0);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let api = MockApi::new();
        api.fail_transactions("timeout");
        let (_, submitter) = setup(&api);
        submitter.set_draft(TransactionDraft::new("30", "Transport", ""));
        assert!(submitter.submit().await.is_err());

        api.accept_transactions();
        let refresh = submitter.submit().await.unwrap();
        refresh.await.unwrap();

        assert!(submitter.draft().is_empty());
        assert!(submitter.error().is_none());
        assert_eq!(api.transaction_calls(), 2);
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let api = MockApi::new();
        let (_, submitter) = setup(&api);
        submitter.set_draft(TransactionDraft::new("8", "Dining", ""));
        let gate = api.gate_transaction();

        let pending = {
            let submitter = submitter.clone();
            tokio::spawn(async move { submitter.submit().await.map(|_| ()) })
        };
        wait_until(|| api.transaction_calls() == 1).await;
        assert!(submitter.submitting());

        let second = submitter.submit().await;
        assert!(matches!(second, Err(Error::InProgress(_))));
        assert_eq!(api.transaction_calls(), 1);

        gate.succeed(());
        pending.await.unwrap().unwrap();
        assert!(!submitter.submitting());
    }

    #[tokio::test]
    async fn test_aborted_submission_unlocks_form() {
        let api = MockApi::new();
        let (_, submitter) = setup(&api);
        let draft = TransactionDraft::new("8", "Dining", "Tacos");
        submitter.set_draft(draft.clone());
        let _gate = api.gate_transaction();

        let pending = {
            let submitter = submitter.clone();
            tokio::spawn(async move { submitter.submit().await.map(|_| ()) })
        };
        wait_until(|| api.transaction_calls() == 1).await;
        assert!(submitter.submitting());

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!submitter.submitting());
        assert_eq!(submitter.draft(), draft);

        submitter.submit().await.unwrap().await.unwrap();
        assert_eq!(api.transaction_calls(), 2);
        assert!(submitter.draft().is_empty());
    }

    #[tokio::test]
    async fn test_success_sends_fields_verbatim() {
        let api = MockApi::new();
        let (_, submitter) = setup(&api);
        submitter.set_draft(TransactionDraft::new("19.99", "Shopping ", "  Socks & shoes"));

        submitter.submit().await.unwrap().await.unwrap();

        let sent = api.transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].category, "Shopping ");
        assert_eq!(sent[0].description, "  Socks & shoes");
        assert!(submitter.draft().is_empty());
    }

    #[tokio::test]
    async fn test_amount_parsed_before_transmission() {
        let api = MockApi::new();
        let (_, submitter) = setup(&api);
        submitter.set_draft(TransactionDraft::new("1e2", "Utilities", ""));

        submitter.submit().await.unwrap().await.unwrap();

        assert_eq!(api.transactions()[0].amount, 100.0);
        assert_eq!(api.transactions()[0].description, "");
    }
}
