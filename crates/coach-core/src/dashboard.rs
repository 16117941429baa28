//! Dashboard: one page, three independent flows
//!
//! The dashboard owns an [`InsightsStore`], a [`TransactionSubmitter`] and a
//! [`GoalPlanner`] sharing one API client. It never reaches into their state;
//! [`Dashboard::view`] reads each flow through its accessors and hands the
//! result to [`reduce`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{CoachApi, HttpApi};
use crate::config::{ClientConfig, RefreshOrdering};
use crate::error::Result;
use crate::goal::GoalPlanner;
use crate::render::render;
use crate::store::{InsightsStore, RefreshOutcome};
use crate::submitter::TransactionSubmitter;
use crate::view::{reduce, ViewInputs, ViewState};

pub struct Dashboard {
    api: Arc<dyn CoachApi>,
    insights: InsightsStore,
    transactions: TransactionSubmitter,
    goals: GoalPlanner,
}

impl Dashboard {
    /// Dashboard talking HTTP to the configured origin
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        debug!(
            "Dashboard targeting {} (refresh ordering: {})",
            config.base_url, config.refresh_ordering
        );
        let api = Arc::new(HttpApi::new(config)?);
        Ok(Self::with_api(api, config.refresh_ordering))
    }

    /// Dashboard over any [`CoachApi`] implementation
    pub fn with_api(api: Arc<dyn CoachApi>, ordering: RefreshOrdering) -> Self {
        let insights = InsightsStore::new(api.clone(), ordering);
        let transactions = TransactionSubmitter::new(api.clone(), insights.clone());
        let goals = GoalPlanner::new(api.clone());
        Self {
            api,
            insights,
            transactions,
            goals,
        }
    }

    /// Issue the initial insights fetch
    pub fn mount(&self) -> JoinHandle<RefreshOutcome> {
        self.insights.spawn_refresh()
    }

    pub fn insights(&self) -> &InsightsStore {
        &self.insights
    }

    pub fn transactions(&self) -> &TransactionSubmitter {
        &self.transactions
    }

    pub fn goals(&self) -> &GoalPlanner {
        &self.goals
    }

    /// Underlying client, for read-only calls outside the page flows
    pub fn api(&self) -> &Arc<dyn CoachApi> {
        &self.api
    }

    /// Current state of every flow, as the reducer sees it
    pub fn inputs(&self) -> ViewInputs {
        ViewInputs {
            insights: self.insights.snapshot(),
            error: self.insights.error(),
            loading: self.insights.loading(),
            submitting: self.transactions.submitting(),
            goal: self.goals.result(),
        }
    }

    pub fn view(&self) -> ViewState {
        reduce(&self.inputs())
    }

    /// Rendered text of the current view
    pub fn render(&self) -> String {
        render(&self.view())
    }
}
