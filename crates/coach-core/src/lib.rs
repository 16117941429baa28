//! Coach Core Library
//!
//! Client-side state for the Smart Financial Coach dashboard:
//! - Wire models for the insights API
//! - HTTP client behind the `CoachApi` trait
//! - Insights store with stale-while-revalidate refreshes
//! - Transaction submission and savings goal flows
//! - Pure view-state reducer and text renderer
//! - Client configuration (embedded defaults, file override, environment)

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod goal;
pub mod models;
pub mod render;
pub mod store;
pub mod submitter;
pub mod view;

/// Test utilities including mock insights API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{CoachApi, HttpApi};
pub use config::{ClientConfig, RefreshOrdering};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use goal::GoalPlanner;
pub use models::{
    Anomaly, Forecast, ForecastResponse, GoalRequest, GoalResult, InsightsSnapshot,
    NewTransaction, RecordedTransaction, Subscription, TransactionDraft, TrendDirection, TrendInsight,
};
pub use store::{InsightsStore, RefreshOutcome};
pub use submitter::TransactionSubmitter;
pub use view::{reduce, ViewInputs, ViewState};
