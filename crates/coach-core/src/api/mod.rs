//! Insights API abstraction
//!
//! - `CoachApi` trait: the network calls the client flows suspend on
//! - `HttpApi`: reqwest implementation against the insights service
//! - `MockApi` (test-utils): in-process implementation with gated responses
//!
//! Only `fetch_insights`, `create_transaction` and `set_goal` take part in the
//! dashboard flows. The two read-only extras back CLI listing commands.

mod http;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

pub use http::HttpApi;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{default_recommendation, Gate, MockApi};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Forecast, GoalRequest, GoalResult, InsightsSnapshot, NewTransaction, RecordedTransaction,
};

/// Insights service operations
///
/// Implementations must be Send + Sync so flows can hand an `Arc<dyn CoachApi>`
/// to spawned refresh tasks.
#[async_trait]
pub trait CoachApi: Send + Sync {
    /// `GET /api/insights`
    async fn fetch_insights(&self) -> Result<InsightsSnapshot>;

    /// `POST /api/transactions`; the response body only matters as success
    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()>;

    /// `POST /api/goal`
    async fn set_goal(&self, goal: &GoalRequest) -> Result<GoalResult>;

    /// `GET /api/transactions`
    async fn list_transactions(&self) -> Result<Vec<RecordedTransaction>>;

    /// `GET /api/forecast`; `None` when the server has no data to project from
    async fn forecast(&self, goal_amount: f64, months: u32) -> Result<Option<Forecast>>;
}
