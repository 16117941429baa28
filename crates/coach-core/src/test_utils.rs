//! Test utilities for coach-core
//!
//! Provides a mock insights API server speaking the real wire format over
//! HTTP, sample payloads, and a helper for waiting on spawned tasks.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::api::default_recommendation;
use crate::models::{
    Anomaly, Forecast, ForecastResponse, GoalRequest, GoalResult, InsightsResponse,
    InsightsSnapshot, NewTransaction, RecordedTransaction, Subscription, TransactionsResponse,
    TrendDirection, TrendInsight,
};

/// Monthly surplus the mock server assumes for forecasts
const MOCK_MONTHLY_SURPLUS: f64 = 250.0;

/// A realistic insights payload
pub fn sample_insights() -> InsightsSnapshot {
    InsightsSnapshot {
        category_spend_last_30d: BTreeMap::from([
            ("Food & Drink".to_string(), 143.2),
            ("Groceries".to_string(), 310.5),
            ("Shopping".to_string(), 80.0),
        ]),
        subscriptions: vec![
            Subscription {
                merchant: "Netflix".to_string(),
                avg_amount: 15.49,
                occurrences: 3,
            },
            Subscription {
                merchant: "Spotify".to_string(),
                avg_amount: 10.99,
                occurrences: 4,
            },
        ],
        anomalies: vec![Anomaly {
            category: "Travel".to_string(),
            latest_total: 912.0,
            months: Some(3),
        }],
        tips: vec![
            "You've spent $143 on Food & Drink in the last 30 days. Brewing at home could save money."
                .to_string(),
        ],
        trend_insights: vec![TrendInsight {
            category: "Shopping".to_string(),
            current_total: 80.0,
            previous_total: 40.0,
            percent_change: 100.0,
            direction: TrendDirection::Increase,
            advice: "Delay non-essential shopping carts to keep cash flow stable.".to_string(),
            sentence: "Spending on Shopping increased 100.0% compared to the prior 30 days."
                .to_string(),
        }],
    }
}

/// Yield to the runtime until `condition` holds
///
/// Panics if it never does, so a broken test fails instead of hanging.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[derive(Default)]
struct ServerState {
    insights: Mutex<InsightsSnapshot>,
    transactions: Mutex<Vec<NewTransaction>>,
    goals: Mutex<Vec<GoalRequest>>,
    failing: AtomicBool,
    forecast_empty: AtomicBool,
    insights_requests: AtomicUsize,
}

type Shared = Arc<ServerState>;
type HandlerResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

fn unavailable() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "insights service unavailable".to_string(),
    )
}

/// Mock insights API server for tests and local development
pub struct MockCoachServer {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCoachServer {
    /// Start the mock server on an available port, serving [`sample_insights`]
    pub async fn start() -> Self {
        let state: Shared = Arc::new(ServerState::default());
        *state.insights.lock().unwrap() = sample_insights();

        let app = Router::new()
            .route("/api/insights", get(handle_insights))
            .route(
                "/api/transactions",
                get(handle_list_transactions).post(handle_create_transaction),
            )
            .route("/api/goal", post(handle_goal))
            .route("/api/forecast", get(handle_forecast))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Payload served until replaced with [`MockCoachServer::set_insights`]
    pub fn sample_insights() -> InsightsSnapshot {
        sample_insights()
    }

    pub fn set_insights(&self, snapshot: InsightsSnapshot) {
        *self.state.insights.lock().unwrap() = snapshot;
    }

    /// Make every endpoint answer 500 until switched back
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Answer forecasts the way a server without transactions does
    pub fn set_forecast_empty(&self, empty: bool) {
        self.state.forecast_empty.store(empty, Ordering::SeqCst);
    }

    pub fn insights_requests(&self) -> usize {
        self.state.insights_requests.load(Ordering::SeqCst)
    }

    pub fn received_transactions(&self) -> Vec<NewTransaction> {
        self.state.transactions.lock().unwrap().clone()
    }

    pub fn received_goals(&self) -> Vec<GoalRequest> {
        self.state.goals.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCoachServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_insights(State(state): State<Shared>) -> HandlerResult<InsightsResponse> {
    state.insights_requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    let insights = state.insights.lock().unwrap().clone();
    Ok(Json(InsightsResponse { insights }))
}

/// Mirrors the server's stored row: description becomes the merchant
fn recorded(id: usize, tx: &NewTransaction) -> RecordedTransaction {
    RecordedTransaction {
        id: Some(1000 + id as i64),
        date: Some("2025-01-15".to_string()),
        merchant: Some(if tx.description.is_empty() {
            "Manual Entry".to_string()
        } else {
            tx.description.clone()
        }),
        category: tx.category.clone(),
        amount: tx.amount,
    }
}

#[derive(Debug, Serialize)]
struct TransactionCreated {
    message: String,
    transaction: RecordedTransaction,
}

async fn handle_create_transaction(
    State(state): State<Shared>,
    Json(tx): Json<NewTransaction>,
) -> HandlerResult<TransactionCreated> {
    if state.failing.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    let mut transactions = state.transactions.lock().unwrap();
    let transaction = recorded(transactions.len(), &tx);
    transactions.push(tx);
    Ok(Json(TransactionCreated {
        message: "Transaction added successfully".to_string(),
        transaction,
    }))
}

async fn handle_list_transactions(State(state): State<Shared>) -> HandlerResult<TransactionsResponse> {
    if state.failing.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    let transactions = state
        .transactions
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, tx)| recorded(i, tx))
        .collect();
    Ok(Json(TransactionsResponse { transactions }))
}

fn mock_forecast(goal_amount: f64, months: u32) -> Forecast {
    let needed = (goal_amount / MOCK_MONTHLY_SURPLUS).ceil() as i64;
    Forecast {
        projected_months_needed: needed.min(i64::from(months)),
        monthly_surplus_estimate: MOCK_MONTHLY_SURPLUS,
    }
}

async fn handle_goal(
    State(state): State<Shared>,
    Json(goal): Json<GoalRequest>,
) -> HandlerResult<GoalResult> {
    if state.failing.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    state.goals.lock().unwrap().push(goal.clone());
    Ok(Json(GoalResult {
        recommendation: default_recommendation(goal.goal_amount),
        forecast: Some(mock_forecast(goal.goal_amount, 12)),
        goal,
    }))
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    goal_amount: Option<f64>,
    months: Option<u32>,
}

async fn handle_forecast(
    State(state): State<Shared>,
    Query(params): Query<ForecastParams>,
) -> HandlerResult<ForecastResponse> {
    if state.failing.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    if state.forecast_empty.load(Ordering::SeqCst) {
        return Ok(Json(ForecastResponse::NoData {
            forecast: BTreeMap::new(),
        }));
    }
    Ok(Json(ForecastResponse::Projection(mock_forecast(
        params.goal_amount.unwrap_or(3000.0),
        params.months.unwrap_or(10),
    ))))
}
