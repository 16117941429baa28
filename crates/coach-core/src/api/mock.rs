//! In-process mock API for testing
//!
//! Returns configurable canned responses and records every call. Individual
//! calls can be *gated*: the call suspends until the test releases the gate,
//! which makes completion order fully controllable.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::models::{
    Forecast, GoalRequest, GoalResult, InsightsSnapshot, NewTransaction, RecordedTransaction,
};

use super::CoachApi;

type Reply<T> = std::result::Result<T, String>;

/// Pending response for one gated call
pub struct Gate<T> {
    tx: oneshot::Sender<Reply<T>>,
}

impl<T> Gate<T> {
    /// Let the suspended call complete successfully
    pub fn succeed(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Let the suspended call fail with a 500 carrying `message`
    pub fn fail(self, message: &str) {
        let _ = self.tx.send(Err(message.to_string()));
    }
}

#[derive(Default)]
struct MockState {
    insights: Option<Reply<InsightsSnapshot>>,
    transaction: Option<Reply<()>>,
    goal_recommendation: Option<Reply<String>>,

    insights_gates: VecDeque<oneshot::Receiver<Reply<InsightsSnapshot>>>,
    transaction_gates: VecDeque<oneshot::Receiver<Reply<()>>>,
    goal_gates: VecDeque<oneshot::Receiver<Reply<GoalResult>>>,

    insights_calls: usize,
    transactions: Vec<NewTransaction>,
    goals: Vec<GoalRequest>,
}

/// Mock [`CoachApi`]
///
/// Defaults: insights fetch returns an empty snapshot, transactions are
/// accepted, goals get a recommendation derived from the amount.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

fn to_error(message: String) -> Error {
    Error::Status {
        status: 500,
        body: message,
    }
}

/// Gated call: wait for the test to release it. A dropped gate is a failure.
async fn await_gate<T>(rx: oneshot::Receiver<Reply<T>>) -> Result<T> {
    match rx.await {
        Ok(reply) => reply.map_err(to_error),
        Err(_) => Err(to_error("gate dropped".to_string())),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose insights fetch returns `snapshot`
    pub fn with_insights(snapshot: InsightsSnapshot) -> Self {
        let api = Self::new();
        api.set_insights(snapshot);
        api
    }

    pub fn set_insights(&self, snapshot: InsightsSnapshot) {
        self.state.lock().unwrap().insights = Some(Ok(snapshot));
    }

    pub fn fail_insights(&self, message: &str) {
        self.state.lock().unwrap().insights = Some(Err(message.to_string()));
    }

    pub fn fail_transactions(&self, message: &str) {
        self.state.lock().unwrap().transaction = Some(Err(message.to_string()));
    }

    pub fn accept_transactions(&self) {
        self.state.lock().unwrap().transaction = Some(Ok(()));
    }

    pub fn set_goal_recommendation(&self, recommendation: &str) {
        self.state.lock().unwrap().goal_recommendation = Some(Ok(recommendation.to_string()));
    }

    pub fn fail_goals(&self, message: &str) {
        self.state.lock().unwrap().goal_recommendation = Some(Err(message.to_string()));
    }

    /// Suspend the next not-yet-issued insights fetch until the gate is released
    pub fn gate_insights(&self) -> Gate<InsightsSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().insights_gates.push_back(rx);
        Gate { tx }
    }

    pub fn gate_transaction(&self) -> Gate<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().transaction_gates.push_back(rx);
        Gate { tx }
    }

    pub fn gate_goal(&self) -> Gate<GoalResult> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().goal_gates.push_back(rx);
        Gate { tx }
    }

    /// Number of insights fetches issued so far
    pub fn insights_calls(&self) -> usize {
        self.state.lock().unwrap().insights_calls
    }

    /// Transaction bodies received, in issue order
    pub fn transactions(&self) -> Vec<NewTransaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn transaction_calls(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn goal_calls(&self) -> usize {
        self.state.lock().unwrap().goals.len()
    }
}

/// Default recommendation: the monthly amount over a year, rounded
pub fn default_recommendation(goal_amount: f64) -> String {
    format!("Save ${:.0}/mo", goal_amount / 12.0)
}

#[async_trait]
impl CoachApi for MockApi {
    async fn fetch_insights(&self) -> Result<InsightsSnapshot> {
        let (gate, canned) = {
            let mut state = self.state.lock().unwrap();
            state.insights_calls += 1;
            (state.insights_gates.pop_front(), state.insights.clone())
        };
        if let Some(rx) = gate {
            return await_gate(rx).await;
        }
        canned.unwrap_or_else(|| Ok(InsightsSnapshot::default())).map_err(to_error)
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
        let (gate, canned) = {
            let mut state = self.state.lock().unwrap();
            state.transactions.push(transaction.clone());
            (state.transaction_gates.pop_front(), state.transaction.clone())
        };
        if let Some(rx) = gate {
            return await_gate(rx).await;
        }
        canned.unwrap_or(Ok(())).map_err(to_error)
    }

    async fn set_goal(&self, goal: &GoalRequest) -> Result<GoalResult> {
        let (gate, canned) = {
            let mut state = self.state.lock().unwrap();
            state.goals.push(goal.clone());
            (state.goal_gates.pop_front(), state.goal_recommendation.clone())
        };
        if let Some(rx) = gate {
            return await_gate(rx).await;
        }
        let recommendation = canned
            .unwrap_or_else(|| Ok(default_recommendation(goal.goal_amount)))
            .map_err(to_error)?;
        Ok(GoalResult {
            goal: goal.clone(),
            recommendation,
            forecast: None,
        })
    }

    async fn list_transactions(&self) -> Result<Vec<RecordedTransaction>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| RecordedTransaction {
                id: Some(i as i64 + 1),
                date: None,
                merchant: Some(tx.description.clone()),
                category: tx.category.clone(),
                amount: tx.amount,
            })
            .collect())
    }

    async fn forecast(&self, goal_amount: f64, months: u32) -> Result<Option<Forecast>> {
        Ok(Some(Forecast {
            projected_months_needed: i64::from(months),
            monthly_surplus_estimate: goal_amount / f64::from(months.max(1)),
        }))
    }
}
