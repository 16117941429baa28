//! Savings goal flow
//!
//! `Unset → Submitting → Set` on success; on failure the previous result
//! (if any) stays put and the error is only logged. Goal failures never
//! affect the insights display.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::CoachApi;
use crate::error::{Error, Result};
use crate::models::{GoalRequest, GoalResult};

#[derive(Debug, Default)]
struct GoalState {
    result: Option<GoalResult>,
    submitting: bool,
    last_error: Option<String>,
}

/// Clears `submitting` even if the goal future is dropped
struct Submitting {
    state: Arc<Mutex<GoalState>>,
}

impl Drop for Submitting {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.submitting = false;
    }
}

/// Owner of the current goal recommendation
#[derive(Clone)]
pub struct GoalPlanner {
    api: Arc<dyn CoachApi>,
    state: Arc<Mutex<GoalState>>,
}

impl GoalPlanner {
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(GoalState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GoalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send a goal and keep the returned recommendation
    ///
    /// Returns the new result on success. Not retried on failure.
    pub async fn submit_goal(
        &self,
        goal_amount: f64,
        target_date: NaiveDate,
    ) -> Result<GoalResult> {
        let guard = {
            let mut state = self.lock();
            if state.submitting {
                return Err(Error::InProgress("Goal submission"));
            }
            state.submitting = true;
            Submitting {
                state: self.state.clone(),
            }
        };

        let request = GoalRequest {
            goal_amount,
            target_date,
        };
        let result = self.api.set_goal(&request).await;

        drop(guard);
        let mut state = self.lock();
        match result {
            Ok(goal) => {
                info!(
                    "Goal set: {:.2} by {}: {}",
                    goal.goal.goal_amount, goal.goal.target_date, goal.recommendation
                );
                state.result = Some(goal.clone());
                state.last_error = None;
                Ok(goal)
            }
            Err(e) => {
                warn!("Goal submission failed: {}", e);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Latest successful result
    pub fn result(&self) -> Option<GoalResult> {
        self.lock().result.clone()
    }

    pub fn submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Diagnostic only; not part of the rendered view
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }
}
