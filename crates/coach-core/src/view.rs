//! Renderable page state
//!
//! [`reduce`] folds the three flows into one [`ViewState`]. It is a pure
//! function: nothing here is stored, it is recomputed on every render.

use std::sync::Arc;

use crate::models::{GoalResult, InsightsSnapshot};

/// Everything the reducer looks at
#[derive(Debug, Clone, Default)]
pub struct ViewInputs {
    pub insights: Option<Arc<InsightsSnapshot>>,
    pub error: Option<String>,
    pub loading: bool,
    pub submitting: bool,
    pub goal: Option<GoalResult>,
}

/// What the presentation layer draws
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No data yet and nothing failed
    Loading,
    /// No data at all and the fetch failed: render the error only
    Error(String),
    /// Data to show; the transaction form and goal section ride along
    Ready {
        insights: Arc<InsightsSnapshot>,
        submitting: bool,
        goal: Option<GoalResult>,
    },
}

impl ViewState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready { .. })
    }
}

/// Derive the view from the current flow state
///
/// A stale insights error never hides data that was already fetched, and the
/// goal result is carried regardless of insights loading or error.
pub fn reduce(inputs: &ViewInputs) -> ViewState {
    match (&inputs.insights, &inputs.error) {
        (None, Some(message)) => ViewState::Error(message.clone()),
        (None, None) => ViewState::Loading,
        (Some(insights), _) => ViewState::Ready {
            insights: insights.clone(),
            submitting: inputs.submitting,
            goal: inputs.goal.clone(),
        },
    }
}
