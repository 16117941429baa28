//! Wire and form models shared by the client flows
//!
//! Field names follow the insights API JSON exactly. Every collection in
//! [`InsightsSnapshot`] defaults to empty because the server answers
//! `{"insights": {}}` when it has no transactions yet.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One complete insights payload as returned by `GET /api/insights`
///
/// Never patched in place: the store swaps the whole value on every
/// successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSnapshot {
    #[serde(default)]
    pub category_spend_last_30d: BTreeMap<String, f64>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub trend_insights: Vec<TrendInsight>,
}

impl InsightsSnapshot {
    /// True when the server had nothing to report
    pub fn is_empty(&self) -> bool {
        self.category_spend_last_30d.is_empty()
            && self.subscriptions.is_empty()
            && self.anomalies.is_empty()
            && self.tips.is_empty()
            && self.trend_insights.is_empty()
    }
}

/// A merchant the server detected as recurring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub merchant: String,
    pub avg_amount: f64,
    pub occurrences: u32,
}

/// A category whose latest monthly total stands out from its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub category: String,
    pub latest_total: f64,
    /// Number of monthly totals the server compared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
}

/// Direction of a category's spend versus the prior 30 days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increase,
    Decrease,
    Flat,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Last-30-days versus prior-30-days comparison for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendInsight {
    pub category: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub percent_change: f64,
    pub direction: TrendDirection,
    #[serde(default)]
    pub advice: String,
    #[serde(default)]
    pub sentence: String,
}

/// Envelope of `GET /api/insights`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub insights: InsightsSnapshot,
}

/// Transaction form state, edited field by field
///
/// `amount` stays as the text the user typed; it is only parsed when the
/// draft is turned into a [`NewTransaction`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount: String,
    pub category: String,
    pub description: String,
}

impl TransactionDraft {
    pub fn new(amount: &str, category: &str, description: &str) -> Self {
        Self {
            amount: amount.to_string(),
            category: category.to_string(),
            description: description.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_empty() && self.category.is_empty() && self.description.is_empty()
    }

    /// Validate and convert into the request body
    ///
    /// The amount must parse as a finite number and the category must not be
    /// blank. Category and description are passed through untouched.
    pub fn to_request(&self) -> Result<NewTransaction> {
        let amount_text = self.amount.trim();
        if amount_text.is_empty() {
            return Err(Error::Validation("amount is required".into()));
        }
        let amount: f64 = amount_text
            .parse()
            .map_err(|_| Error::Validation(format!("amount is not a number: {}", self.amount)))?;
        if !amount.is_finite() {
            return Err(Error::Validation(format!(
                "amount must be finite: {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(Error::Validation("category is required".into()));
        }

        Ok(NewTransaction {
            amount,
            category: self.category.clone(),
            description: self.description.clone(),
        })
    }
}

/// Body of `POST /api/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Transaction row as stored by the server (`GET /api/transactions`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedTransaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<RecordedTransaction>,
}

/// Acknowledgement of `POST /api/transactions`; only logged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction: Option<RecordedTransaction>,
}

/// Body of `POST /api/goal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub goal_amount: f64,
    pub target_date: NaiveDate,
}

/// Server projection of how long a goal takes at the current surplus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub projected_months_needed: i64,
    pub monthly_surplus_estimate: f64,
}

/// Body of `GET /api/forecast`
///
/// A server without transaction data answers `{"forecast": {}}` instead of a
/// projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Projection(Forecast),
    NoData {
        forecast: BTreeMap<String, serde_json::Value>,
    },
}

impl ForecastResponse {
    pub fn into_forecast(self) -> Option<Forecast> {
        match self {
            ForecastResponse::Projection(forecast) => Some(forecast),
            ForecastResponse::NoData { .. } => None,
        }
    }
}

/// Response of `POST /api/goal`: the echoed goal plus advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResult {
    pub goal: GoalRequest,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}
