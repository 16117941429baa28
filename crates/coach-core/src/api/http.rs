//! HTTP client for the insights API

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    Forecast, ForecastResponse, GoalRequest, GoalResult, InsightsResponse, InsightsSnapshot,
    NewTransaction, RecordedTransaction, TransactionAck, TransactionsResponse,
};

use super::CoachApi;

/// reqwest-backed [`CoachApi`]
///
/// No auth headers, no retries. Any non-2xx answer becomes
/// [`Error::Status`] carrying the raw body text.
#[derive(Clone)]
pub struct HttpApi {
    http_client: Client,
    config: ClientConfig,
}

impl HttpApi {
    /// Build a client for the configured origin and timeout
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }
}

/// Turn a non-2xx response into an error, keeping whatever body came back
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl CoachApi for HttpApi {
    async fn fetch_insights(&self) -> Result<InsightsSnapshot> {
        let response = self
            .http_client
            .get(self.config.endpoint("/api/insights"))
            .send()
            .await?;
        let envelope: InsightsResponse = read_json(response).await?;
        debug!(
            "Fetched insights: {} categories, {} subscriptions, {} anomalies",
            envelope.insights.category_spend_last_30d.len(),
            envelope.insights.subscriptions.len(),
            envelope.insights.anomalies.len()
        );
        Ok(envelope.insights)
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
        let response = self
            .http_client
            .post(self.config.endpoint("/api/transactions"))
            .json(transaction)
            .send()
            .await?;
        let response = check_status(response).await?;

        // Body is informational only; an unreadable one is still a success
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<TransactionAck>(&text) {
            Ok(ack) => debug!(
                "Transaction accepted: {} (id {:?})",
                ack.message.as_deref().unwrap_or("no message"),
                ack.transaction.and_then(|t| t.id)
            ),
            Err(_) => debug!("Transaction accepted"),
        }
        Ok(())
    }

    async fn set_goal(&self, goal: &GoalRequest) -> Result<GoalResult> {
        let response = self
            .http_client
            .post(self.config.endpoint("/api/goal"))
            .json(goal)
            .send()
            .await?;
        let result: GoalResult = read_json(response).await?;
        debug!("Goal recommendation: {}", result.recommendation);
        Ok(result)
    }

    async fn list_transactions(&self) -> Result<Vec<RecordedTransaction>> {
        let response = self
            .http_client
            .get(self.config.endpoint("/api/transactions"))
            .send()
            .await?;
        let envelope: TransactionsResponse = read_json(response).await?;
        Ok(envelope.transactions)
    }

    async fn forecast(&self, goal_amount: f64, months: u32) -> Result<Option<Forecast>> {
        let response = self
            .http_client
            .get(self.config.endpoint("/api/forecast"))
            .query(&[
                ("goal_amount", goal_amount.to_string()),
                ("months", months.to_string()),
            ])
            .send()
            .await?;
        let forecast = read_json::<ForecastResponse>(response).await?.into_forecast();
        if forecast.is_none() {
            debug!("Server has no data to forecast from");
        }
        Ok(forecast)
    }
}
