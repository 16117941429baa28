//! CLI command tests
//!
//! Commands run against the mock insights server from coach-core.

use std::io::Write;

use coach_core::test_utils::MockCoachServer;
use coach_core::{ClientConfig, RefreshOrdering};

use crate::commands::{self, truncate};

fn config_for(server: &MockCoachServer) -> ClientConfig {
    ClientConfig::with_base_url(&server.url())
}

// ========== Dashboard Command Tests ==========

#[tokio::test]
async fn test_cmd_dashboard() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_dashboard(&config_for(&server), false).await;
    assert!(result.is_ok());
    assert_eq!(server.insights_requests(), 1);
}

#[tokio::test]
async fn test_cmd_dashboard_json() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_dashboard(&config_for(&server), true).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_dashboard_server_down() {
    let server = MockCoachServer::start().await;
    server.set_failing(true);
    let result = commands::cmd_dashboard(&config_for(&server), false).await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("Could not load insights"));
}

// ========== Transaction Command Tests ==========

#[tokio::test]
async fn test_cmd_add() {
    let server = MockCoachServer::start().await;
    let result =
        commands::cmd_add(&config_for(&server), "12.50", "Groceries", "Corner store").await;
    assert!(result.is_ok());

    let received = server.received_transactions();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].amount, 12.5);
    assert_eq!(received[0].description, "Corner store");
    assert_eq!(server.insights_requests(), 1);
}

#[tokio::test]
async fn test_cmd_add_negative_amount() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_add(&config_for(&server), "-20", "Refund", "").await;
    assert!(result.is_ok());
    assert_eq!(server.received_transactions()[0].amount, -20.0);
}

#[tokio::test]
async fn test_cmd_add_invalid_amount() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_add(&config_for(&server), "twelve", "Groceries", "").await;

    assert!(result.unwrap_err().to_string().contains("Not submitted"));
    assert!(server.received_transactions().is_empty());
    assert_eq!(server.insights_requests(), 0);
}

#[tokio::test]
async fn test_cmd_add_empty_category() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_add(&config_for(&server), "5", "", "").await;
    assert!(result.is_err());
    assert!(server.received_transactions().is_empty());
}

#[tokio::test]
async fn test_cmd_add_server_error() {
    let server = MockCoachServer::start().await;
    server.set_failing(true);
    let result = commands::cmd_add(&config_for(&server), "5", "Dining", "").await;

    assert!(result.is_err());
    assert_eq!(server.insights_requests(), 0);
}

#[tokio::test]
async fn test_cmd_transactions() {
    let server = MockCoachServer::start().await;
    let config = config_for(&server);
    commands::cmd_add(&config, "3", "Food & Drink", "Coffee")
        .await
        .unwrap();

    assert!(commands::cmd_transactions(&config, 20).await.is_ok());
    assert!(commands::cmd_transactions(&config, 0).await.is_ok());
}

#[tokio::test]
async fn test_cmd_transactions_empty() {
    let server = MockCoachServer::start().await;
    assert!(commands::cmd_transactions(&config_for(&server), 20)
        .await
        .is_ok());
}

// ========== Goal Command Tests ==========

#[tokio::test]
async fn test_cmd_goal() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_goal(&config_for(&server), 5000.0, "2025-12-31").await;
    assert!(result.is_ok());

    let goals = server.received_goals();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].target_date.to_string(), "2025-12-31");
    assert_eq!(server.insights_requests(), 1);
}

#[tokio::test]
async fn test_cmd_goal_invalid_date() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_goal(&config_for(&server), 5000.0, "12/31/2025").await;
    assert!(result.is_err());
    assert!(server.received_goals().is_empty());
}

#[tokio::test]
async fn test_cmd_goal_invalid_amount() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_goal(&config_for(&server), 0.0, "2025-12-31").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_goal_failure_is_not_fatal() {
    let server = MockCoachServer::start().await;
    server.set_failing(true);
    let result = commands::cmd_goal(&config_for(&server), 5000.0, "2025-12-31").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_forecast() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_forecast(&config_for(&server), 3000.0, 10).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_forecast_no_data() {
    let server = MockCoachServer::start().await;
    server.set_forecast_empty(true);
    let result = commands::cmd_forecast(&config_for(&server), 3000.0, 10).await;
    assert!(result.is_ok());
}

// ========== Status Command Tests ==========

#[tokio::test]
async fn test_cmd_status_reachable() {
    let server = MockCoachServer::start().await;
    let result = commands::cmd_status(&config_for(&server), None).await;
    assert!(result.is_ok());
    assert_eq!(server.insights_requests(), 1);
}

#[tokio::test]
async fn test_cmd_status_with_config_file() {
    let server = MockCoachServer::start().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[api]\nbase_url = \"{}\"\n\n[insights]\nrefresh_ordering = \"latest_issued\"",
        server.url()
    )
    .unwrap();

    let config = ClientConfig::from_files(Some(file.path())).unwrap();
    assert_eq!(config.refresh_ordering, RefreshOrdering::LatestIssued);

    let result = commands::cmd_status(&config, Some(file.path())).await;
    assert!(result.is_ok());
    assert_eq!(server.insights_requests(), 1);
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 10), "Netflix");
    assert_eq!(truncate("Whole Foods Market #123", 10), "Whole F...");
    assert_eq!(truncate("Café Olé Olé", 8), "Café ...");
}
