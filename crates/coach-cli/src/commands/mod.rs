//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `dashboard` - Insights view (text or JSON)
//! - `transactions` - Add a transaction, list stored transactions
//! - `goal` - Savings goal and forecast
//! - `status` - Resolved configuration and server reachability

pub mod dashboard;
pub mod goal;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use dashboard::*;
pub use goal::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
