//! Dashboard command implementation

use anyhow::{Context, Result};
use coach_core::{ClientConfig, Dashboard, ViewState};

/// Mount the dashboard, wait for the first fetch, and print it
pub async fn cmd_dashboard(config: &ClientConfig, json: bool) -> Result<()> {
    let page = Dashboard::from_config(config)?;
    page.mount().await.context("Insights fetch task failed")?;

    let view = page.view();
    if let ViewState::Error(ref message) = view {
        anyhow::bail!("Could not load insights from {}: {}", config.base_url, message);
    }

    if json {
        if let ViewState::Ready { ref insights, .. } = view {
            println!("{}", serde_json::to_string_pretty(insights.as_ref())?);
        }
        return Ok(());
    }

    print_page(&page);
    Ok(())
}

/// Print the current view under the dashboard banner
pub fn print_page(page: &Dashboard) {
    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        💰 Smart Financial Coach         │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    print!("{}", page.render());
}
