//! Savings goal command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use coach_core::{ClientConfig, Dashboard};

use super::print_page;

/// Set a goal while the insights load, then print the whole page
///
/// A failed goal does not stop the dashboard from rendering.
pub async fn cmd_goal(config: &ClientConfig, amount: f64, date: &str) -> Result<()> {
    let target_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("Invalid --date format (use YYYY-MM-DD)")?;
    if !amount.is_finite() || amount <= 0.0 {
        anyhow::bail!("Goal amount must be a positive number");
    }

    let page = Dashboard::from_config(config)?;
    let mounted = page.mount();
    let goal = page.goals().submit_goal(amount, target_date).await;
    mounted.await.context("Insights fetch task failed")?;

    match goal {
        Ok(_) => println!("🎯 Goal saved: ${:.2} by {}", amount, target_date),
        Err(e) => eprintln!("⚠️  Goal not saved: {}", e),
    }

    print_page(&page);
    Ok(())
}

pub async fn cmd_forecast(config: &ClientConfig, goal_amount: f64, months: u32) -> Result<()> {
    let page = Dashboard::from_config(config)?;
    let forecast = page
        .api()
        .forecast(goal_amount, months)
        .await
        .context("Failed to fetch forecast")?;

    println!();
    println!("📈 Forecast for ${:.2}", goal_amount);
    println!("   ─────────────────────────────");
    let Some(forecast) = forecast else {
        println!("   No data yet. Add some transactions first.");
        println!();
        return Ok(());
    };
    println!(
        "   Monthly surplus:  ${:.2}",
        forecast.monthly_surplus_estimate
    );
    println!(
        "   Months needed:    {} (horizon {})",
        forecast.projected_months_needed, months
    );
    println!();
    Ok(())
}
