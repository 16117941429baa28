//! Plain-text rendering of the dashboard view

use std::fmt::Write;

use crate::models::{Anomaly, GoalResult, InsightsSnapshot, Subscription, TrendInsight};
use crate::view::ViewState;

/// `Groceries: $310.50`
pub fn category_line(category: &str, amount: f64) -> String {
    format!("{}: ${:.2}", category, amount)
}

/// One line per category key, in key order
pub fn category_lines(insights: &InsightsSnapshot) -> Vec<String> {
    insights
        .category_spend_last_30d
        .iter()
        .map(|(category, amount)| category_line(category, *amount))
        .collect()
}

/// `Netflix — $15.49 × 3`
pub fn subscription_line(subscription: &Subscription) -> String {
    format!(
        "{} — ${:.2} × {}",
        subscription.merchant, subscription.avg_amount, subscription.occurrences
    )
}

pub fn anomaly_line(anomaly: &Anomaly) -> String {
    match anomaly.months {
        Some(months) => format!(
            "{}: ${:.2} (unusual across {} months)",
            anomaly.category, anomaly.latest_total, months
        ),
        None => format!("{}: ${:.2} (unusual)", anomaly.category, anomaly.latest_total),
    }
}

pub fn trend_line(trend: &TrendInsight) -> String {
    let summary = if trend.sentence.is_empty() {
        format!(
            "{} {} {:.1}% (${:.2} vs ${:.2})",
            trend.category,
            trend.direction,
            trend.percent_change.abs(),
            trend.current_total,
            trend.previous_total
        )
    } else {
        trend.sentence.clone()
    };
    if trend.advice.is_empty() {
        summary
    } else {
        format!("{} {}", summary, trend.advice)
    }
}

pub fn goal_lines(goal: &GoalResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Target: ${:.2} by {}",
            goal.goal.goal_amount, goal.goal.target_date
        ),
        goal.recommendation.clone(),
    ];
    if let Some(ref forecast) = goal.forecast {
        lines.push(format!(
            "Forecast: {} months at ${:.2}/mo surplus",
            forecast.projected_months_needed, forecast.monthly_surplus_estimate
        ));
    }
    lines
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "{}", title);
    if lines.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for line in lines {
        let _ = writeln!(out, "  {}", line);
    }
    out.push('\n');
}

/// Render the whole page
///
/// Loading and Error replace the dashboard entirely; Ready draws every
/// section plus the transaction form status and goal.
pub fn render(view: &ViewState) -> String {
    let (insights, submitting, goal) = match view {
        ViewState::Loading => return "Loading...\n".to_string(),
        ViewState::Error(message) => return format!("Error: {}\n", message),
        ViewState::Ready {
            insights,
            submitting,
            goal,
        } => (insights, *submitting, goal),
    };

    let mut out = String::new();
    section(
        &mut out,
        "Spending (last 30 days)",
        &category_lines(insights),
    );
    section(
        &mut out,
        "Subscriptions",
        &insights
            .subscriptions
            .iter()
            .map(subscription_line)
            .collect::<Vec<_>>(),
    );
    section(
        &mut out,
        "Anomalies",
        &insights
            .anomalies
            .iter()
            .map(anomaly_line)
            .collect::<Vec<_>>(),
    );
    if !insights.trend_insights.is_empty() {
        section(
            &mut out,
            "Trends",
            &insights
                .trend_insights
                .iter()
                .map(trend_line)
                .collect::<Vec<_>>(),
        );
    }
    section(
        &mut out,
        "Tips",
        &insights
            .tips
            .iter()
            .map(|tip| format!("• {}", tip))
            .collect::<Vec<_>>(),
    );

    if submitting {
        let _ = writeln!(out, "Adding transaction...");
        out.push('\n');
    }
    if let Some(goal) = goal {
        section(&mut out, "Goal", &goal_lines(goal));
    }

    out
}
