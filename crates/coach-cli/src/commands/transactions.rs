//! Transaction command implementations

use anyhow::{Context, Result};
use coach_core::{ClientConfig, Dashboard, Error, TransactionDraft};

use super::{print_page, truncate};

/// Fill the form, submit it, and show the refreshed dashboard
pub async fn cmd_add(
    config: &ClientConfig,
    amount: &str,
    category: &str,
    description: &str,
) -> Result<()> {
    let page = Dashboard::from_config(config)?;
    let form = page.transactions();
    form.set_draft(TransactionDraft::new(amount, category, description));

    let refresh = match form.submit().await {
        Ok(refresh) => refresh,
        Err(Error::Validation(msg)) => anyhow::bail!("Not submitted: {}", msg),
        Err(e) => {
            let draft = form.draft();
            eprintln!(
                "❌ Transaction not saved; retry with: coach add -a '{}' -c '{}' -d '{}'",
                draft.amount, draft.category, draft.description
            );
            return Err(e).context("Failed to add transaction");
        }
    };

    println!("✅ Transaction added: {} in {}", amount.trim(), category);

    // The submission is done; this only waits so the refreshed view can be printed
    refresh.await.context("Insights refresh task failed")?;
    print_page(&page);
    Ok(())
}

pub async fn cmd_transactions(config: &ClientConfig, limit: usize) -> Result<()> {
    let page = Dashboard::from_config(config)?;
    let transactions = page
        .api()
        .list_transactions()
        .await
        .context("Failed to list transactions")?;

    if transactions.is_empty() {
        println!("No transactions yet. Add one with:");
        println!("  coach add --amount 12.50 --category Groceries");
        return Ok(());
    }

    println!();
    println!("📒 Transactions ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    let skip = transactions.len().saturating_sub(limit);
    for tx in transactions.iter().skip(skip) {
        println!(
            "   {:10} │ {:24} │ {:16} │ {:>10}",
            tx.date.as_deref().unwrap_or("?"),
            truncate(tx.merchant.as_deref().unwrap_or("-"), 24),
            truncate(&tx.category, 16),
            format!("${:.2}", tx.amount)
        );
    }

    Ok(())
}
