//! Status command implementation

use std::path::Path;

use anyhow::Result;
use coach_core::config::default_config_path;
use coach_core::{ClientConfig, Dashboard, RefreshOutcome};

pub async fn cmd_status(config: &ClientConfig, config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("📊 Coach Status");
    println!("   ─────────────────────────────────────────────────────────────");

    let path = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);
    match path {
        Some(ref p) if p.exists() => println!("   Config: {}", p.display()),
        Some(ref p) => println!("   Config: built-in defaults ({} not found)", p.display()),
        None => println!("   Config: built-in defaults"),
    }
    println!("   API: {}", config.base_url);
    println!("   Timeout: {}s", config.timeout.as_secs());
    println!("   Refresh ordering: {}", config.refresh_ordering);

    let page = Dashboard::from_config(config)?;
    match page.insights().refresh().await {
        RefreshOutcome::Failed(message) => {
            println!();
            println!("   ❌ Server unreachable: {}", message);
        }
        _ => {
            let categories = page
                .insights()
                .snapshot()
                .map(|s| s.category_spend_last_30d.len())
                .unwrap_or(0);
            println!();
            println!("   ✅ Server reachable ({} spending categories)", categories);
        }
    }

    println!();
    Ok(())
}
