use anyhow::Context;
use std::path::Path;
use meli_scout::{Config, MarketScout, MeliClient, SearchCriteria, VisitWindow};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to read configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .init();

    info!("🛒 MeLi Scout");
    info!("==========================================");

    let criteria = SearchCriteria::new(
        config.search_query.as_deref(),
        config.search_category.as_deref(),
        config.search_seller_id.as_deref(),
    )
    .context("Set SEARCH_QUERY, SEARCH_CATEGORY or SEARCH_SELLER_ID")?;

    let client = MeliClient::new(&config).context("Failed to create HTTP client")?;
    let scout = MarketScout::from_config(client, &config);

    let report = scout.search(&criteria).await?;
    if report.table.is_empty() {
        info!("No listings to show");
        return Ok(());
    }

    if let Some(url) = &report.probe_url {
        info!("Initial request sent to API: {}", url);
    }
    info!(
        "\n✅ {} listings ({} fetched of {} available)\n",
        report.table.len(),
        report.fetched,
        report.total_available
    );

    for (i, row) in report.table.iter().enumerate() {
        println!("{}. {} ({:.2})", i + 1, row.title, row.price);
        println!("   sold {}, revenue {:.2}", row.sold_quantity, row.revenue);
        println!("   {}, {} - seller {}", row.city, row.state, row.seller_id);
        println!("   listed {} days ago", row.days_ago);
        println!("   URL: {}", row.permalink);
        println!();
    }
    info!(
        "Total sold: {}, total revenue: {:.2}",
        report.table.total_sold_quantity(),
        report.table.total_revenue()
    );
    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.id, skipped.reason);
    }

    // Save the table
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&config.output_path, json)
        .await
        .with_context(|| format!("Failed to write {}", config.output_path))?;
    info!("💾 Saved listings to {}", config.output_path);

    if config.visits_items > 0 {
        let window = VisitWindow {
            unit: config.visits_unit,
            last: config.visits_last,
        };
        let visits = scout
            .visits(&report.table, config.visits_items, config.visits_sort_by, window)
            .await?;

        for id in &visits.item_ids {
            println!("{}: {} visits", id, visits.total_for(id).unwrap_or(0));
        }

        let visits_path = Path::new(&config.output_path).with_extension("visits.json");
        let json = serde_json::to_string_pretty(&visits)?;
        tokio::fs::write(&visits_path, json).await?;
        info!(
            "💾 Saved visits for {} items to {}",
            visits.item_ids.len(),
            visits_path.display()
        );
    }

    Ok(())
}
