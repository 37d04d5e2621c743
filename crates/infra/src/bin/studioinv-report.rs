//! Load a seed file into an in-memory store and print the dashboard.
//!
//! Usage: `studioinv-report <seed.json> [all|damaged|lost|outgoing|label|unlabeled|has_label]`

use std::sync::Arc;

use anyhow::Context;

use studioinv_infra::seed::SeedData;
use studioinv_infra::user_history::UserHistoryFile;
use studioinv_infra::{InMemoryDocumentStore, InventoryConfig, InventoryStore, SyncWorker};
use studioinv_inventory::{group_by_category, issues, EquipmentSummary, IssueFilter, Progress};
use studioinv_observability::LogFormat;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = InventoryConfig::load()?;
    let format: LogFormat = config.logging.format.parse()?;
    studioinv_observability::init_with(&config.logging.level, format);

    let mut args = std::env::args().skip(1);
    let seed_path = args
        .next()
        .context("usage: studioinv-report <seed.json> [issue filter]")?;
    let filter: IssueFilter = args.next().as_deref().unwrap_or("all").parse()?;

    let backend = Arc::new(InMemoryDocumentStore::new());
    SeedData::load(&seed_path)?.apply(&backend, &config.collections)?;

    let store = Arc::new(InventoryStore::new(Arc::clone(&backend), config.collections.clone()));
    let worker = SyncWorker::spawn(Arc::clone(&store));

    let view = store
        .subscribe()
        .wait_for(|view| view.loaded)
        .await
        .context("store closed before the first full snapshot")?
        .clone();
    worker.shutdown().await;

    tracing::info!(version = view.version, studios = view.studios.len(), "inventory loaded");

    let recent = UserHistoryFile::from_config(&config.user_history).load();
    if !recent.names().is_empty() {
        println!("recent users: {}", recent.names().join(", "));
    }

    let stats = view.stats();
    println!(
        "checked {}/{} | damaged {} | lost {} | out {} | repaired {} | label replacement {} | unlabeled {}",
        stats.checked_units,
        stats.total_units,
        stats.damaged,
        stats.lost,
        stats.outgoing,
        stats.repaired,
        stats.replacement_pending,
        stats.unlabeled,
    );

    for studio in view.studios.iter() {
        let progress = Progress::of_studio(studio);
        println!();
        println!(
            "== {} ({}/{} checked) signed in: {}",
            studio.name,
            progress.checked,
            progress.total,
            if studio.assignees.is_empty() { "-".to_string() } else { studio.assignees.join(", ") },
        );
        for (category, items) in group_by_category(&studio.equipment) {
            println!("  [{category}]");
            for item in items {
                let summary = EquipmentSummary::of(item);
                println!(
                    "    {:<28} normal {}/{} checked {}/{}{}",
                    summary.name,
                    summary.normal,
                    summary.declared_quantity,
                    summary.checked,
                    summary.actual_units,
                    if summary.quantity_mismatch() { "  (unit count differs from quantity)" } else { "" },
                );
            }
        }
    }

    println!();
    println!("issues ({filter:?}):");
    for group in issues(&view.studios, filter) {
        println!("  {}", group.studio.name);
        for issue in group.issues {
            println!(
                "    {} {} status={} label={}{}",
                issue.equipment.name,
                issue.unit.display_label(),
                issue.unit.status,
                issue.unit.label_status,
                if issue.unit.replacement_pending { " replacement-pending" } else { "" },
            );
        }
    }

    Ok(())
}
