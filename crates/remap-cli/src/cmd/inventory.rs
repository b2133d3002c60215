use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use remap_core::inventory::Inventory;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum InventorySubcommand {
    /// Import a crawl export (.yaml/.yml/.json) as the project inventory
    Import { path: PathBuf },
    /// List pages with their confirmed topic mappings
    List,
}

pub fn run(root: &Path, subcmd: InventorySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        InventorySubcommand::Import { path } => import(root, &path, json),
        InventorySubcommand::List => list(root, json),
    }
}

fn import(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let inventory = Inventory::import(root, path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "imported": inventory.items.len() }))?;
    } else {
        println!(
            "Imported {} pages into .remap/inventory.yaml",
            inventory.items.len()
        );
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let inventory = Inventory::load_or_default(root).context("failed to load inventory")?;

    if json {
        return print_json(&inventory.items);
    }

    if inventory.items.is_empty() {
        println!("No pages imported yet. Run: remap inventory import <crawl.yaml>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = inventory
        .items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.monthly_clicks.to_string(),
                i.mapped_topic_id.clone().unwrap_or_default(),
                i.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "CLICKS", "TOPIC", "TITLE"], rows);
    Ok(())
}
