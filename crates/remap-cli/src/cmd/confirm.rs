use crate::output::print_json;
use anyhow::Context;
use remap_core::{
    config::Config,
    inventory::{Inventory, QuerySignalTable},
    matcher::{apply_confirmations, match_inventory},
    topics::TopicSet,
};
use std::path::Path;

pub fn run(root: &Path, min_confidence: f64, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut inventory = Inventory::load_or_default(root).context("failed to load inventory")?;
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;
    let signals = QuerySignalTable::load_or_default(root).context("failed to load signals")?;

    let report = match_inventory(&inventory, &topics, &signals, &config.matcher);
    let outcome = apply_confirmations(&mut inventory, &report.results, min_confidence);
    inventory.save(root).context("failed to save inventory")?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "Confirmed {} mappings at confidence >= {:.2} ({} skipped)",
            outcome.confirmed, min_confidence, outcome.skipped
        );
    }
    Ok(())
}
