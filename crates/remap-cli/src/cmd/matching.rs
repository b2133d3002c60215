use crate::output::{print_json, print_table};
use anyhow::Context;
use remap_core::{
    config::Config,
    inventory::{Inventory, QuerySignalTable},
    matcher::match_inventory,
    topics::TopicSet,
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let inventory = Inventory::load_or_default(root).context("failed to load inventory")?;
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;
    let signals = QuerySignalTable::load_or_default(root).context("failed to load signals")?;

    let report = match_inventory(&inventory, &topics, &signals, &config.matcher);

    if json {
        return print_json(&report);
    }

    let s = report.stats;
    println!(
        "Matched {} of {} pages ({} orphans, {} cannibalized, {} gaps)",
        s.matched, s.items, s.orphans, s.cannibalized, s.gaps
    );

    if !report.results.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = report
            .results
            .iter()
            .map(|r| {
                // Orphans show the nearest candidate topic for context
                let topic = r
                    .topic_id
                    .clone()
                    .or_else(|| r.nearest_topic_id.clone())
                    .unwrap_or_default();
                vec![
                    r.item_id.clone(),
                    r.category.to_string(),
                    topic,
                    format!("{:.2}", r.confidence),
                ]
            })
            .collect();
        print_table(&["PAGE", "CATEGORY", "TOPIC", "CONFIDENCE"], rows);
    }

    if !report.gaps.is_empty() {
        println!("\nGap topics (no covering page):");
        let rows: Vec<Vec<String>> = report
            .gaps
            .iter()
            .map(|g| vec![g.topic_id.clone(), g.importance.to_string(), g.title.clone()])
            .collect();
        print_table(&["TOPIC", "IMPORTANCE", "TITLE"], rows);
    }

    Ok(())
}
