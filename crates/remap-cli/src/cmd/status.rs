use crate::output::{print_json, print_table};
use anyhow::Context;
use remap_core::{
    config::{Config, ConfigWarning, WarnLevel},
    inventory::{Inventory, QuerySignalTable},
    plan::MigrationPlan,
    topics::TopicSet,
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let inventory = Inventory::load_or_default(root).context("failed to load inventory")?;
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;
    let signals = QuerySignalTable::load_or_default(root).context("failed to load signals")?;
    let plans = MigrationPlan::list(root)?;
    let warnings = config.validate();

    if json {
        #[derive(serde::Serialize)]
        struct PlanSummary<'a> {
            slug: &'a str,
            status: String,
            strategy: String,
            entries: usize,
        }

        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            project: &'a str,
            pages: usize,
            mapped: usize,
            topics: usize,
            core_topics: usize,
            signal_urls: usize,
            plans: Vec<PlanSummary<'a>>,
            config_warnings: &'a [ConfigWarning],
        }

        let output = StatusOutput {
            project: &config.project.name,
            pages: inventory.items.len(),
            mapped: inventory.mapped_count(),
            topics: topics.topics.len(),
            core_topics: topics.core_count(),
            signal_urls: signals.urls.len(),
            plans: plans
                .iter()
                .map(|p| PlanSummary {
                    slug: &p.slug,
                    status: p.status.to_string(),
                    strategy: p.strategy.to_string(),
                    entries: p.active_count(),
                })
                .collect(),
            config_warnings: &warnings,
        };
        return print_json(&output);
    }

    println!("Project: {}", config.project.name);
    println!(
        "Pages: {} ({} mapped)",
        inventory.items.len(),
        inventory.mapped_count()
    );
    println!(
        "Topics: {} ({} core)",
        topics.topics.len(),
        topics.core_count()
    );
    println!("Signal URLs: {}", signals.urls.len());

    if plans.is_empty() {
        println!("\nNo plans yet. Run: remap plan create <slug>");
    } else {
        println!("\nPlans:");
        let rows: Vec<Vec<String>> = plans
            .iter()
            .map(|p| {
                vec![
                    p.slug.clone(),
                    p.status.to_string(),
                    p.strategy.to_string(),
                    p.active_count().to_string(),
                ]
            })
            .collect();
        print_table(&["SLUG", "STATUS", "STRATEGY", "ENTRIES"], rows);
    }

    if !warnings.is_empty() {
        println!("\nConfig warnings:");
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("  [{prefix}] {}", w.message);
        }
    }
    Ok(())
}
