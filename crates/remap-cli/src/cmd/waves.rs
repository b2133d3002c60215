use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use remap_core::{
    config::Config,
    inventory::Inventory,
    plan::{MigrationPlan, PlanEntry},
    scheduler::WaveAssignment,
    topics::TopicSet,
    types::{MigrationAction, WaveNumber},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum WavesSubcommand {
    /// Show the wave roster for a plan
    Show { plan: String },
    /// Re-pour non-pinned entries into waves after overrides
    Rebalance { plan: String },
}

pub fn run(root: &Path, subcmd: WavesSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WavesSubcommand::Show { plan } => show(root, &plan, json),
        WavesSubcommand::Rebalance { plan } => rebalance(root, &plan, json),
    }
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let plan = MigrationPlan::load(root, slug)?;

    let scheduled: Vec<&PlanEntry> = plan
        .entries
        .iter()
        .filter(|e| !e.removed && e.action.action != MigrationAction::Keep)
        .collect();

    let assignments: Vec<WaveAssignment> = WaveNumber::all()
        .iter()
        .map(|&wave| WaveAssignment {
            wave,
            item_ids: scheduled
                .iter()
                .filter(|e| e.wave == Some(wave))
                .map(|e| e.id.clone())
                .collect(),
        })
        .collect();
    let unscheduled: Vec<&str> = scheduled
        .iter()
        .filter(|e| e.wave.is_none())
        .map(|e| e.id.as_str())
        .collect();

    if json {
        return print_json(&serde_json::json!({
            "plan": plan.slug,
            "strategy": plan.strategy,
            "waves": assignments,
            "unscheduled": unscheduled,
        }));
    }

    println!("Waves for '{slug}' (strategy: {}):", plan.strategy);
    for assignment in &assignments {
        println!(
            "\nWave {} ({} entries):",
            assignment.wave,
            assignment.item_ids.len()
        );
        for id in &assignment.item_ids {
            if let Ok(e) = plan.entry(id) {
                let pin = if e.pinned { " [pinned]" } else { "" };
                println!("  {}  {}{}", id, e.action.action, pin);
            }
        }
    }

    if !unscheduled.is_empty() {
        println!("\nUnscheduled:");
        for id in &unscheduled {
            println!("  {id}");
        }
    }
    Ok(())
}

fn rebalance(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let inventory = Inventory::load_or_default(root).context("failed to load inventory")?;
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;

    let mut plan = MigrationPlan::load(root, slug)?;
    let moves = plan.rebalance(&inventory, &topics, &config)?;
    plan.save(root)?;

    if json {
        return print_json(&moves);
    }

    if moves.is_empty() {
        println!("Nothing to rebalance in '{slug}' (no movable entries).");
    } else {
        println!("Rebalanced {} entries in '{slug}':", moves.len());
        for (id, wave) in &moves {
            println!("  {id} -> wave {wave}");
        }
    }
    Ok(())
}
