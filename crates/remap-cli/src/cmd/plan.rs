use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use remap_core::{
    config::Config,
    inventory::{Inventory, QuerySignalTable},
    plan::{MigrationPlan, PlanEntry},
    topics::TopicSet,
    types::{PlanStatus, WaveStrategy},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Create a new migration plan
    Create {
        slug: String,
        /// Human-readable title (defaults to the slug)
        #[arg(long)]
        title: Option<String>,
        /// Wave strategy: monetization_first, traffic_first, quick_wins
        #[arg(long, default_value = "monetization_first")]
        strategy: String,
    },
    /// Run the matcher and planner and fill the plan's entries and waves
    Generate {
        slug: String,
        /// Restart even if a generation appears to be in progress
        #[arg(long)]
        force: bool,
    },
    /// List all plans
    List,
    /// Show one plan with its entries
    Show { slug: String },
    /// Approve a plan, freezing its entries and waves
    Approve { slug: String },
    /// Export a plan to stdout
    Export {
        slug: String,
        /// Export format: json or csv
        #[arg(long, default_value = "json")]
        format: String,
    },
}

pub fn run(root: &Path, subcmd: PlanSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PlanSubcommand::Create {
            slug,
            title,
            strategy,
        } => create(root, &slug, title.as_deref(), &strategy, json),
        PlanSubcommand::Generate { slug, force } => generate(root, &slug, force, json),
        PlanSubcommand::List => list(root, json),
        PlanSubcommand::Show { slug } => show(root, &slug, json),
        PlanSubcommand::Approve { slug } => approve(root, &slug, json),
        PlanSubcommand::Export { slug, format } => export(root, &slug, &format),
    }
}

fn create(
    root: &Path,
    slug: &str,
    title: Option<&str>,
    strategy: &str,
    json: bool,
) -> anyhow::Result<()> {
    let strategy: WaveStrategy = strategy.parse()?;
    let title = title.unwrap_or(slug);
    let plan = MigrationPlan::create(root, slug, title, strategy)?;

    if json {
        print_json(&serde_json::json!({
            "slug": plan.slug,
            "plan_id": plan.plan_id,
            "status": plan.status,
            "strategy": plan.strategy,
        }))?;
    } else {
        println!("Created plan '{slug}' ({strategy})");
        println!("Next: remap plan generate {slug}");
    }
    Ok(())
}

fn generate(root: &Path, slug: &str, force: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let inventory = Inventory::load_or_default(root).context("failed to load inventory")?;
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;
    let signals = QuerySignalTable::load_or_default(root).context("failed to load signals")?;

    let mut plan = MigrationPlan::load(root, slug)?;
    plan.begin_generation(force)?;
    // Persist the generating guard before the pipeline runs, so a second
    // generate on the same slug fails fast instead of racing this one.
    plan.save(root)?;

    let report = plan.regenerate(&inventory, &topics, &signals, &config);
    plan.transition(PlanStatus::Ready)?;
    plan.save(root)?;
    tracing::debug!(slug, entries = plan.entries.len(), "plan regenerated");

    if json {
        print_json(&serde_json::json!({
            "slug": plan.slug,
            "status": plan.status,
            "entries": plan.entries.len(),
            "stats": report.stats,
        }))?;
    } else {
        let s = report.stats;
        println!(
            "Generated {} entries for '{slug}' ({} matched, {} orphans, {} cannibalized, {} gaps)",
            plan.entries.len(),
            s.matched,
            s.orphans,
            s.cannibalized,
            s.gaps
        );
        println!("Plan is ready. Review: remap plan show {slug}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let plans = MigrationPlan::list(root)?;

    if json {
        return print_json(&plans);
    }

    if plans.is_empty() {
        println!("No plans yet. Run: remap plan create <slug>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = plans
        .iter()
        .map(|p| {
            vec![
                p.slug.clone(),
                p.status.to_string(),
                p.strategy.to_string(),
                p.active_count().to_string(),
                p.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["SLUG", "STATUS", "STRATEGY", "ENTRIES", "UPDATED"], rows);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let plan = MigrationPlan::load(root, slug)?;

    if json {
        return print_json(&plan);
    }

    println!("Plan: {} ({})", plan.title, plan.slug);
    println!(
        "Status: {} | Strategy: {} | Entries: {} active of {}",
        plan.status,
        plan.strategy,
        plan.active_count(),
        plan.entries.len()
    );

    if plan.entries.is_empty() {
        println!("\nNo entries yet. Run: remap plan generate {slug}");
        return Ok(());
    }

    println!();
    let rows: Vec<Vec<String>> = plan.entries.iter().map(entry_row).collect();
    print_table(
        &["ID", "ACTION", "TOPIC", "WAVE", "PRIORITY", "EFFORT", "FLAGS"],
        rows,
    );
    Ok(())
}

fn entry_row(e: &PlanEntry) -> Vec<String> {
    let mut flags: Vec<&str> = Vec::new();
    if e.pinned {
        flags.push("pinned");
    }
    if e.removed {
        flags.push("removed");
    }
    vec![
        e.id.clone(),
        e.action.action.to_string(),
        e.action.topic_id.clone().unwrap_or_default(),
        e.wave.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
        e.action.priority.to_string(),
        e.action.effort.to_string(),
        flags.join(","),
    ]
}

fn approve(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let mut plan = MigrationPlan::load(root, slug)?;
    plan.transition(PlanStatus::Approved)?;
    plan.save(root)?;

    if json {
        print_json(&serde_json::json!({
            "slug": plan.slug,
            "status": plan.status,
            "approved_at": plan.approved_at,
        }))?;
    } else {
        println!("Approved plan '{slug}'. Entries and waves are now frozen.");
    }
    Ok(())
}

fn export(root: &Path, slug: &str, format: &str) -> anyhow::Result<()> {
    let plan = MigrationPlan::load(root, slug)?;

    match format {
        "json" => print_json(&plan),
        "csv" => {
            println!("id,action,topic_id,wave,priority,effort,pinned,removed,reasoning");
            for e in &plan.entries {
                let row = [
                    e.id.clone(),
                    e.action.action.to_string(),
                    e.action.topic_id.clone().unwrap_or_default(),
                    e.wave.map(|w| w.to_string()).unwrap_or_default(),
                    e.action.priority.to_string(),
                    e.action.effort.to_string(),
                    e.pinned.to_string(),
                    e.removed.to_string(),
                    e.action.reasoning.clone(),
                ];
                let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
                println!("{}", cells.join(","));
            }
            Ok(())
        }
        other => anyhow::bail!("unknown format '{}'; valid: json, csv", other),
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline,
/// doubling any embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
