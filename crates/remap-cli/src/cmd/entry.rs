use crate::output::print_json;
use clap::Subcommand;
use remap_core::plan::MigrationPlan;
use std::path::Path;

#[derive(Subcommand)]
pub enum EntrySubcommand {
    /// Drop an entry from the plan (kept in the manifest, excluded from waves)
    Remove { plan: String, entry_id: String },
    /// Bring a removed entry back
    Restore { plan: String, entry_id: String },
    /// Pin an entry so regeneration and rebalance keep its wave
    Pin { plan: String, entry_id: String },
    /// Release a pinned entry
    Unpin { plan: String, entry_id: String },
}

pub fn run(root: &Path, subcmd: EntrySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        EntrySubcommand::Remove { plan, entry_id } => {
            mutate(root, &plan, &entry_id, "removed", json, |p, id| {
                p.remove_entry(id)
            })
        }
        EntrySubcommand::Restore { plan, entry_id } => {
            mutate(root, &plan, &entry_id, "restored", json, |p, id| {
                p.restore_entry(id)
            })
        }
        EntrySubcommand::Pin { plan, entry_id } => {
            mutate(root, &plan, &entry_id, "pinned", json, |p, id| {
                p.pin_entry(id)
            })
        }
        EntrySubcommand::Unpin { plan, entry_id } => {
            mutate(root, &plan, &entry_id, "unpinned", json, |p, id| {
                p.unpin_entry(id)
            })
        }
    }
}

fn mutate(
    root: &Path,
    slug: &str,
    entry_id: &str,
    verb: &str,
    json: bool,
    apply: impl Fn(&mut MigrationPlan, &str) -> remap_core::Result<()>,
) -> anyhow::Result<()> {
    let mut plan = MigrationPlan::load(root, slug)?;
    apply(&mut plan, entry_id)?;
    plan.save(root)?;

    if json {
        print_json(&serde_json::json!({
            "plan": slug,
            "entry_id": entry_id,
            "result": verb,
        }))?;
    } else {
        println!("Entry '{entry_id}' {verb} in plan '{slug}'.");
    }
    Ok(())
}
