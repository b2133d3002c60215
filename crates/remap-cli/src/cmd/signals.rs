use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use remap_core::inventory::QuerySignalTable;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum SignalsSubcommand {
    /// Import per-URL top search queries (.yaml/.yml/.json)
    Import { path: PathBuf },
}

pub fn run(root: &Path, subcmd: SignalsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SignalsSubcommand::Import { path } => import(root, &path, json),
    }
}

fn import(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let table = QuerySignalTable::import(root, path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "urls": table.urls.len() }))?;
    } else {
        println!(
            "Imported query signals for {} urls (top {} kept per url)",
            table.urls.len(),
            QuerySignalTable::MAX_QUERIES_PER_URL
        );
    }
    Ok(())
}
