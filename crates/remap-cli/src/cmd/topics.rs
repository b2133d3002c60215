use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use remap_core::topics::TopicSet;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum TopicsSubcommand {
    /// Import a topic catalog (.yaml/.yml/.json)
    Import { path: PathBuf },
    /// List target topics with kind and tree position
    List,
    /// Check the catalog for duplicate ids, broken parents, and cycles
    Validate,
}

pub fn run(root: &Path, subcmd: TopicsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TopicsSubcommand::Import { path } => import(root, &path, json),
        TopicsSubcommand::List => list(root, json),
        TopicsSubcommand::Validate => validate(root, json),
    }
}

fn import(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let topics = TopicSet::import(root, path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "imported": topics.topics.len(),
            "core": topics.core_count(),
        }))?;
    } else {
        println!(
            "Imported {} topics ({} core) into .remap/topics.yaml",
            topics.topics.len(),
            topics.core_count()
        );
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;

    if json {
        return print_json(&topics.topics);
    }

    if topics.topics.is_empty() {
        println!("No topics imported yet. Run: remap topics import <topics.yaml>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = topics
        .topics
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.kind.to_string(),
                t.parent_id.clone().unwrap_or_default(),
                topics.depth_of(&t.id).to_string(),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "KIND", "PARENT", "DEPTH", "TITLE"], rows);
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let topics = TopicSet::load_or_default(root).context("failed to load topics")?;
    let issues = topics.validate();

    if json {
        print_json(&serde_json::json!({ "issues": issues }))?;
    } else if issues.is_empty() {
        println!(
            "Topic catalog OK ({} topics, {} core).",
            topics.topics.len(),
            topics.core_count()
        );
    } else {
        for issue in &issues {
            println!("[error] {issue}");
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("topic catalog has {} issues", issues.len());
    }
    Ok(())
}
