use anyhow::Context;
use remap_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing remap in: {}", root.display());

    for dir in [paths::REMAP_DIR, paths::PLANS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let config = Config::new(&project_name);
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: .remap/config.yaml");
    } else {
        println!("  exists:  .remap/config.yaml");
    }

    println!("\nremap initialized.");
    println!("Next: remap inventory import <crawl.yaml>");
    Ok(())
}
