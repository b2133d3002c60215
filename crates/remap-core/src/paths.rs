use crate::error::{RemapError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const REMAP_DIR: &str = ".remap";
pub const PLANS_DIR: &str = ".remap/plans";

pub const CONFIG_FILE: &str = ".remap/config.yaml";
pub const INVENTORY_FILE: &str = ".remap/inventory.yaml";
pub const TOPICS_FILE: &str = ".remap/topics.yaml";
pub const SIGNALS_FILE: &str = ".remap/signals.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn remap_dir(root: &Path) -> PathBuf {
    root.join(REMAP_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn inventory_path(root: &Path) -> PathBuf {
    root.join(INVENTORY_FILE)
}

pub fn topics_path(root: &Path) -> PathBuf {
    root.join(TOPICS_FILE)
}

pub fn signals_path(root: &Path) -> PathBuf {
    root.join(SIGNALS_FILE)
}

pub fn plan_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(PLANS_DIR).join(slug)
}

pub fn plan_manifest(root: &Path, slug: &str) -> PathBuf {
    plan_dir(root, slug).join(MANIFEST_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(RemapError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        for slug in ["relaunch-2026", "a", "spring-wave-1", "x1"] {
            validate_slug(slug).unwrap_or_else(|_| panic!("expected valid: {slug}"));
        }
    }

    #[test]
    fn invalid_slugs() {
        for slug in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_slug(slug).is_err(), "expected invalid: {slug}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/site");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/site/.remap/config.yaml")
        );
        assert_eq!(
            inventory_path(root),
            PathBuf::from("/tmp/site/.remap/inventory.yaml")
        );
        assert_eq!(
            plan_manifest(root, "relaunch"),
            PathBuf::from("/tmp/site/.remap/plans/relaunch/manifest.yaml")
        );
    }
}
