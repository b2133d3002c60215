use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `REMAP_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.remap/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    walk_up(&cwd, ".remap")
        .or_else(|| walk_up(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn walk_up(from: &Path, marker: &str) -> Option<PathBuf> {
    let mut dir = from.to_path_buf();
    loop {
        if dir.join(marker).is_dir() {
            return Some(dir);
        }
        dir = dir.parent()?.to_path_buf();
    }
}
