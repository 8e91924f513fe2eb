use std::path::{Path, PathBuf};

use crate::{results::Pattern, series::ItemCountSummary};

/// `<tag>: <desc> (<items> items)`, items omitted for a pattern without runs.
pub fn chart_title(tag: &str, pattern: &Pattern) -> String {
    match ItemCountSummary::of(pattern) {
        Some(items) => format!("{tag}: {} ({items} items)", pattern.desc),
        None => format!("{tag}: {}", pattern.desc),
    }
}

pub fn output_path(results_dir: &Path, pattern_name: &str, tag: &str) -> PathBuf {
    results_dir.join(format!("{pattern_name}_{tag}.png"))
}
