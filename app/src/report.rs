use std::path::{Path, PathBuf};

use common::{
    ReportError,
    config::ChartSettings,
    plot::{ChartSpec, render_chart},
    results::{Pattern, ResultsDocument},
    series::{ItemCountSummary, load_pattern},
    util::{chart_title, output_path},
};
use eyre::{Context, Result};
use tokio::fs::{read, read_to_string};
use tracing::{debug, info, warn};

pub async fn load_settings(
    config_file: Option<&Path>,
    results_dir: Option<PathBuf>,
) -> Result<ChartSettings> {
    let mut settings = match config_file {
        Some(path) => {
            let text = read_to_string(path)
                .await
                .map_err(|source| ReportError::Io {
                    path: path.to_owned(),
                    source,
                })?;
            ChartSettings::from_yaml(&text)
                .wrap_err_with(|| format!("Loading chart settings from {}", path.display()))?
        }
        None => ChartSettings::default(),
    };
    if let Some(dir) = results_dir {
        settings.results_dir = dir;
    }
    debug!("Chart settings: {settings:?}");
    Ok(settings)
}

/// Plots every pattern of `json_file`, or only `pattern_<only>` when given.
pub async fn run(
    tag: &str,
    json_file: &Path,
    only: Option<usize>,
    settings: &ChartSettings,
) -> Result<()> {
    println!("Parsing '{}'...", json_file.display());
    let bytes = read(json_file)
        .await
        .map_err(|source| ReportError::Io {
            path: json_file.to_owned(),
            source,
        })?;
    let document = ResultsDocument::from_json(&bytes, json_file)?;
    if let Some(timing_type) = &document.timing_type {
        info!("Timing source: {timing_type}");
    }
    // `timing_type` is not a pattern and is left out of the count
    println!("Found {} patterns", document.patterns.len());

    let patterns: Vec<&Pattern> = match only {
        Some(index) => {
            let name = format!("pattern_{index}");
            let pattern = document
                .pattern(&name)
                .ok_or(ReportError::UnknownPattern(name))?;
            vec![pattern]
        }
        None => document.patterns.iter().collect(),
    };

    for pattern in patterns {
        let path = plot_pattern(tag, pattern, settings)
            .wrap_err_with(|| format!("Plotting {}", pattern.name))?;
        info!("{} done: {}", pattern.name, path.display());
    }
    Ok(())
}

fn plot_pattern(tag: &str, pattern: &Pattern, settings: &ChartSettings) -> common::Result<PathBuf> {
    println!(
        " ...pattern {}: found {} runs",
        pattern.name,
        pattern.runs.len()
    );
    if let Some(items) = ItemCountSummary::of(pattern)
        && !items.is_uniform()
    {
        warn!("{}: num_items varies across runs {items}", pattern.name);
    }

    let title = chart_title(tag, pattern);
    let path = output_path(&settings.results_dir, &pattern.name, tag);
    let series = load_pattern(pattern);
    let spec = ChartSpec::new(&series, &title, settings)?;

    println!("Writing plot into '{}'", path.display());
    render_chart(&path, &spec)?;
    Ok(path)
}
