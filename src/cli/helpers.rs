//! Shared helper functions for CLI commands
//!
//! Input loading, configuration resolution and diagnostics reporting used by
//! every command.

use console::style;
use miette::{IntoDiagnostic, Result};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use crate::cli::args::{DataArgs, GlobalOpts, SimulationArgs};
use crate::core::config::RunConfig;
use crate::core::diagnostic::Diagnostic;
use crate::core::loader;
use crate::entities::design::DesignOption;
use crate::entities::factor::EmissionDataset;
use crate::entities::layer::LayerCatalog;

/// Configuration file (if any) with command-line overrides applied
pub fn resolve_config(global: &GlobalOpts, sim: &SimulationArgs) -> Result<RunConfig> {
    let mut config = match &global.config {
        Some(path) => RunConfig::load(path)
            .map_err(|e| miette::miette!("Failed to load config {}: {}", path.display(), e))?,
        None => RunConfig::with_defaults(),
    };

    if let Some(samples) = sim.samples {
        config.samples = samples;
    }
    if let Some(seed) = sim.seed {
        config.seed = Some(seed);
    }
    if let Some(road_length) = sim.road_length {
        config.road_length = road_length;
    }
    if let Some(policy) = sim.equipment_policy {
        config.equipment_policy = policy;
    }
    if let Some(policy) = sim.missing_factor {
        config.missing_factor_policy = policy;
    }

    config.validate().into_diagnostic()?;
    Ok(config)
}

/// The configured seed, or a fresh one that is logged so the run can be repeated
pub fn resolve_seed(config: &RunConfig) -> u64 {
    match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::rng().random::<u64>();
            info!(seed, "no seed given, generated one");
            seed
        }
    }
}

pub fn load_catalog(path: &Path) -> Result<LayerCatalog> {
    loader::load_layers(path).into_diagnostic()
}

pub fn load_design_options(path: &Path) -> Result<Vec<DesignOption>> {
    loader::load_design_options(path).into_diagnostic()
}

/// Load every dataset; names must be unique
pub fn load_datasets(data: &DataArgs) -> Result<Vec<EmissionDataset>> {
    let mut seen = HashSet::new();
    let mut datasets = Vec::with_capacity(data.factors.len());

    for spec in &data.factors {
        let dataset = loader::load_dataset(&spec.path, spec.name.as_deref()).into_diagnostic()?;
        if !seen.insert(dataset.name.clone()) {
            return Err(miette::miette!(
                "Dataset name '{}' given twice; use NAME=PATH to disambiguate",
                dataset.name
            ));
        }
        datasets.push(dataset);
    }

    Ok(datasets)
}

/// Print a one-line summary of diagnostics per kind to stderr
///
/// Each diagnostic was already logged when it was raised.
pub fn report_diagnostics(dataset: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for diagnostic in diagnostics {
        let kind = match diagnostic {
            Diagnostic::MissingFactor { .. } => "missing factors",
            Diagnostic::UndefinedStage { .. } => "undefined stages",
            Diagnostic::UnmatchedLayer { .. } => "unmatched layers",
            Diagnostic::EmptyDesignOption { .. } => "empty design options",
        };
        *counts.entry(kind).or_default() += 1;
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(kind, count)| format!("{} {}", count, kind))
        .collect();
    eprintln!(
        "{} {}: {} (run with -v for details)",
        style("!").yellow(),
        style(dataset).cyan(),
        summary.join(", ")
    );
}

/// Format a result value with precision that suits its magnitude
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if magnitude >= 1.0e6 || magnitude < 1.0e-3 {
        format!("{:.3e}", value)
    } else if magnitude >= 100.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
