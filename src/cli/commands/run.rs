//! `uqlca run` command - Monte Carlo simulation of design options

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::args::{DataArgs, SimulationArgs};
use crate::cli::helpers::{
    load_catalog, load_datasets, load_design_options, report_diagnostics, resolve_config,
    resolve_seed,
};
use crate::cli::output::{effective_format, print_csv, print_json, stat_table};
use crate::cli::viz::render_histogram;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::aggregate::{aggregate_dataset, OptionSamples};
use crate::core::config::RunConfig;
use crate::core::export::{write_overall_csv, write_results, write_samples, SamplesEnvelope};
use crate::core::sampler::derive_seed;
use crate::core::simulator::{DatasetRun, Simulator};
use crate::core::statistics::{overall_records, stage_records, StatRecord, Summary, OVERALL_STAGE};
use crate::entities::design::DesignOption;
use crate::entities::factor::EmissionDataset;
use crate::entities::impact::Category;
use crate::entities::layer::LayerCatalog;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Design options (JSON)
    #[arg(short = 'd', long)]
    pub designs: PathBuf,

    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Write results, samples and CSV files to this directory
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Also list per-stage statistics
    #[arg(long)]
    pub stages: bool,

    /// Print a histogram of each design option's overall gwp_total
    #[arg(long)]
    pub histogram: bool,

    /// Histogram bins
    #[arg(long, default_value_t = 20)]
    pub bins: usize,
}

/// Simulation outcome of one dataset, ready for display and export
pub struct DatasetOutcome {
    pub run: DatasetRun,
    pub samples: Vec<OptionSamples>,
    pub records: Vec<StatRecord>,
}

/// Simulate every dataset with its own derived seed
pub fn simulate_all(
    catalog: &LayerCatalog,
    datasets: &[EmissionDataset],
    options: &[DesignOption],
    config: &RunConfig,
    with_stages: bool,
) -> Result<Vec<DatasetOutcome>> {
    let simulator = Simulator::new(catalog, config).into_diagnostic()?;
    let seed = resolve_seed(config);
    info!(seed, datasets = datasets.len(), "simulation seed");

    let mut outcomes = Vec::with_capacity(datasets.len());
    for (k, dataset) in datasets.iter().enumerate() {
        let run = simulator
            .run_design_options(dataset, options, derive_seed(seed, k as u64))
            .into_diagnostic()?;
        let samples = aggregate_dataset(&run);

        let mut records = Vec::new();
        if with_stages {
            records.extend(stage_records(&samples).into_diagnostic()?);
        }
        records.extend(overall_records(&samples).into_diagnostic()?);

        outcomes.push(DatasetOutcome {
            run,
            samples,
            records,
        });
    }
    Ok(outcomes)
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let config = resolve_config(global, &args.sim)?;
    let catalog = load_catalog(&args.data.layers)?;
    let options = load_design_options(&args.designs)?;
    let datasets = load_datasets(&args.data)?;

    // exports always carry the per-stage records
    let with_stages = args.stages || args.output_dir.is_some();
    let outcomes = simulate_all(&catalog, &datasets, &options, &config, with_stages)?;

    if let Some(dir) = &args.output_dir {
        export(dir, &outcomes)?;
    }

    match effective_format(global.format) {
        OutputFormat::Json => {
            let by_dataset: BTreeMap<&str, &[StatRecord]> = outcomes
                .iter()
                .map(|o| (o.run.dataset.as_str(), o.records.as_slice()))
                .collect();
            print_json(&by_dataset)?;
        }
        OutputFormat::Csv => {
            let rows: Vec<&StatRecord> = outcomes.iter().flat_map(|o| o.records.iter()).collect();
            print_csv(&rows)?;
        }
        _ => {
            for outcome in &outcomes {
                print_outcome(outcome, &args);
            }
        }
    }

    for outcome in &outcomes {
        report_diagnostics(&outcome.run.dataset, &outcome.run.diagnostics);
    }

    Ok(())
}

fn print_outcome(outcome: &DatasetOutcome, args: &RunArgs) {
    println!();
    println!(
        "{} {} ({} iterations, seed {})",
        style("Dataset").bold(),
        style(&outcome.run.dataset).cyan().bold(),
        outcome.run.samples,
        outcome.run.seed
    );

    let shown: Vec<StatRecord> = if args.stages {
        outcome.records.clone()
    } else {
        outcome
            .records
            .iter()
            .filter(|r| r.stage == OVERALL_STAGE)
            .cloned()
            .collect()
    };
    println!("{}", stat_table(&shown));

    if args.histogram {
        for option in &outcome.samples {
            let samples = option.overall(Category::GwpTotal);
            if let Ok(summary) = Summary::from_samples(samples) {
                println!();
                println!(
                    "{}",
                    render_histogram(&option.name, samples, args.bins, summary.mean, summary.p95)
                );
            }
        }
    }
}

fn export(dir: &Path, outcomes: &[DatasetOutcome]) -> Result<()> {
    fs::create_dir_all(dir).into_diagnostic()?;

    for outcome in outcomes {
        let dataset = &outcome.run.dataset;
        let results = write_results(dir, dataset, &outcome.records).into_diagnostic()?;
        let envelope =
            SamplesEnvelope::new(dataset, outcome.run.seed, outcome.run.samples, &outcome.samples);
        let samples = write_samples(dir, &envelope).into_diagnostic()?;
        let csv = write_overall_csv(dir, dataset, &outcome.samples).into_diagnostic()?;

        for path in [results, samples, csv] {
            eprintln!("{} Wrote {}", style("✓").green(), path.display());
        }
    }
    Ok(())
}
