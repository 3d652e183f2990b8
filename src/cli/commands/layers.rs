//! `uqlca layers` command - per-unit Monte Carlo simulation of catalog layers

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::cli::args::{DataArgs, SimulationArgs};
use crate::cli::helpers::{
    load_catalog, load_datasets, report_diagnostics, resolve_config, resolve_seed,
};
use crate::cli::output::{effective_format, print_csv, print_json, stat_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::aggregate::aggregate_layer_mode;
use crate::core::export::{file_stem, write_json};
use crate::core::sampler::derive_seed;
use crate::core::simulator::Simulator;
use crate::core::statistics::{stage_records, StatRecord};

#[derive(Args, Debug)]
pub struct LayersArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Only show this layer
    #[arg(long)]
    pub layer: Option<String>,

    /// Write `<dataset>_layers.json` to this directory
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct LayerReport {
    dataset: String,
    seed: u64,
    samples: usize,
    records: Vec<StatRecord>,
}

pub fn run(args: LayersArgs, global: &GlobalOpts) -> Result<()> {
    let config = resolve_config(global, &args.sim)?;
    let catalog = load_catalog(&args.data.layers)?;
    let datasets = load_datasets(&args.data)?;

    if let Some(name) = &args.layer {
        if catalog.get(name).is_none() {
            return Err(miette::miette!("Layer '{}' not found in layer catalog", name));
        }
    }

    let simulator = Simulator::new(&catalog, &config).into_diagnostic()?;
    let seed = resolve_seed(&config);

    let mut reports = Vec::with_capacity(datasets.len());
    for (k, dataset) in datasets.iter().enumerate() {
        let run = simulator
            .run_layers(dataset, derive_seed(seed, k as u64))
            .into_diagnostic()?;
        report_diagnostics(&run.dataset, &run.diagnostics);

        let subjects: Vec<_> = aggregate_layer_mode(&run)
            .into_iter()
            .filter(|s| args.layer.as_ref().map_or(true, |name| &s.name == name))
            .collect();
        let records = stage_records(&subjects).into_diagnostic()?;

        reports.push(LayerReport {
            dataset: run.dataset,
            seed: run.seed,
            samples: run.samples,
            records,
        });
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).into_diagnostic()?;
        for report in &reports {
            let path = dir.join(format!("{}_layers.json", file_stem(&report.dataset)));
            write_json(&path, report).into_diagnostic()?;
            eprintln!("{} Wrote {}", style("✓").green(), path.display());
        }
    }

    match effective_format(global.format) {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Csv => {
            let rows: Vec<&StatRecord> = reports.iter().flat_map(|r| r.records.iter()).collect();
            print_csv(&rows)?;
        }
        _ => {
            for report in &reports {
                println!();
                println!(
                    "{} {} ({} iterations, seed {}, per unit of material)",
                    style("Dataset").bold(),
                    style(&report.dataset).cyan().bold(),
                    report.samples,
                    report.seed
                );
                println!("{}", stat_table(&report.records));
            }
        }
    }

    Ok(())
}
