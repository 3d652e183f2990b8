//! `uqlca det` command - deterministic results at the mean emission factors

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::{DataArgs, SimulationArgs};
use crate::cli::helpers::{
    format_value, load_catalog, load_datasets, load_design_options, report_diagnostics,
    resolve_config, truncate_str,
};
use crate::cli::output::{effective_format, print_json, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::deterministic::{self, DeterministicRun};
use crate::entities::impact::{Category, Stage, StageImpacts};

#[derive(Args, Debug)]
pub struct DetArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Design options (JSON); without it only layer results are shown
    #[arg(short = 'd', long)]
    pub designs: Option<PathBuf>,

    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Impact category to display
    #[arg(short = 'c', long, value_enum, default_value_t = CategoryArg::GwpTotal)]
    pub category: CategoryArg,
}

/// Impact category selector
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
    GwpTotal,
    GwpFossil,
    GwpBiogenic,
    GwpLuluc,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::GwpTotal => Category::GwpTotal,
            CategoryArg::GwpFossil => Category::GwpFossil,
            CategoryArg::GwpBiogenic => Category::GwpBiogenic,
            CategoryArg::GwpLuluc => Category::GwpLuluc,
        }
    }
}

pub fn run(args: DetArgs, global: &GlobalOpts) -> Result<()> {
    let config = resolve_config(global, &args.sim)?;
    let catalog = load_catalog(&args.data.layers)?;
    let datasets = load_datasets(&args.data)?;
    let options = match &args.designs {
        Some(path) => load_design_options(path)?,
        None => Vec::new(),
    };

    let runs: Vec<DeterministicRun> = datasets
        .iter()
        .map(|dataset| deterministic::run(&catalog, dataset, &options, &config))
        .collect::<Result<_, _>>()
        .into_diagnostic()?;

    match effective_format(global.format) {
        OutputFormat::Json => print_json(&runs)?,
        _ => {
            let category = Category::from(args.category);
            for run in &runs {
                print_run(run, category);
            }
        }
    }

    for run in &runs {
        report_diagnostics(&run.dataset, &run.diagnostics);
    }

    Ok(())
}

fn stage_row(name: &str, stages: &StageImpacts, category: Category) -> Vec<String> {
    let mut row = vec![truncate_str(name, 32)];
    row.extend(
        Stage::ALL
            .iter()
            .map(|&stage| format_value(stages.get(stage).get(category))),
    );
    row.push(format_value(stages.total().get(category)));
    row
}

fn print_run(run: &DeterministicRun, category: Category) {
    let header = ["Name", "A1", "A2", "A3", "A4", "A5", "A1-A5"];

    println!();
    println!(
        "{} {} - {} per unit of material",
        style("Dataset").bold(),
        style(&run.dataset).cyan().bold(),
        category
    );
    println!(
        "{}",
        render_table(
            &header,
            run.layers
                .iter()
                .map(|l| stage_row(&l.layer, &l.stages, category)),
        )
    );

    if !run.options.is_empty() {
        println!();
        println!("{} per km of road", style("Design options").bold());
        println!(
            "{}",
            render_table(
                &header,
                run.options
                    .iter()
                    .map(|o| stage_row(&o.design_option, &o.stages, category)),
            )
        );
    }
}
