//! `uqlca contrib` command - A1 material contribution analysis

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::{DataArgs, SimulationArgs};
use crate::cli::helpers::{
    format_value, load_catalog, load_datasets, load_design_options, report_diagnostics,
    resolve_config,
};
use crate::cli::output::{effective_format, print_json, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::contribution::{a1_contributions, OptionContribution};

#[derive(Args, Debug)]
pub struct ContribArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Design options (JSON)
    #[arg(short = 'd', long)]
    pub designs: PathBuf,

    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Hide materials below this share (%)
    #[arg(long, default_value_t = 0.0)]
    pub min_percent: f64,
}

pub fn run(args: ContribArgs, global: &GlobalOpts) -> Result<()> {
    let config = resolve_config(global, &args.sim)?;
    let catalog = load_catalog(&args.data.layers)?;
    let options = load_design_options(&args.designs)?;
    let datasets = load_datasets(&args.data)?;

    let mut contributions: Vec<OptionContribution> = Vec::new();
    for dataset in &datasets {
        let (results, diagnostics) =
            a1_contributions(&catalog, dataset, &options, config.physical.reference_area)
                .into_diagnostic()?;
        report_diagnostics(&dataset.name, &diagnostics);
        contributions.extend(results);
    }

    match effective_format(global.format) {
        OutputFormat::Json => print_json(&contributions)?,
        _ => {
            for contribution in &contributions {
                print_contribution(contribution, args.min_percent);
            }
        }
    }

    Ok(())
}

fn print_contribution(contribution: &OptionContribution, min_percent: f64) {
    let mut shares: Vec<_> = contribution
        .shares
        .iter()
        .filter(|s| s.percent >= min_percent)
        .collect();
    shares.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    println!();
    println!(
        "{} {} / {}",
        style("A1 contributions").bold(),
        style(&contribution.dataset).cyan(),
        style(&contribution.design_option).cyan().bold()
    );
    println!(
        "{}",
        render_table(
            &["Material", "Share (%)", "Weight"],
            shares.iter().map(|s| {
                vec![
                    s.material.clone(),
                    format!("{:.1}", s.percent),
                    format_value(s.weight),
                ]
            }),
        )
    );
}
