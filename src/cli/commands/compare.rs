//! `uqlca compare` command - K-S comparison of overall results between datasets

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::{DataArgs, SimulationArgs};
use crate::cli::commands::run::simulate_all;
use crate::cli::helpers::{
    load_catalog, load_datasets, load_design_options, report_diagnostics, resolve_config,
};
use crate::cli::output::{effective_format, print_json, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::ks::{compare_datasets, CategoryComparison, DEFAULT_ALPHA};

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Design options (JSON)
    #[arg(short = 'd', long)]
    pub designs: PathBuf,

    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,
}

pub fn run(args: CompareArgs, global: &GlobalOpts) -> Result<()> {
    if args.data.factors.len() < 2 {
        return Err(miette::miette!(
            "compare needs at least two datasets (repeat --factors)"
        ));
    }

    let config = resolve_config(global, &args.sim)?;
    let catalog = load_catalog(&args.data.layers)?;
    let options = load_design_options(&args.designs)?;
    let datasets = load_datasets(&args.data)?;

    let outcomes = simulate_all(&catalog, &datasets, &options, &config, false)?;
    for outcome in &outcomes {
        report_diagnostics(&outcome.run.dataset, &outcome.run.diagnostics);
    }

    let pooled: Vec<_> = outcomes
        .into_iter()
        .map(|o| (o.run.dataset, o.samples))
        .collect();
    let comparisons = compare_datasets(&pooled, args.alpha).into_diagnostic()?;

    match effective_format(global.format) {
        OutputFormat::Json => print_json(&comparisons)?,
        _ => print_comparisons(&comparisons, &pooled[0].0, args.alpha),
    }

    Ok(())
}

fn print_comparisons(comparisons: &[CategoryComparison], reference: &str, alpha: f64) {
    println!();
    println!(
        "{} against {} (alpha = {})",
        style("Kolmogorov-Smirnov").bold(),
        style(reference).cyan().bold(),
        alpha
    );
    println!(
        "{}",
        render_table(
            &["Category", "Sum of D", "Min p-value", "Result"],
            comparisons.iter().map(|c| {
                let verdict = if c.significant {
                    style("significant").red().to_string()
                } else {
                    style("not significant").green().to_string()
                };
                vec![
                    c.category.to_string(),
                    format!("{:.4}", c.statistic),
                    format!("{:.4}", c.p_value),
                    verdict,
                ]
            }),
        )
    );

    for comparison in comparisons {
        for pair in &comparison.pairs {
            println!(
                "   {} {} vs {}: D = {:.4}, p = {:.4}",
                style(comparison.category).dim(),
                pair.reference,
                pair.other,
                pair.result.statistic,
                pair.result.p_value
            );
        }
    }
}
