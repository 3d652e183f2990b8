//! Command-line argument definitions

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::commands::{
    compare::CompareArgs, completions::CompletionsArgs, contrib::ContribArgs, det::DetArgs,
    layers::LayersArgs, run::RunArgs,
};
use crate::core::config::{EquipmentPolicy, MissingFactorPolicy};

#[derive(Parser, Debug)]
#[command(name = "uqlca")]
#[command(version, about = "Probabilistic life cycle assessment of road designs (GWP, A1-A5)")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Run configuration file (YAML)
    #[arg(long, global = true, env = "UQLCA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monte Carlo simulation of every design option
    Run(RunArgs),

    /// Monte Carlo simulation of every catalog layer per unit of material
    Layers(LayersArgs),

    /// Deterministic results at the mean emission factors
    Det(DetArgs),

    /// A1 material contribution analysis
    Contrib(ContribArgs),

    /// Kolmogorov-Smirnov comparison between emission factor datasets
    Compare(CompareArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table on a terminal
    #[default]
    Auto,
    Table,
    Json,
    Csv,
}

/// Layer catalog and emission factor datasets
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Layer catalog (JSON)
    #[arg(short = 'l', long)]
    pub layers: PathBuf,

    /// Emission factor dataset as NAME=PATH or PATH (repeatable)
    #[arg(short = 'e', long = "factors", required = true)]
    pub factors: Vec<DatasetSpec>,
}

/// Overrides applied on top of the run configuration
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Number of Monte Carlo iterations
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,

    /// Random seed; generated and logged when absent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Road length in km used for normalization
    #[arg(long)]
    pub road_length: Option<f64>,

    /// How multiple A5 equipment entries are combined
    #[arg(long, value_enum)]
    pub equipment_policy: Option<EquipmentPolicy>,

    /// What to do when a stage has no emission factor
    #[arg(long, value_enum)]
    pub missing_factor: Option<MissingFactorPolicy>,
}

/// A named emission factor file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: Option<String>,
    pub path: PathBuf,
}

impl FromStr for DatasetSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) => {
                let name = name.trim();
                if name.is_empty() || path.is_empty() {
                    return Err(format!("expected NAME=PATH, got '{}'", s));
                }
                Ok(Self {
                    name: Some(name.to_string()),
                    path: PathBuf::from(path),
                })
            }
            None if s.is_empty() => Err("empty dataset path".to_string()),
            None => Ok(Self {
                name: None,
                path: PathBuf::from(s),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dataset_spec_parsing() {
        let named: DatasetSpec = "ecoinvent=data/ei.json".parse().unwrap();
        assert_eq!(named.name.as_deref(), Some("ecoinvent"));
        assert_eq!(named.path, PathBuf::from("data/ei.json"));

        let bare: DatasetSpec = "data/ei.json".parse().unwrap();
        assert_eq!(bare.name, None);

        assert!("=data/ei.json".parse::<DatasetSpec>().is_err());
        assert!("ei=".parse::<DatasetSpec>().is_err());
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "uqlca", "-v", "run", "-l", "layers.json", "-e", "a=a.json", "-e", "b.json",
            "--designs", "designs.json", "-n", "50", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.global.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.data.factors.len(), 2);
                assert_eq!(args.sim.samples, Some(50));
                assert_eq!(args.sim.seed, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
