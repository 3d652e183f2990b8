//! Core module - simulation engine, statistics and file boundaries

pub mod aggregate;
pub mod config;
pub mod contribution;
pub mod deterministic;
pub mod diagnostic;
pub mod distribution;
pub mod error;
pub mod export;
pub mod ks;
pub mod loader;
pub mod sampler;
pub mod simulator;
pub mod stages;
pub mod statistics;

pub use aggregate::{aggregate_dataset, aggregate_layer_mode, CategorySamples, OptionSamples};
pub use config::{EquipmentPolicy, MissingFactorPolicy, PhysicalConstants, RunConfig};
pub use contribution::{a1_contributions, MaterialShare, OptionContribution};
pub use deterministic::{DesignOptionResult, DeterministicRun, LayerResult};
pub use diagnostic::Diagnostic;
pub use distribution::FactorDistribution;
pub use error::{LcaError, Result};
pub use ks::{compare_datasets, ks_two_sample, CategoryComparison, KsResult};
pub use sampler::{SampleMatrix, Sampler};
pub use simulator::{DatasetRun, DesignOptionRun, LayerModeRun, LayerSamples, Simulator};
pub use stages::{Geometry, StageCalculator};
pub use statistics::{overall_records, stage_records, StatRecord, Summary, UNIT};
