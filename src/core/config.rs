//! Run configuration
//!
//! Physical constants and Monte Carlo settings are passed explicitly to every
//! entry point, so concurrent runs with different constants never interfere.
//! A YAML file can provide any subset of the values; the rest default.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{LcaError, Result};

/// Truck transport and site constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Diesel consumption of a fully loaded truck, kg/km
    pub fuel_consumption_rate: f64,

    /// Actual payload per trip, kg
    pub actual_load: f64,

    /// Truck load capacity, kg
    pub load_capacity: f64,

    /// Share of trips returning empty (0-1)
    pub empty_return_rate: f64,

    /// Reference paved surface of the site, m2
    pub reference_area: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            fuel_consumption_rate: 0.359,
            actual_load: 22000.0,
            load_capacity: 22000.0,
            empty_return_rate: 1.0,
            reference_area: 113970.0,
        }
    }
}

impl PhysicalConstants {
    /// Load-dependent trip factor: 1/3·(load/capacity) + 2/3 + 2/3·empty_return
    pub fn trip_factor(&self) -> f64 {
        (1.0 / 3.0) * (self.actual_load / self.load_capacity)
            + 2.0 / 3.0
            + (2.0 / 3.0) * self.empty_return_rate
    }
}

/// How A5 treats layers with several machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentPolicy {
    /// Sum the contribution of every machine
    #[default]
    SumAll,
    /// Only the first machine in the list counts (legacy results)
    FirstOnly,
}

/// What to do when a stage has no emission factor at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFactorPolicy {
    /// Count the stage as zero and report a diagnostic
    #[default]
    Zero,
    /// Abort the run
    Abort,
}

/// Monte Carlo run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of Monte Carlo iterations
    pub samples: usize,

    /// RNG seed; a random one is chosen (and logged) when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Road length in km, the functional unit
    pub road_length: f64,

    pub physical: PhysicalConstants,

    pub equipment_policy: EquipmentPolicy,

    pub missing_factor_policy: MissingFactorPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RunConfig {
    pub fn with_defaults() -> Self {
        Self {
            samples: 1000,
            seed: None,
            road_length: 3.39,
            physical: PhysicalConstants::default(),
            equipment_policy: EquipmentPolicy::default(),
            missing_factor_policy: MissingFactorPolicy::default(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content).map_err(|e| LcaError::Parse {
            what: "run configuration".to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject values that would poison every result
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(LcaError::InvalidConfig(
                "sample count must be at least 1".to_string(),
            ));
        }
        check_positive("road_length", self.road_length)?;
        check_positive("load_capacity", self.physical.load_capacity)?;
        check_positive("reference_area", self.physical.reference_area)?;
        check_non_negative("fuel_consumption_rate", self.physical.fuel_consumption_rate)?;
        check_non_negative("actual_load", self.physical.actual_load)?;
        check_non_negative("empty_return_rate", self.physical.empty_return_rate)?;
        Ok(())
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LcaError::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LcaError::InvalidConfig(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}
