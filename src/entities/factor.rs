//! Emission factors and lookup
//!
//! A background dataset (ecoinvent, national database, EPDs, ...) is a list of
//! [`EmissionFactor`]s with a mean per GWP channel and a shared coefficient of
//! variation. A Monte Carlo draw turns it into [`SampledEmissionFactor`]s.
//! Both shapes are wrapped in [`Factor`] and looked up through a [`FactorSet`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::error::{LcaError, Result};
use crate::entities::impact::{Category, Impact};

/// Emission factor with uncertainty, as read from a background dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Material or energy carrier key (matched case-insensitively)
    pub material: String,

    #[serde(default)]
    pub mean_total: f64,

    #[serde(default)]
    pub mean_fossil: f64,

    #[serde(default)]
    pub mean_biogenic: f64,

    #[serde(default)]
    pub mean_luluc: f64,

    /// Coefficient of variation, shared by all four channels
    #[serde(default)]
    pub cov: f64,

    pub unit: String,
}

impl EmissionFactor {
    pub fn new(material: impl Into<String>, means: Impact, cov: f64, unit: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            mean_total: means.gwp_total,
            mean_fossil: means.gwp_fossil,
            mean_biogenic: means.gwp_biogenic,
            mean_luluc: means.gwp_luluc,
            cov,
            unit: unit.into(),
        }
    }

    pub fn means(&self) -> Impact {
        Impact::new(
            self.mean_total,
            self.mean_fossil,
            self.mean_biogenic,
            self.mean_luluc,
        )
    }

    pub fn mean(&self, channel: Category) -> f64 {
        self.means().get(channel)
    }
}

/// One concrete Monte Carlo draw of an emission factor, valid for one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledEmissionFactor {
    pub material: String,
    pub values: Impact,
    pub unit: String,
}

/// Either shape of emission factor; both answer the same lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    /// Dataset factor, evaluated at its mean
    Base(EmissionFactor),
    /// Sampled factor for a single iteration
    Sampled(SampledEmissionFactor),
}

impl Factor {
    pub fn key(&self) -> &str {
        match self {
            Factor::Base(ef) => &ef.material,
            Factor::Sampled(sf) => &sf.material,
        }
    }

    /// Impact per unit of input
    pub fn values(&self) -> Impact {
        match self {
            Factor::Base(ef) => ef.means(),
            Factor::Sampled(sf) => sf.values,
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            Factor::Base(ef) => &ef.unit,
            Factor::Sampled(sf) => &sf.unit,
        }
    }

    /// Coefficient of variation (sampled factors carry none)
    pub fn cov(&self) -> Option<f64> {
        match self {
            Factor::Base(ef) => Some(ef.cov),
            Factor::Sampled(_) => None,
        }
    }
}

/// A named background dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionDataset {
    pub name: String,
    pub factors: Vec<EmissionFactor>,
}

impl EmissionDataset {
    pub fn new(name: impl Into<String>, factors: Vec<EmissionFactor>) -> Self {
        Self {
            name: name.into(),
            factors,
        }
    }

    /// Build the case-insensitive key index, rejecting colliding keys
    pub fn index(&self) -> Result<FactorIndex> {
        FactorIndex::new(&self.name, self.factors.iter().map(|ef| ef.material.as_str()))
    }
}

/// Case-insensitive key → position map, built once per dataset
///
/// Positions follow the dataset order, which is also the column order of the
/// sample matrix (four columns per factor).
#[derive(Debug, Clone, Default)]
pub struct FactorIndex {
    positions: HashMap<String, usize>,
}

impl FactorIndex {
    pub fn new<'a>(dataset: &str, keys: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut positions = HashMap::new();
        for (pos, key) in keys.into_iter().enumerate() {
            if positions.insert(normalize_key(key), pos).is_some() {
                return Err(LcaError::DuplicateFactor {
                    dataset: dataset.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(Self { positions })
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(&normalize_key(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// The emission factors active for one computation
///
/// Either the dataset means (deterministic runs) or one Monte Carlo draw.
#[derive(Debug, Clone)]
pub struct FactorSet<'a> {
    index: &'a FactorIndex,
    factors: Vec<Factor>,
}

impl<'a> FactorSet<'a> {
    /// Dataset factors at their means
    pub fn base(index: &'a FactorIndex, factors: &[EmissionFactor]) -> Self {
        Self {
            index,
            factors: factors.iter().cloned().map(Factor::Base).collect(),
        }
    }

    /// One iteration's draw, in dataset order
    pub fn sampled(index: &'a FactorIndex, factors: Vec<SampledEmissionFactor>) -> Self {
        Self {
            index,
            factors: factors.into_iter().map(Factor::Sampled).collect(),
        }
    }

    /// Look up a factor by key (case-insensitive)
    pub fn lookup(&self, key: &str) -> Option<&Factor> {
        self.index
            .position(key)
            .and_then(|pos| self.factors.get(pos))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
