//! Design options - road cross-sections built from layer instances

use serde::{Deserialize, Serialize};

/// A layer as used in one design option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerType {
    /// Name of the catalog layer
    pub name: String,

    /// Thickness in m
    pub thickness: f64,

    /// Quantity in t
    #[serde(default)]
    pub quantity: f64,

    /// Density in t/m3
    pub density: f64,
}

impl LayerType {
    pub fn new(name: impl Into<String>, thickness: f64, density: f64) -> Self {
        Self {
            name: name.into(),
            thickness,
            quantity: 0.0,
            density,
        }
    }
}

/// A road cross-section to compare against alternatives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignOption {
    pub name: String,

    #[serde(rename = "layer_type")]
    pub layers: Vec<LayerType>,
}

impl DesignOption {
    pub fn new(name: impl Into<String>, layers: Vec<LayerType>) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }
}
