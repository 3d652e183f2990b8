//! Layer entity - a reusable material layer type (e.g. asphalt binder course)
//!
//! A layer carries everything the stage calculators need that does not depend
//! on a particular design option: mix composition and A2 transport data, A3
//! plant energy, A4 haul distance and A5 construction equipment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{LcaError, Result};

/// A mix constituent of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Emission factor key
    pub name: String,

    /// Mass fraction in the mix (0-1)
    pub composition: f64,

    /// Raw material transport distance in km (A2)
    pub transport_distance_a2: f64,

    /// Transported mass in kg (A2)
    pub mass_a2: f64,
}

/// Productivity unit of a construction machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductivityUnit {
    /// Tons per hour
    TonsPerHour,
    /// Square metres per hour
    SquareMetresPerHour,
    /// Cubic metres per hour
    CubicMetresPerHour,
}

impl FromStr for ProductivityUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "t/h" => Ok(ProductivityUnit::TonsPerHour),
            "m2/h" | "m²/h" => Ok(ProductivityUnit::SquareMetresPerHour),
            "m3/h" | "m³/h" => Ok(ProductivityUnit::CubicMetresPerHour),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ProductivityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductivityUnit::TonsPerHour => write!(f, "t/h"),
            ProductivityUnit::SquareMetresPerHour => write!(f, "m2/h"),
            ProductivityUnit::CubicMetresPerHour => write!(f, "m3/h"),
        }
    }
}

/// Construction equipment used to place a layer (A5)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,

    /// Number of machines working in parallel
    #[serde(rename = "number")]
    pub count: u32,

    /// Output per hour, in `productivity_unit`
    pub productivity: f64,

    /// "t/h", "m2/h" or "m3/h"
    pub productivity_unit: String,

    /// Emission factor key of the energy carrier (diesel, electricity, ...)
    pub energy_type: String,

    /// Energy use per hour (L/h, kWh/h)
    pub energy: f64,

    pub energy_unit: String,
}

impl Equipment {
    /// Parse the productivity unit, naming the offending layer on failure
    pub fn unit(&self, layer: &str) -> Result<ProductivityUnit> {
        self.productivity_unit
            .parse()
            .map_err(|unit| LcaError::UnsupportedProductivityUnit {
                layer: layer.to_string(),
                equipment: self.name.clone(),
                unit,
            })
    }

    /// Energy per unit of output, shared over `count` machines
    pub fn energy_per_unit(&self) -> f64 {
        self.energy / (self.productivity * f64::from(self.count))
    }
}

/// Reusable layer type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique layer name
    pub name: String,

    pub abbreviation: String,

    pub materials: Vec<Material>,

    /// Emission factor key of the plant energy (A3)
    #[serde(rename = "energy_used_a3")]
    pub energy_type_a3: String,

    /// Plant energy per ton of product (A3)
    pub energy_consumption_a3: f64,

    /// Haul distance plant → site in km (A4)
    pub transport_distance_a4: f64,

    /// Reference hauled mass in t (A4)
    #[serde(default)]
    pub mass_a4: f64,

    /// Construction equipment (A5)
    #[serde(rename = "construction_a5", default)]
    pub equipment: Vec<Equipment>,

    #[serde(default)]
    pub quantity_a5_ton: f64,

    #[serde(default)]
    pub quantity_a5_m2: f64,

    /// Default density in t/m3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    /// Default thickness in m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

impl Layer {
    /// Check equipment data before any sampling happens
    pub fn validate(&self) -> Result<()> {
        for equipment in &self.equipment {
            equipment.unit(&self.name)?;

            if equipment.count == 0 {
                return Err(LcaError::InvalidEquipment {
                    layer: self.name.clone(),
                    equipment: equipment.name.clone(),
                    reason: "number of machines must be at least 1".to_string(),
                });
            }
            if !(equipment.productivity.is_finite() && equipment.productivity > 0.0) {
                return Err(LcaError::InvalidEquipment {
                    layer: self.name.clone(),
                    equipment: equipment.name.clone(),
                    reason: format!("productivity must be positive, got {}", equipment.productivity),
                });
            }
        }
        Ok(())
    }
}

/// Layers by name
#[derive(Debug, Clone, Default)]
pub struct LayerCatalog {
    layers: Vec<Layer>,
    by_name: HashMap<String, usize>,
}

impl LayerCatalog {
    /// Build a catalog, rejecting duplicate names and invalid equipment
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (i, layer) in layers.iter().enumerate() {
            layer.validate()?;
            if by_name.insert(layer.name.clone(), i).is_some() {
                return Err(LcaError::DuplicateLayer(layer.name.clone()));
            }
        }
        Ok(Self { layers, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.by_name.get(name).map(|&i| &self.layers[i])
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paver(unit: &str) -> Equipment {
        Equipment {
            name: "Paver".into(),
            count: 1,
            productivity: 200.0,
            productivity_unit: unit.into(),
            energy_type: "diesel".into(),
            energy: 20.0,
            energy_unit: "L/h".into(),
        }
    }

    fn layer(name: &str, equipment: Vec<Equipment>) -> Layer {
        Layer {
            name: name.into(),
            abbreviation: "AC".into(),
            materials: vec![],
            energy_type_a3: "thermal_energy".into(),
            energy_consumption_a3: 300.0,
            transport_distance_a4: 25.0,
            mass_a4: 1.0,
            equipment,
            quantity_a5_ton: 1.0,
            quantity_a5_m2: 1.0,
            density: Some(2.4),
            thickness: Some(0.04),
        }
    }

    #[test]
    fn test_productivity_unit_parsing() {
        assert_eq!("t/h".parse(), Ok(ProductivityUnit::TonsPerHour));
        assert_eq!("m²/h".parse(), Ok(ProductivityUnit::SquareMetresPerHour));
        assert_eq!("m3/h".parse(), Ok(ProductivityUnit::CubicMetresPerHour));
        assert!("kg/h".parse::<ProductivityUnit>().is_err());
    }

    #[test]
    fn test_catalog_rejects_unsupported_unit() {
        let err = LayerCatalog::new(vec![layer("Surface", vec![paver("l/h")])]).unwrap_err();
        match err {
            LcaError::UnsupportedProductivityUnit { layer, equipment, unit } => {
                assert_eq!(layer, "Surface");
                assert_eq!(equipment, "Paver");
                assert_eq!(unit, "l/h");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_zero_count() {
        let err = LayerCatalog::new(vec![layer("A", vec![]), layer("A", vec![])]).unwrap_err();
        assert!(matches!(err, LcaError::DuplicateLayer(name) if name == "A"));

        let mut idle = paver("t/h");
        idle.count = 0;
        assert!(LayerCatalog::new(vec![layer("B", vec![idle])]).is_err());
    }

    #[test]
    fn test_layer_json_field_names() {
        let json = r#"{
            "name": "Binder",
            "abbreviation": "AC B",
            "materials": [
                {"name": "bitumen", "composition": 0.045, "transport_distance_a2": 150, "mass_a2": 45}
            ],
            "energy_used_a3": "thermal_energy",
            "energy_consumption_a3": 280,
            "transport_distance_a4": 30,
            "mass_a4": 1,
            "construction_a5": [
                {"name": "Roller", "number": 2, "productivity": 1500, "productivity_unit": "m2/h",
                 "energy_type": "diesel", "energy": 12, "energy_unit": "L/h"}
            ],
            "quantity_a5_ton": 1,
            "quantity_a5_m2": 1,
            "density": 2.45,
            "thickness": null
        }"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.energy_type_a3, "thermal_energy");
        assert_eq!(layer.equipment[0].count, 2);
        assert_eq!(layer.thickness, None);
        assert!((layer.equipment[0].energy_per_unit() - 12.0 / 3000.0).abs() < 1e-15);
    }
}
