//! Stage impact calculators (A1-A5)
//!
//! Pure functions of a layer's data, its geometry and one set of emission
//! factors. With M = surfaceArea × density × thickness (tons of material):
//!
//! | Stage | Formula                                                                 |
//! |-------|-------------------------------------------------------------------------|
//! | A1    | Σ composition × EF(material) × M                                       |
//! | A2    | Σ fuel × d_a2 × trip × (mass_a2 / capacity) × EF(diesel) × M            |
//! | A3    | EF(energy) × consumption × M                                            |
//! | A4    | fuel × d_a4 × trip × (M·1000 / capacity) × EF(diesel)                   |
//! | A5    | Σ EF(energy) × energy / (productivity × count) × quantity(unit)         |
//!
//! where trip = 1/3·(load/capacity) + 2/3 + 2/3·empty_return.
//! A2 scales per-ton transport by M while A4 converts M to kg; both
//! conventions are kept as they are.

use crate::core::config::{EquipmentPolicy, MissingFactorPolicy, PhysicalConstants, RunConfig};
use crate::core::diagnostic::Diagnostic;
use crate::core::error::{LcaError, Result};
use crate::entities::design::LayerType;
use crate::entities::factor::FactorSet;
use crate::entities::impact::{Impact, Stage, StageImpacts};
use crate::entities::layer::{Equipment, Layer, Material, ProductivityUnit};

/// Emission factor key used for truck transport
pub const DIESEL: &str = "diesel";

/// Physical extent a layer is evaluated over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// m2
    pub surface_area: f64,
    /// t/m3
    pub density: f64,
    /// m
    pub thickness: f64,
}

impl Geometry {
    /// Per unit of material, independent of any design
    pub const UNIT: Geometry = Geometry {
        surface_area: 1.0,
        density: 1.0,
        thickness: 1.0,
    };

    pub fn new(surface_area: f64, density: f64, thickness: f64) -> Self {
        Self {
            surface_area,
            density,
            thickness,
        }
    }

    /// Geometry of a layer instance on the reference site
    pub fn for_layer_type(reference_area: f64, layer_type: &LayerType) -> Self {
        Self::new(reference_area, layer_type.density, layer_type.thickness)
    }

    /// surfaceArea × density × thickness, in t
    pub fn mass(&self) -> f64 {
        self.surface_area * self.density * self.thickness
    }
}

/// Result of one stage calculation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageOutput {
    /// `None` when the stage's only emission factor is missing
    pub impact: Option<Impact>,
    /// Keys that did not resolve
    pub missing: Vec<String>,
}

impl StageOutput {
    fn defined(impact: Impact, missing: Vec<String>) -> Self {
        Self {
            impact: Some(impact),
            missing,
        }
    }

    fn undefined(missing: Vec<String>) -> Self {
        Self {
            impact: None,
            missing,
        }
    }
}

/// A1 - material production
pub fn a1(materials: &[Material], geometry: Geometry, factors: &FactorSet) -> StageOutput {
    let mass = geometry.mass();
    let mut impact = Impact::ZERO;
    let mut missing = Vec::new();

    for material in materials {
        match factors.lookup(&material.name) {
            Some(ef) => impact += ef.values() * (material.composition * mass),
            None => missing.push(material.name.clone()),
        }
    }

    StageOutput::defined(impact, missing)
}

/// A2 - transport of raw materials to the plant
pub fn a2(
    materials: &[Material],
    geometry: Geometry,
    constants: &PhysicalConstants,
    factors: &FactorSet,
) -> StageOutput {
    if materials.is_empty() {
        return StageOutput::defined(Impact::ZERO, Vec::new());
    }
    let Some(diesel) = factors.lookup(DIESEL) else {
        return StageOutput::undefined(vec![DIESEL.to_string()]);
    };

    let trip = constants.trip_factor();
    let diesel_mass: f64 = materials
        .iter()
        .map(|m| {
            constants.fuel_consumption_rate
                * m.transport_distance_a2
                * trip
                * (m.mass_a2 / constants.load_capacity)
        })
        .sum();

    StageOutput::defined(diesel.values() * (diesel_mass * geometry.mass()), Vec::new())
}

/// A3 - manufacturing energy
pub fn a3(
    energy_type: &str,
    energy_consumption: f64,
    geometry: Geometry,
    factors: &FactorSet,
) -> StageOutput {
    match factors.lookup(energy_type) {
        Some(ef) => StageOutput::defined(
            ef.values() * (energy_consumption * geometry.mass()),
            Vec::new(),
        ),
        None => StageOutput::undefined(vec![energy_type.to_string()]),
    }
}

/// A4 - transport of the product to site
pub fn a4(
    transport_distance: f64,
    geometry: Geometry,
    constants: &PhysicalConstants,
    factors: &FactorSet,
) -> StageOutput {
    let Some(diesel) = factors.lookup(DIESEL) else {
        return StageOutput::undefined(vec![DIESEL.to_string()]);
    };

    // t → kg, consistent with the load capacity unit
    let diesel_mass = constants.fuel_consumption_rate
        * transport_distance
        * constants.trip_factor()
        * ((geometry.mass() * 1000.0) / constants.load_capacity);

    StageOutput::defined(diesel.values() * diesel_mass, Vec::new())
}

/// Amount of work an A5 machine's productivity refers to
pub fn a5_quantity(unit: ProductivityUnit, geometry: Geometry) -> f64 {
    match unit {
        ProductivityUnit::TonsPerHour => geometry.mass(),
        ProductivityUnit::SquareMetresPerHour => geometry.surface_area,
        ProductivityUnit::CubicMetresPerHour => geometry.surface_area * geometry.thickness,
    }
}

/// A5 - construction equipment
///
/// An unsupported productivity unit is a data defect and fails the run.
pub fn a5(
    layer: &str,
    equipment: &[Equipment],
    geometry: Geometry,
    factors: &FactorSet,
    policy: EquipmentPolicy,
) -> Result<StageOutput> {
    if equipment.is_empty() {
        return Ok(StageOutput::defined(Impact::ZERO, Vec::new()));
    }

    let considered = match policy {
        EquipmentPolicy::SumAll => equipment,
        EquipmentPolicy::FirstOnly => &equipment[..1],
    };

    let mut impact = Impact::ZERO;
    let mut resolved = 0;
    let mut missing = Vec::new();

    for machine in considered {
        let quantity = a5_quantity(machine.unit(layer)?, geometry);
        match factors.lookup(&machine.energy_type) {
            Some(ef) => {
                impact += ef.values() * (machine.energy_per_unit() * quantity);
                resolved += 1;
            }
            None => missing.push(machine.energy_type.clone()),
        }
    }

    if resolved == 0 {
        Ok(StageOutput::undefined(missing))
    } else {
        Ok(StageOutput::defined(impact, missing))
    }
}

/// All five stages of one layer with the undefined-stage policy applied
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStages {
    pub impacts: StageImpacts,
    /// Not yet logged; the caller decides when to emit
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the stage calculators with one run's constants and policies
#[derive(Debug, Clone, Copy)]
pub struct StageCalculator<'a> {
    pub constants: &'a PhysicalConstants,
    pub equipment_policy: EquipmentPolicy,
    pub missing_policy: MissingFactorPolicy,
}

impl<'a> StageCalculator<'a> {
    pub fn from_config(config: &'a RunConfig) -> Self {
        Self {
            constants: &config.physical,
            equipment_policy: config.equipment_policy,
            missing_policy: config.missing_factor_policy,
        }
    }

    pub fn compute(&self, layer: &Layer, geometry: Geometry, factors: &FactorSet) -> Result<LayerStages> {
        let outputs = [
            (Stage::A1, a1(&layer.materials, geometry, factors)),
            (Stage::A2, a2(&layer.materials, geometry, self.constants, factors)),
            (
                Stage::A3,
                a3(&layer.energy_type_a3, layer.energy_consumption_a3, geometry, factors),
            ),
            (
                Stage::A4,
                a4(layer.transport_distance_a4, geometry, self.constants, factors),
            ),
            (
                Stage::A5,
                a5(&layer.name, &layer.equipment, geometry, factors, self.equipment_policy)?,
            ),
        ];

        let mut impacts = StageImpacts::ZERO;
        let mut diagnostics = Vec::new();

        for (stage, output) in outputs {
            match output.impact {
                Some(impact) => impacts.set(stage, impact),
                None => match self.missing_policy {
                    MissingFactorPolicy::Abort => {
                        return Err(LcaError::UndefinedStage {
                            layer: layer.name.clone(),
                            stage,
                            key: output.missing.first().cloned().unwrap_or_default(),
                        });
                    }
                    MissingFactorPolicy::Zero => {
                        diagnostics.push(Diagnostic::UndefinedStage {
                            layer: layer.name.clone(),
                            stage,
                        });
                    }
                },
            }
            diagnostics.extend(output.missing.into_iter().map(|key| Diagnostic::MissingFactor {
                layer: layer.name.clone(),
                stage,
                key,
            }));
        }

        Ok(LayerStages {
            impacts,
            diagnostics,
        })
    }
}
