//! Deterministic (base-value) results
//!
//! Layer results are computed once at unit geometry from the mean emission
//! factors. A design option's result scales each layer by density × thickness
//! × reference area, sums the layers and divides by the road length. The layer
//! results are never modified; every design option gets its own fresh record.

use serde::Serialize;
use std::collections::HashMap;

use crate::core::config::RunConfig;
use crate::core::diagnostic::Diagnostic;
use crate::core::error::Result;
use crate::core::stages::{Geometry, StageCalculator};
use crate::entities::design::DesignOption;
use crate::entities::factor::{EmissionDataset, FactorSet};
use crate::entities::impact::StageImpacts;
use crate::entities::layer::LayerCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerResult {
    pub layer: String,
    pub stages: StageImpacts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignOptionResult {
    pub design_option: String,
    pub stages: StageImpacts,
}

/// Everything a deterministic evaluation of one dataset produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterministicRun {
    pub dataset: String,
    pub layers: Vec<LayerResult>,
    pub options: Vec<DesignOptionResult>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-unit stage results of every catalog layer at the mean factors
pub fn layer_results(
    catalog: &LayerCatalog,
    dataset: &EmissionDataset,
    config: &RunConfig,
) -> Result<(Vec<LayerResult>, Vec<Diagnostic>)> {
    let index = dataset.index()?;
    let factors = FactorSet::base(&index, &dataset.factors);
    let calculator = StageCalculator::from_config(config);

    let mut results = Vec::with_capacity(catalog.len());
    let mut diagnostics = Vec::new();
    for layer in catalog.layers() {
        let stages = calculator.compute(layer, Geometry::UNIT, &factors)?;
        diagnostics.extend(stages.diagnostics.into_iter().map(Diagnostic::emit));
        results.push(LayerResult {
            layer: layer.name.clone(),
            stages: stages.impacts,
        });
    }

    Ok((results, diagnostics))
}

/// Scale and sum layer results into per-design-option results
pub fn design_option_results(
    layers: &[LayerResult],
    options: &[DesignOption],
    config: &RunConfig,
) -> (Vec<DesignOptionResult>, Vec<Diagnostic>) {
    let by_name: HashMap<&str, &LayerResult> =
        layers.iter().map(|r| (r.layer.as_str(), r)).collect();
    let reference_area = config.physical.reference_area;

    let mut results = Vec::with_capacity(options.len());
    let mut diagnostics = Vec::new();

    for option in options {
        let mut stages = StageImpacts::ZERO;
        let mut matched = 0;

        for layer_type in &option.layers {
            let Some(layer) = by_name.get(layer_type.name.as_str()) else {
                diagnostics.push(
                    Diagnostic::UnmatchedLayer {
                        design_option: option.name.clone(),
                        layer: layer_type.name.clone(),
                    }
                    .emit(),
                );
                continue;
            };
            let scale = layer_type.density * layer_type.thickness * reference_area;
            stages = stages + layer.stages.map(|impact| impact * scale);
            matched += 1;
        }

        if matched == 0 {
            diagnostics.push(
                Diagnostic::EmptyDesignOption {
                    design_option: option.name.clone(),
                }
                .emit(),
            );
        }

        results.push(DesignOptionResult {
            design_option: option.name.clone(),
            stages: stages.map(|impact| impact / config.road_length),
        });
    }

    (results, diagnostics)
}

/// Layer and design option results of one dataset
pub fn run(
    catalog: &LayerCatalog,
    dataset: &EmissionDataset,
    options: &[DesignOption],
    config: &RunConfig,
) -> Result<DeterministicRun> {
    config.validate()?;
    let (layers, mut diagnostics) = layer_results(catalog, dataset, config)?;
    let (option_results, option_diagnostics) = design_option_results(&layers, options, config);
    diagnostics.extend(option_diagnostics);

    Ok(DeterministicRun {
        dataset: dataset.name.clone(),
        layers,
        options: option_results,
        diagnostics,
    })
}
