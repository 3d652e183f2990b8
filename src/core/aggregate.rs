//! Reduce per-layer iterations to per-design-option sample vectors
//!
//! Sample i of a stage is the sum over layers of that layer's iteration i;
//! sample i of the overall result is additionally summed over the five stages.
//! Iterations are combined by index only, so the pairing set up by the
//! simulator is kept intact.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::simulator::{DatasetRun, DesignOptionRun, LayerModeRun, LayerSamples};
use crate::entities::impact::{Category, Stage, StageImpacts};

/// One sample vector per impact category
pub type CategorySamples = BTreeMap<Category, Vec<f64>>;

/// Aggregated samples of one subject (a design option, or a layer in layer mode)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSamples {
    pub name: String,
    pub stages: BTreeMap<Stage, CategorySamples>,
    pub overall: CategorySamples,
}

impl OptionSamples {
    /// Samples of one stage and category
    pub fn stage(&self, stage: Stage, category: Category) -> &[f64] {
        self.stages
            .get(&stage)
            .and_then(|c| c.get(&category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Samples of the A1-A5 total for one category
    pub fn overall(&self, category: Category) -> &[f64] {
        self.overall
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn samples(&self) -> usize {
        self.overall(Category::GwpTotal).len()
    }
}

/// Sum layers index by index and split into stage and overall vectors
pub fn aggregate_layers(name: &str, layers: &[LayerSamples], samples: usize) -> OptionSamples {
    let mut per_iteration = vec![StageImpacts::ZERO; samples];
    for layer in layers {
        for (acc, stages) in per_iteration.iter_mut().zip(&layer.iterations) {
            *acc = *acc + *stages;
        }
    }

    let stages = Stage::ALL
        .iter()
        .map(|&stage| {
            let by_category = Category::ALL
                .iter()
                .map(|&category| {
                    let values = per_iteration
                        .iter()
                        .map(|s| s.get(stage).get(category))
                        .collect();
                    (category, values)
                })
                .collect();
            (stage, by_category)
        })
        .collect();

    let totals: Vec<_> = per_iteration.iter().map(StageImpacts::total).collect();
    let overall = Category::ALL
        .iter()
        .map(|&category| (category, totals.iter().map(|t| t.get(category)).collect()))
        .collect();

    OptionSamples {
        name: name.to_string(),
        stages,
        overall,
    }
}

pub fn aggregate_option(run: &DesignOptionRun) -> OptionSamples {
    aggregate_layers(&run.design_option, &run.layers, run.samples)
}

/// Aggregate every design option of a dataset run, in input order
pub fn aggregate_dataset(run: &DatasetRun) -> Vec<OptionSamples> {
    run.options.iter().map(aggregate_option).collect()
}

/// Each catalog layer becomes its own subject
pub fn aggregate_layer_mode(run: &LayerModeRun) -> Vec<OptionSamples> {
    run.layers
        .iter()
        .map(|layer| aggregate_layers(&layer.layer, std::slice::from_ref(layer), run.samples))
        .collect()
}
