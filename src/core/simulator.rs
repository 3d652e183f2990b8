//! Monte Carlo simulation of layers and design options
//!
//! Design-option mode: for each design option one sample matrix is drawn. In
//! iteration i, row i becomes the single factor set that every stage of every
//! layer of that design option reads, so iteration i means the same world
//! across stages and layers. Each stage result is divided by the road length.
//!
//! Layer mode: every catalog layer at unit geometry (surface = density =
//! thickness = 1), one matrix for the whole run, no normalization.
//!
//! Design options run in parallel (rayon). Each worker seeds its own RNG from
//! the run seed and the design option's position, so results do not depend on
//! thread scheduling.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::config::RunConfig;
use crate::core::diagnostic::Diagnostic;
use crate::core::error::Result;
use crate::core::sampler::{derive_seed, iteration_factors, SampleMatrix, Sampler};
use crate::core::stages::{Geometry, StageCalculator};
use crate::entities::design::{DesignOption, LayerType};
use crate::entities::factor::{EmissionDataset, FactorIndex};
use crate::entities::impact::StageImpacts;
use crate::entities::layer::{Layer, LayerCatalog};

/// Per-iteration stage results of one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSamples {
    pub layer: String,
    pub thickness: f64,
    pub density: f64,
    pub quantity: f64,
    /// Index i holds iteration i
    pub iterations: Vec<StageImpacts>,
}

/// All layers of one design option for one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignOptionRun {
    pub design_option: String,
    /// Iteration count N
    pub samples: usize,
    pub layers: Vec<LayerSamples>,
}

/// Design-option simulation of one background dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRun {
    pub dataset: String,
    pub seed: u64,
    pub samples: usize,
    pub options: Vec<DesignOptionRun>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Layer-mode simulation of one background dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerModeRun {
    pub dataset: String,
    pub seed: u64,
    pub samples: usize,
    pub layers: Vec<LayerSamples>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Simulator<'a> {
    catalog: &'a LayerCatalog,
    config: &'a RunConfig,
}

impl<'a> Simulator<'a> {
    pub fn new(catalog: &'a LayerCatalog, config: &'a RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &RunConfig {
        self.config
    }

    /// Simulate every design option against one dataset
    pub fn run_design_options(
        &self,
        dataset: &EmissionDataset,
        options: &[DesignOption],
        seed: u64,
    ) -> Result<DatasetRun> {
        let index = dataset.index()?;
        let sampler = Sampler::new(&dataset.factors)?;
        let started = Instant::now();

        info!(
            dataset = %dataset.name,
            design_options = options.len(),
            samples = self.config.samples,
            seed,
            "starting design option simulation"
        );

        let results = options
            .par_iter()
            .enumerate()
            .map(|(k, option)| {
                let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(seed, k as u64));
                let matrix = sampler.draw(self.config.samples, &mut rng);
                self.simulate_design_option(dataset, &index, option, &matrix)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut runs = Vec::with_capacity(results.len());
        let mut diagnostics = Vec::new();
        for (run, diags) in results {
            runs.push(run);
            diagnostics.extend(diags);
        }

        debug!(
            dataset = %dataset.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "design option simulation finished"
        );

        Ok(DatasetRun {
            dataset: dataset.name.clone(),
            seed,
            samples: self.config.samples,
            options: runs,
            diagnostics,
        })
    }

    /// Simulate one design option over a given sample matrix
    ///
    /// The matrix decides N. Exposed so known draws can be injected.
    pub fn simulate_design_option(
        &self,
        dataset: &EmissionDataset,
        index: &FactorIndex,
        option: &DesignOption,
        matrix: &SampleMatrix,
    ) -> Result<(DesignOptionRun, Vec<Diagnostic>)> {
        let mut diagnostics = Vec::new();

        let mut resolved: Vec<(&LayerType, &Layer)> = Vec::with_capacity(option.layers.len());
        for layer_type in &option.layers {
            match self.catalog.get(&layer_type.name) {
                Some(layer) => resolved.push((layer_type, layer)),
                None => diagnostics.push(
                    Diagnostic::UnmatchedLayer {
                        design_option: option.name.clone(),
                        layer: layer_type.name.clone(),
                    }
                    .emit(),
                ),
            }
        }
        if resolved.is_empty() {
            diagnostics.push(
                Diagnostic::EmptyDesignOption {
                    design_option: option.name.clone(),
                }
                .emit(),
            );
        }

        let geometries: Vec<Geometry> = resolved
            .iter()
            .map(|(lt, _)| Geometry::for_layer_type(self.config.physical.reference_area, lt))
            .collect();
        let road_length = self.config.road_length;

        let mut layers: Vec<LayerSamples> = resolved
            .iter()
            .map(|(lt, layer)| LayerSamples {
                layer: layer.name.clone(),
                thickness: lt.thickness,
                density: lt.density,
                quantity: lt.quantity,
                iterations: Vec::with_capacity(matrix.rows()),
            })
            .collect();

        let iterations = self.run_iterations(
            dataset,
            index,
            matrix,
            &resolved.iter().map(|(_, l)| *l).collect::<Vec<_>>(),
            &geometries,
            &mut diagnostics,
        )?;
        for per_layer in iterations {
            for (samples, stages) in layers.iter_mut().zip(per_layer) {
                samples.iterations.push(stages.map(|impact| impact / road_length));
            }
        }

        Ok((
            DesignOptionRun {
                design_option: option.name.clone(),
                samples: matrix.rows(),
                layers,
            },
            diagnostics,
        ))
    }

    /// Simulate every catalog layer at unit geometry
    pub fn run_layers(&self, dataset: &EmissionDataset, seed: u64) -> Result<LayerModeRun> {
        let index = dataset.index()?;
        let sampler = Sampler::new(&dataset.factors)?;

        info!(
            dataset = %dataset.name,
            layers = self.catalog.len(),
            samples = self.config.samples,
            seed,
            "starting layer simulation"
        );

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let matrix = sampler.draw(self.config.samples, &mut rng);
        let (layers, diagnostics) = self.simulate_layers(dataset, &index, &matrix)?;

        Ok(LayerModeRun {
            dataset: dataset.name.clone(),
            seed,
            samples: self.config.samples,
            layers,
            diagnostics,
        })
    }

    /// Layer mode over a given sample matrix
    pub fn simulate_layers(
        &self,
        dataset: &EmissionDataset,
        index: &FactorIndex,
        matrix: &SampleMatrix,
    ) -> Result<(Vec<LayerSamples>, Vec<Diagnostic>)> {
        let catalog_layers: Vec<&Layer> = self.catalog.layers().iter().collect();
        let geometries = vec![Geometry::UNIT; catalog_layers.len()];
        let mut diagnostics = Vec::new();

        let iterations = self.run_iterations(
            dataset,
            index,
            matrix,
            &catalog_layers,
            &geometries,
            &mut diagnostics,
        )?;

        let mut layers: Vec<LayerSamples> = catalog_layers
            .iter()
            .map(|layer| LayerSamples {
                layer: layer.name.clone(),
                thickness: 1.0,
                density: 1.0,
                quantity: 1.0,
                iterations: Vec::with_capacity(matrix.rows()),
            })
            .collect();
        for per_layer in iterations {
            for (samples, stages) in layers.iter_mut().zip(per_layer) {
                samples.iterations.push(stages);
            }
        }

        Ok((layers, diagnostics))
    }

    /// Core loop: one shared factor set per iteration, all layers read it
    ///
    /// Returns `[iteration][layer]`. Diagnostics only depend on which keys
    /// resolve, not on sampled values, so they are collected once (iteration 0).
    fn run_iterations(
        &self,
        dataset: &EmissionDataset,
        index: &FactorIndex,
        matrix: &SampleMatrix,
        layers: &[&Layer],
        geometries: &[Geometry],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Vec<StageImpacts>>> {
        let calculator = StageCalculator::from_config(self.config);
        let mut out = Vec::with_capacity(matrix.rows());

        for i in 0..matrix.rows() {
            let factors = iteration_factors(index, &dataset.factors, matrix, i)?;
            let mut per_layer = Vec::with_capacity(layers.len());

            for (layer, geometry) in layers.iter().zip(geometries) {
                let stages = calculator.compute(layer, *geometry, &factors)?;
                if i == 0 {
                    diagnostics.extend(stages.diagnostics.into_iter().map(Diagnostic::emit));
                }
                per_layer.push(stages.impacts);
            }
            out.push(per_layer);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::factor::EmissionFactor;
    use crate::entities::impact::Impact;
    use crate::entities::layer::Material;

    fn layer(name: &str, materials: &[(&str, f64)]) -> Layer {
        Layer {
            name: name.into(),
            abbreviation: name.chars().take(2).collect(),
            materials: materials
                .iter()
                .map(|(m, c)| Material {
                    name: (*m).into(),
                    composition: *c,
                    transport_distance_a2: 50.0,
                    mass_a2: 100.0,
                })
                .collect(),
            energy_type_a3: "electricity".into(),
            energy_consumption_a3: 10.0,
            transport_distance_a4: 20.0,
            mass_a4: 1.0,
            equipment: vec![],
            quantity_a5_ton: 1.0,
            quantity_a5_m2: 1.0,
            density: None,
            thickness: None,
        }
    }

    fn dataset() -> EmissionDataset {
        EmissionDataset::new(
            "unit",
            vec![
                EmissionFactor::new("cement", Impact::new(0.8, 0.78, 0.01, 0.01), 0.2, "kg"),
                EmissionFactor::new("diesel", Impact::new(3.0, 2.9, 0.05, 0.05), 0.1, "kg"),
                EmissionFactor::new("electricity", Impact::new(0.4, 0.35, 0.03, 0.02), 0.1, "kWh"),
            ],
        )
    }

    #[test]
    fn test_unmatched_layer_is_skipped() {
        let catalog = LayerCatalog::new(vec![layer("Base", &[("cement", 0.1)])]).unwrap();
        let mut config = RunConfig::with_defaults();
        config.samples = 5;
        let sim = Simulator::new(&catalog, &config).unwrap();
        let option = DesignOption::new(
            "Option 1",
            vec![
                LayerType::new("Base", 0.2, 2.2),
                LayerType::new("Ghost", 0.1, 2.0),
            ],
        );

        let run = sim.run_design_options(&dataset(), &[option], 11).unwrap();
        assert_eq!(run.options[0].layers.len(), 1);
        assert_eq!(run.options[0].layers[0].iterations.len(), 5);
        assert!(run.diagnostics.contains(&Diagnostic::UnmatchedLayer {
            design_option: "Option 1".into(),
            layer: "Ghost".into(),
        }));
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let catalog = LayerCatalog::new(vec![layer("Base", &[("cement", 0.1)])]).unwrap();
        let mut config = RunConfig::with_defaults();
        config.samples = 20;
        let sim = Simulator::new(&catalog, &config).unwrap();
        let options = vec![
            DesignOption::new("A", vec![LayerType::new("Base", 0.2, 2.2)]),
            DesignOption::new("B", vec![LayerType::new("Base", 0.3, 2.2)]),
        ];

        let first = sim.run_design_options(&dataset(), &options, 99).unwrap();
        let second = sim.run_design_options(&dataset(), &options, 99).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.options[0].design_option, "A");
        assert_eq!(first.options[1].design_option, "B");
    }

    #[test]
    fn test_layer_mode_uses_unit_geometry() {
        let catalog = LayerCatalog::new(vec![layer("Base", &[("cement", 0.5)])]).unwrap();
        let ds = dataset();
        let index = ds.index().unwrap();
        let config = RunConfig::with_defaults();
        let sim = Simulator::new(&catalog, &config).unwrap();

        // one iteration, factors at known values
        let row = vec![
            vec![2.0, 2.0, 0.0, 0.0, 3.0, 3.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0],
        ];
        let matrix = SampleMatrix::from_rows(row).unwrap();
        let (layers, diagnostics) = sim.simulate_layers(&ds, &index, &matrix).unwrap();

        assert!(diagnostics.is_empty());
        let stages = layers[0].iterations[0];
        assert_eq!(stages.a1.gwp_total, 0.5 * 2.0);
        assert_eq!(stages.a3.gwp_total, 0.5 * 10.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let catalog = LayerCatalog::new(vec![]).unwrap();
        let mut config = RunConfig::with_defaults();
        config.road_length = -1.0;
        assert!(Simulator::new(&catalog, &config).is_err());
    }
}
