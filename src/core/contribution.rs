//! A1 material contribution analysis
//!
//! For a design option, each material's weight is
//! |composition| × |mean gwp_total| × area × density × thickness, summed over
//! every layer that uses it, then normalized to a percentage.

use serde::Serialize;

use crate::core::diagnostic::Diagnostic;
use crate::core::error::Result;
use crate::entities::design::DesignOption;
use crate::entities::factor::{EmissionDataset, FactorSet};
use crate::entities::impact::{Category, Stage};
use crate::entities::layer::LayerCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialShare {
    pub material: String,
    /// Absolute A1 weight before normalization
    pub weight: f64,
    /// Share of the option's total, 0..=100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionContribution {
    pub dataset: String,
    pub design_option: String,
    /// In order of first appearance
    pub shares: Vec<MaterialShare>,
}

impl OptionContribution {
    pub fn share(&self, material: &str) -> Option<&MaterialShare> {
        self.shares.iter().find(|s| s.material == material)
    }
}

/// A1 contributions of every design option for one dataset
pub fn a1_contributions(
    catalog: &LayerCatalog,
    dataset: &EmissionDataset,
    options: &[DesignOption],
    reference_area: f64,
) -> Result<(Vec<OptionContribution>, Vec<Diagnostic>)> {
    let index = dataset.index()?;
    let factors = FactorSet::base(&index, &dataset.factors);
    let mut diagnostics = Vec::new();
    let mut results = Vec::with_capacity(options.len());

    for option in options {
        let mut shares: Vec<MaterialShare> = Vec::new();

        for layer_type in &option.layers {
            let Some(layer) = catalog.get(&layer_type.name) else {
                diagnostics.push(
                    Diagnostic::UnmatchedLayer {
                        design_option: option.name.clone(),
                        layer: layer_type.name.clone(),
                    }
                    .emit(),
                );
                continue;
            };
            let volume = reference_area * layer_type.density * layer_type.thickness;

            for material in &layer.materials {
                let factor = match factors.lookup(&material.name) {
                    Some(ef) => ef.values().get(Category::GwpTotal),
                    None => {
                        diagnostics.push(
                            Diagnostic::MissingFactor {
                                layer: layer.name.clone(),
                                stage: Stage::A1,
                                key: material.name.clone(),
                            }
                            .emit(),
                        );
                        0.0
                    }
                };
                let weight = material.composition.abs() * factor.abs() * volume;

                match shares.iter_mut().find(|s| s.material == material.name) {
                    Some(share) => share.weight += weight,
                    None => shares.push(MaterialShare {
                        material: material.name.clone(),
                        weight,
                        percent: 0.0,
                    }),
                }
            }
        }

        let total: f64 = shares.iter().map(|s| s.weight).sum();
        if total > 0.0 {
            for share in &mut shares {
                share.percent = share.weight / total * 100.0;
            }
        }

        results.push(OptionContribution {
            dataset: dataset.name.clone(),
            design_option: option.name.clone(),
            shares,
        });
    }

    Ok((results, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::design::LayerType;
    use crate::entities::factor::EmissionFactor;
    use crate::entities::impact::Impact;
    use crate::entities::layer::{Layer, Material};

    fn material(name: &str, composition: f64) -> Material {
        Material {
            name: name.into(),
            composition,
            transport_distance_a2: 0.0,
            mass_a2: 0.0,
        }
    }

    fn layer(name: &str, materials: Vec<Material>) -> Layer {
        Layer {
            name: name.into(),
            abbreviation: String::new(),
            materials,
            energy_type_a3: "electricity".into(),
            energy_consumption_a3: 0.0,
            transport_distance_a4: 0.0,
            mass_a4: 0.0,
            equipment: vec![],
            quantity_a5_ton: 0.0,
            quantity_a5_m2: 0.0,
            density: None,
            thickness: None,
        }
    }

    fn dataset() -> EmissionDataset {
        EmissionDataset::new(
            "ds",
            vec![
                EmissionFactor::new("bitumen", Impact::new(0.6, 0.6, 0.0, 0.0), 0.1, "kg"),
                EmissionFactor::new("gravel", Impact::new(0.2, 0.2, 0.0, 0.0), 0.1, "kg"),
                EmissionFactor::new("timber", Impact::new(-1.0, 0.1, -1.1, 0.0), 0.1, "kg"),
            ],
        )
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let catalog = LayerCatalog::new(vec![
            layer("Asphalt", vec![material("bitumen", 0.5), material("gravel", 0.5)]),
            layer("Base", vec![material("gravel", 1.0)]),
        ])
        .unwrap();
        let option = DesignOption::new(
            "Option 1",
            vec![LayerType::new("Asphalt", 1.0, 1.0), LayerType::new("Base", 1.0, 1.0)],
        );

        let (results, diagnostics) =
            a1_contributions(&catalog, &dataset(), &[option], 1.0).unwrap();
        assert!(diagnostics.is_empty());

        let result = &results[0];
        // bitumen 0.3, gravel 0.1 + 0.2
        assert!((result.share("bitumen").unwrap().percent - 50.0).abs() < 1e-9);
        assert!((result.share("gravel").unwrap().percent - 50.0).abs() < 1e-9);
        assert_eq!(result.shares[0].material, "bitumen");
    }

    #[test]
    fn test_negative_factors_use_magnitude() {
        let catalog = LayerCatalog::new(vec![layer(
            "Deck",
            vec![material("timber", 0.5), material("gravel", 0.5)],
        )])
        .unwrap();
        let option = DesignOption::new("Wood", vec![LayerType::new("Deck", 1.0, 1.0)]);

        let (results, _) = a1_contributions(&catalog, &dataset(), &[option], 1.0).unwrap();
        let timber = results[0].share("timber").unwrap();
        assert!((timber.percent - 100.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_missing_factor_and_zero_total() {
        let catalog =
            LayerCatalog::new(vec![layer("Odd", vec![material("unobtainium", 1.0)])]).unwrap();
        let option = DesignOption::new("Odd", vec![LayerType::new("Odd", 1.0, 1.0)]);

        let (results, diagnostics) =
            a1_contributions(&catalog, &dataset(), &[option], 1.0).unwrap();
        assert_eq!(results[0].shares[0].percent, 0.0);
        assert_eq!(diagnostics.len(), 1);
    }
}
