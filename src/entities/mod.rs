//! Entity type definitions

pub mod design;
pub mod factor;
pub mod impact;
pub mod layer;

pub use design::{DesignOption, LayerType};
pub use factor::{
    EmissionDataset, EmissionFactor, Factor, FactorIndex, FactorSet, SampledEmissionFactor,
};
pub use impact::{Category, Impact, Stage, StageImpacts};
pub use layer::{Equipment, Layer, LayerCatalog, Material, ProductivityUnit};
