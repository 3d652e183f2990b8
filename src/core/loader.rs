//! JSON input files
//!
//! Three documents feed a run: the layer catalog (`{"layers": [...]}`), one
//! emission factor file per background dataset (`{"emission_factors": [...]}`)
//! and the design options (`{"design_options": [...]}`).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::error::{LcaError, Result};
use crate::entities::design::DesignOption;
use crate::entities::factor::{EmissionDataset, EmissionFactor};
use crate::entities::layer::{Layer, LayerCatalog};

#[derive(Debug, Deserialize)]
struct LayersFile {
    layers: Vec<Layer>,
}

#[derive(Debug, Deserialize)]
struct EmissionFactorsFile {
    emission_factors: Vec<EmissionFactor>,
}

#[derive(Debug, Deserialize)]
struct DesignOptionsFile {
    design_options: Vec<DesignOption>,
}

fn parse<T: DeserializeOwned>(content: &str, what: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| LcaError::Parse {
        what: what.to_string(),
        message: e.to_string(),
    })
}

fn read(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Parse and validate a layer catalog
pub fn parse_layers(content: &str) -> Result<LayerCatalog> {
    let file: LayersFile = parse(content, "layer catalog")?;
    LayerCatalog::new(file.layers)
}

pub fn load_layers(path: &Path) -> Result<LayerCatalog> {
    let file: LayersFile = parse(&read(path)?, &path.display().to_string())?;
    LayerCatalog::new(file.layers)
}

/// Parse an emission factor file; duplicate keys are rejected
pub fn parse_dataset(name: &str, content: &str) -> Result<EmissionDataset> {
    let file: EmissionFactorsFile = parse(content, &format!("emission factors '{}'", name))?;
    let dataset = EmissionDataset::new(name, file.emission_factors);
    dataset.index()?;
    Ok(dataset)
}

/// Load a dataset; without a name the file stem is used
pub fn load_dataset(path: &Path, name: Option<&str>) -> Result<EmissionDataset> {
    let name = match name {
        Some(n) => n.to_string(),
        None => dataset_name(path),
    };
    let content = read(path)?;
    parse_dataset(&name, &content).map_err(|e| match e {
        LcaError::Parse { message, .. } => LcaError::Parse {
            what: path.display().to_string(),
            message,
        },
        other => other,
    })
}

pub fn parse_design_options(content: &str) -> Result<Vec<DesignOption>> {
    let file: DesignOptionsFile = parse(content, "design options")?;
    Ok(file.design_options)
}

pub fn load_design_options(path: &Path) -> Result<Vec<DesignOption>> {
    let file: DesignOptionsFile = parse(&read(path)?, &path.display().to_string())?;
    Ok(file.design_options)
}

/// File stem of a dataset path ("data/ecoinvent.json" -> "ecoinvent")
pub fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}
