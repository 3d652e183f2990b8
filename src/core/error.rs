//! Error types for the LCA engine
//!
//! Only fatal conditions live here. Recoverable gaps (missing emission
//! factors, unmatched layers) are reported as [`crate::core::Diagnostic`]s.

use thiserror::Error;

use crate::entities::impact::{Category, Stage};

pub type Result<T> = std::result::Result<T, LcaError>;

#[derive(Debug, Error)]
pub enum LcaError {
    #[error("Invalid coefficient of variation {cov} for emission factor '{key}' ({channel}): must be finite and non-negative")]
    InvalidCov {
        key: String,
        channel: Category,
        cov: f64,
    },

    #[error("Invalid mean {mean} for emission factor '{key}' ({channel}): must be finite")]
    InvalidMean {
        key: String,
        channel: Category,
        mean: f64,
    },

    #[error("Duplicate emission factor '{key}' in dataset '{dataset}' (keys are case-insensitive)")]
    DuplicateFactor { dataset: String, key: String },

    #[error("Duplicate layer '{0}' in layer catalog")]
    DuplicateLayer(String),

    #[error("Unsupported productivity unit '{unit}' for equipment '{equipment}' in layer '{layer}' (expected t/h, m2/h or m3/h)")]
    UnsupportedProductivityUnit {
        layer: String,
        equipment: String,
        unit: String,
    },

    #[error("Invalid equipment '{equipment}' in layer '{layer}': {reason}")]
    InvalidEquipment {
        layer: String,
        equipment: String,
        reason: String,
    },

    #[error("Stage {stage} of layer '{layer}' is undefined: no emission factor for '{key}'")]
    UndefinedStage {
        layer: String,
        stage: Stage,
        key: String,
    },

    #[error("Invalid run configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot compute statistics of an empty sample list")]
    EmptySamples,

    #[error("Sample matrix shape mismatch: expected {expected} columns, got {actual}")]
    MatrixShape { expected: usize, actual: usize },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("Failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
