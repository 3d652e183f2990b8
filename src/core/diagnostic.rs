//! Non-fatal findings reported alongside results

use serde::Serialize;
use std::fmt;

use crate::entities::impact::Stage;

/// A data gap that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An emission factor key did not resolve; its contribution is zero
    MissingFactor {
        layer: String,
        stage: Stage,
        key: String,
    },
    /// A whole stage had no factor and was counted as zero
    UndefinedStage { layer: String, stage: Stage },
    /// A design option references a layer absent from the catalog
    UnmatchedLayer {
        design_option: String,
        layer: String,
    },
    /// A design option has no resolvable layers
    EmptyDesignOption { design_option: String },
}

impl Diagnostic {
    /// Log through `tracing` and hand the diagnostic back
    pub fn emit(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingFactor { layer, stage, key } => write!(
                f,
                "layer '{}' {}: no emission factor for '{}', contribution skipped",
                layer, stage, key
            ),
            Diagnostic::UndefinedStage { layer, stage } => {
                write!(f, "layer '{}' {}: stage undefined, counted as zero", layer, stage)
            }
            Diagnostic::UnmatchedLayer {
                design_option,
                layer,
            } => write!(
                f,
                "design option '{}': layer '{}' not found in layer catalog, skipped",
                design_option, layer
            ),
            Diagnostic::EmptyDesignOption { design_option } => write!(
                f,
                "design option '{}' has no resolvable layers, results are zero",
                design_option
            ),
        }
    }
}
