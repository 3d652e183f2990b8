//! Result files
//!
//! Per dataset: `<dataset>_results.json` (flat statistics records),
//! `<dataset>_samples.json` (aggregated samples with a run envelope) and
//! `<dataset>_overall.csv` (one row per iteration and design option).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::aggregate::OptionSamples;
use crate::core::error::{LcaError, Result};
use crate::core::statistics::StatRecord;
use crate::entities::impact::Category;

/// Raw samples of one dataset run
#[derive(Debug, Serialize)]
pub struct SamplesEnvelope<'a> {
    pub dataset: &'a str,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub samples: usize,
    pub design_options: &'a [OptionSamples],
}

impl<'a> SamplesEnvelope<'a> {
    pub fn new(dataset: &'a str, seed: u64, samples: usize, design_options: &'a [OptionSamples]) -> Self {
        Self {
            dataset,
            generated_at: Utc::now(),
            seed,
            samples,
            design_options,
        }
    }
}

#[derive(Debug, Serialize)]
struct OverallRow<'a> {
    iteration: usize,
    design_option: &'a str,
    gwp_total: f64,
    gwp_fossil: f64,
    gwp_biogenic: f64,
    gwp_luluc: f64,
}

/// Dataset name reduced to characters safe in a file name
pub fn file_stem(dataset: &str) -> String {
    dataset
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Pretty-printed JSON of any serializable value
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| LcaError::Serialize {
        what: path.display().to_string(),
        message: e.to_string(),
    })?;
    fs::write(path, json)?;
    Ok(())
}

pub fn write_results(dir: &Path, dataset: &str, records: &[StatRecord]) -> Result<PathBuf> {
    let path = dir.join(format!("{}_results.json", file_stem(dataset)));
    write_json(&path, records)?;
    Ok(path)
}

pub fn write_samples(dir: &Path, envelope: &SamplesEnvelope<'_>) -> Result<PathBuf> {
    let path = dir.join(format!("{}_samples.json", file_stem(envelope.dataset)));
    write_json(&path, envelope)?;
    Ok(path)
}

/// Overall (A1-A5) samples, one row per iteration and design option
pub fn write_overall_csv(dir: &Path, dataset: &str, options: &[OptionSamples]) -> Result<PathBuf> {
    let path = dir.join(format!("{}_overall.csv", file_stem(dataset)));
    let mut writer = csv::Writer::from_path(&path)?;

    for option in options {
        for i in 0..option.samples() {
            let value = |category: Category| option.overall(category).get(i).copied().unwrap_or(0.0);
            writer.serialize(OverallRow {
                iteration: i,
                design_option: &option.name,
                gwp_total: value(Category::GwpTotal),
                gwp_fossil: value(Category::GwpFossil),
                gwp_biogenic: value(Category::GwpBiogenic),
                gwp_luluc: value(Category::GwpLuluc),
            })?;
        }
    }
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::aggregate_layers;
    use crate::core::simulator::LayerSamples;
    use crate::core::statistics::overall_records;
    use crate::entities::impact::{Impact, StageImpacts};
    use tempfile::tempdir;

    fn option(name: &str, values: &[f64]) -> OptionSamples {
        let layer = LayerSamples {
            layer: "L".into(),
            thickness: 1.0,
            density: 1.0,
            quantity: 0.0,
            iterations: values
                .iter()
                .map(|&v| StageImpacts {
                    a1: Impact::new(v, v, 0.0, 0.0),
                    ..StageImpacts::ZERO
                })
                .collect(),
        };
        aggregate_layers(name, &[layer], values.len())
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("EF 3.1/GaBi"), "EF_3_1_GaBi");
        assert_eq!(file_stem("ecoinvent-3_9"), "ecoinvent-3_9");
    }

    #[test]
    fn test_results_round_trip_as_records() {
        let dir = tempdir().unwrap();
        let options = vec![option("Option 1", &[1.0, 2.0, 3.0])];
        let records = overall_records(&options).unwrap();

        let path = write_results(dir.path(), "ecoinvent", &records).unwrap();
        assert!(path.ends_with("ecoinvent_results.json"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["Mean"], 2.0);
        assert_eq!(rows[0]["Life Cycle Stage"], "A1-A5");
    }

    #[test]
    fn test_samples_envelope() {
        let dir = tempdir().unwrap();
        let options = vec![option("Option 1", &[1.0, 2.0])];
        let envelope = SamplesEnvelope::new("ecoinvent", 42, 2, &options);

        let path = write_samples(dir.path(), &envelope).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["seed"], 42);
        assert!(json["generated_at"].is_string());
        assert_eq!(json["design_options"][0]["stages"]["A1"]["gwp_total"][1], 2.0);
        assert_eq!(json["design_options"][0]["overall"]["gwp_total"][0], 1.0);
    }

    #[test]
    fn test_overall_csv() {
        let dir = tempdir().unwrap();
        let options = vec![option("A", &[1.0, 2.0]), option("B", &[5.0, 6.0])];

        let path = write_overall_csv(dir.path(), "ds", &options).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "iteration,design_option,gwp_total,gwp_fossil,gwp_biogenic,gwp_luluc"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "0,B,5.0,5.0,0.0,0.0");
    }
}
