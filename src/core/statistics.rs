//! Summary statistics of sample vectors
//!
//! Percentiles interpolate linearly between order statistics (index
//! p·(n−1)), the standard deviation is the population one, and outliers are
//! values beyond 1.5 × IQR from the quartiles.

use serde::{Deserialize, Serialize};

use crate::core::aggregate::OptionSamples;
use crate::core::error::{LcaError, Result};
use crate::entities::impact::{Category, Stage};

/// Functional unit of every normalized result
pub const UNIT: &str = "kgCO2eq/FU";

/// Stage label of the A1-A5 total
pub const OVERALL_STAGE: &str = "A1-A5";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
    /// |std / mean|, 0 when the mean is 0
    pub cov: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p95: f64,
    pub outliers: usize,
}

impl Summary {
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(LcaError::EmptySamples);
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let cov = if mean == 0.0 { 0.0 } else { (std / mean).abs() };

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            mean,
            std,
            cov,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            outliers: count_outliers(&sorted),
        })
    }
}

/// Linear-interpolation percentile of sorted data, `q` in [0, 100]
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * (q / 100.0).clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// Values outside [Q1 − 1.5·IQR, Q3 + 1.5·IQR]
pub fn count_outliers(sorted: &[f64]) -> usize {
    let q1 = percentile(sorted, 25.0);
    let q3 = percentile(sorted, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    sorted.iter().filter(|&&x| x < lower || x > upper).count()
}

/// One row of the exported statistics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    #[serde(rename = "Design Option")]
    pub design_option: String,
    #[serde(rename = "Life Cycle Stage")]
    pub stage: String,
    #[serde(rename = "Impact Category")]
    pub category: Category,
    #[serde(rename = "Mean")]
    pub mean: f64,
    #[serde(rename = "STD")]
    pub std: f64,
    #[serde(rename = "COV")]
    pub cov: f64,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "95th Percentile")]
    pub p95: f64,
    #[serde(rename = "Median")]
    pub median: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Outliers")]
    pub outliers: usize,
}

impl StatRecord {
    pub fn new(design_option: &str, stage: &str, category: Category, summary: &Summary) -> Self {
        Self {
            design_option: design_option.to_string(),
            stage: stage.to_string(),
            category,
            mean: summary.mean,
            std: summary.std,
            cov: summary.cov,
            min: summary.min,
            max: summary.max,
            p95: summary.p95,
            median: summary.median,
            unit: UNIT.to_string(),
            outliers: summary.outliers,
        }
    }
}

/// Per-stage records, ordered option → stage → category
pub fn stage_records(options: &[OptionSamples]) -> Result<Vec<StatRecord>> {
    let mut records = Vec::with_capacity(options.len() * Stage::ALL.len() * Category::ALL.len());
    for option in options {
        for stage in Stage::ALL {
            for category in Category::ALL {
                let summary = Summary::from_samples(option.stage(stage, category))?;
                records.push(StatRecord::new(&option.name, stage.code(), category, &summary));
            }
        }
    }
    Ok(records)
}

/// A1-A5 total records, ordered option → category
pub fn overall_records(options: &[OptionSamples]) -> Result<Vec<StatRecord>> {
    let mut records = Vec::with_capacity(options.len() * Category::ALL.len());
    for option in options {
        for category in Category::ALL {
            let summary = Summary::from_samples(option.overall(category))?;
            records.push(StatRecord::new(&option.name, OVERALL_STAGE, category, &summary));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_outlier() {
        let s = Summary::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(s.median, 3.5);
        assert!((s.p95 - 76.25).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 100.0);
        assert_eq!(s.outliers, 1);
        assert!((s.mean - 115.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!((percentile(&sorted, 25.0) - 2.25).abs() < 1e-12);
        assert!((percentile(&sorted, 75.0) - 4.75).abs() < 1e-12);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 100.0);
    }

    #[test]
    fn test_population_std() {
        let s = Summary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.std, 2.0);
        assert_eq!(s.cov, 0.4);
    }

    #[test]
    fn test_zero_mean_cov_is_zero() {
        let s = Summary::from_samples(&[-1.0, 1.0]).unwrap();
        assert_eq!(s.cov, 0.0);
        assert_eq!(s.std, 1.0);
    }

    #[test]
    fn test_negative_mean_cov_is_absolute() {
        let s = Summary::from_samples(&[-1.0, -3.0]).unwrap();
        assert_eq!(s.cov, 0.5);
    }

    #[test]
    fn test_single_sample() {
        let s = Summary::from_samples(&[4.2]).unwrap();
        assert_eq!(s.median, 4.2);
        assert_eq!(s.p95, 4.2);
        assert_eq!(s.std, 0.0);
        assert_eq!(s.outliers, 0);
    }

    #[test]
    fn test_empty_samples_rejected() {
        assert!(matches!(Summary::from_samples(&[]), Err(LcaError::EmptySamples)));
    }

    #[test]
    fn test_record_serializes_with_column_names() {
        let summary = Summary::from_samples(&[1.0, 3.0]).unwrap();
        let record = StatRecord::new("Option 1", OVERALL_STAGE, Category::GwpTotal, &summary);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Design Option"], "Option 1");
        assert_eq!(json["Life Cycle Stage"], "A1-A5");
        assert_eq!(json["Impact Category"], "gwp_total");
        assert_eq!(json["95th Percentile"], 2.9);
        assert_eq!(json["Unit"], "kgCO2eq/FU");
    }
}
