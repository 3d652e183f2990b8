//! Two-sample Kolmogorov-Smirnov comparison between background datasets
//!
//! The p-value uses the asymptotic Kolmogorov distribution with the usual
//! small-sample correction of λ.

use serde::Serialize;

use crate::core::aggregate::OptionSamples;
use crate::core::error::{LcaError, Result};
use crate::entities::impact::Category;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsResult {
    /// Largest distance between the two empirical CDFs
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sample K-S test
pub fn ks_two_sample(a: &[f64], b: &[f64]) -> Result<KsResult> {
    if a.is_empty() || b.is_empty() {
        return Err(LcaError::EmptySamples);
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (n, m) = (a.len(), b.len());
    let (mut i, mut j) = (0, 0);
    let mut statistic: f64 = 0.0;

    while i < n && j < m {
        let x = a[i].min(b[j]);
        while i < n && a[i] <= x {
            i += 1;
        }
        while j < m && b[j] <= x {
            j += 1;
        }
        statistic = statistic.max((i as f64 / n as f64 - j as f64 / m as f64).abs());
    }

    let en = ((n * m) as f64 / (n + m) as f64).sqrt();
    let p_value = kolmogorov_q((en + 0.12 + 0.11 / en) * statistic);

    Ok(KsResult { statistic, p_value })
}

/// Survival function of the Kolmogorov distribution
pub fn kolmogorov_q(lambda: f64) -> f64 {
    const EPS1: f64 = 0.001;
    const EPS2: f64 = 1.0e-8;

    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut previous: f64 = 0.0;

    for j in 1..=100 {
        let term = fac * (a2 * (j * j) as f64).exp();
        sum += term;
        if term.abs() <= EPS1 * previous || term.abs() <= EPS2 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        previous = term.abs();
    }

    // no convergence: λ is tiny and the distributions are indistinguishable
    1.0
}

/// One dataset tested against the reference dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairComparison {
    pub reference: String,
    pub other: String,
    pub result: KsResult,
}

/// Outcome for one impact category across all datasets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub category: Category,
    /// Sum of the pairwise statistics
    pub statistic: f64,
    /// Smallest pairwise p-value
    pub p_value: f64,
    pub significant: bool,
    pub pairs: Vec<PairComparison>,
}

/// Overall samples of all design options of a dataset, pooled
fn pooled(options: &[OptionSamples], category: Category) -> Vec<f64> {
    options
        .iter()
        .flat_map(|o| o.overall(category).iter().copied())
        .collect()
}

/// Test the first dataset against each of the others, per category
pub fn compare_datasets(
    datasets: &[(String, Vec<OptionSamples>)],
    alpha: f64,
) -> Result<Vec<CategoryComparison>> {
    if datasets.len() < 2 {
        return Err(LcaError::InvalidConfig(format!(
            "comparison needs at least two datasets, got {}",
            datasets.len()
        )));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(LcaError::InvalidConfig(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )));
    }

    let (reference_name, reference) = &datasets[0];
    let mut comparisons = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let base = pooled(reference, category);
        let mut pairs = Vec::with_capacity(datasets.len() - 1);

        for (name, options) in &datasets[1..] {
            let result = ks_two_sample(&base, &pooled(options, category))?;
            pairs.push(PairComparison {
                reference: reference_name.clone(),
                other: name.clone(),
                result,
            });
        }

        let statistic = pairs.iter().map(|p| p.result.statistic).sum();
        let p_value = pairs
            .iter()
            .map(|p| p.result.p_value)
            .fold(f64::INFINITY, f64::min);

        comparisons.push(CategoryComparison {
            category,
            statistic,
            p_value,
            significant: p_value < alpha,
            pairs,
        });
    }

    Ok(comparisons)
}
