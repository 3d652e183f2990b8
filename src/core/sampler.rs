//! Monte Carlo sampler
//!
//! For K emission factors the sampler holds 4K independent distributions and
//! draws an N × 4K matrix: one row per iteration, four consecutive columns per
//! factor in dataset order. Row i is projected into the factor set that every
//! stage of every layer reads during iteration i.

use rand::Rng;

use crate::core::distribution::FactorDistribution;
use crate::core::error::{LcaError, Result};
use crate::entities::factor::{EmissionFactor, FactorIndex, FactorSet, SampledEmissionFactor};
use crate::entities::impact::Impact;

/// Columns per emission factor (total, fossil, biogenic, luluc)
pub const CHANNELS: usize = 4;

/// Row-major N × 4K matrix of draws
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    /// Build from explicit rows (used to inject known draws)
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(LcaError::MatrixShape {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |i| self.data[i * self.cols + j])
    }
}

/// Distributions of one dataset, ready to draw from
#[derive(Debug, Clone)]
pub struct Sampler {
    distributions: Vec<FactorDistribution>,
}

impl Sampler {
    /// Build every distribution up front; invalid parameters fail here,
    /// before any draw
    pub fn new(factors: &[EmissionFactor]) -> Result<Self> {
        let mut distributions = Vec::with_capacity(factors.len() * CHANNELS);
        for factor in factors {
            distributions.extend(FactorDistribution::for_factor(factor)?);
        }
        Ok(Self { distributions })
    }

    pub fn columns(&self) -> usize {
        self.distributions.len()
    }

    /// Draw `n` iterations; columns are sampled independently
    pub fn draw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> SampleMatrix {
        let cols = self.distributions.len();
        let mut data = vec![0.0; n * cols];
        for (j, dist) in self.distributions.iter().enumerate() {
            for i in 0..n {
                data[i * cols + j] = dist.sample(rng);
            }
        }
        SampleMatrix {
            rows: n,
            cols,
            data,
        }
    }
}

/// Project one matrix row into sampled factors, in dataset order
pub fn project_row(factors: &[EmissionFactor], row: &[f64]) -> Result<Vec<SampledEmissionFactor>> {
    let expected = factors.len() * CHANNELS;
    if row.len() != expected {
        return Err(LcaError::MatrixShape {
            expected,
            actual: row.len(),
        });
    }

    Ok(factors
        .iter()
        .zip(row.chunks_exact(CHANNELS))
        .map(|(factor, values)| SampledEmissionFactor {
            material: factor.material.clone(),
            values: Impact::from_slice(values).unwrap_or_default(),
            unit: factor.unit.clone(),
        })
        .collect())
}

/// The shared world state of iteration `i`
pub fn iteration_factors<'a>(
    index: &'a FactorIndex,
    factors: &[EmissionFactor],
    matrix: &SampleMatrix,
    i: usize,
) -> Result<FactorSet<'a>> {
    Ok(FactorSet::sampled(index, project_row(factors, matrix.row(i))?))
}

/// Derive an independent stream seed (splitmix64 finalizer)
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base
        .wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn factors() -> Vec<EmissionFactor> {
        vec![
            EmissionFactor::new("bitumen", Impact::new(0.5, 0.45, 0.04, 0.01), 0.2, "kg"),
            EmissionFactor::new("timber", Impact::new(-1.0, 0.1, -1.2, 0.1), 0.1, "kg"),
            EmissionFactor::new("diesel", Impact::new(3.2, 3.1, 0.1, 0.0), 0.0, "kg"),
        ]
    }

    #[test]
    fn test_draw_shape_and_point_columns() {
        let sampler = Sampler::new(&factors()).unwrap();
        assert_eq!(sampler.columns(), 12);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let matrix = sampler.draw(50, &mut rng);
        assert_eq!(matrix.rows(), 50);
        assert_eq!(matrix.cols(), 12);

        // diesel has cov 0: its columns are constant
        assert!(matrix.column(8).all(|v| v == 3.2));
        assert!(matrix.column(11).all(|v| v == 0.0));
        // bitumen total is log-normal: strictly positive
        assert!(matrix.column(0).all(|v| v > 0.0));
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let sampler = Sampler::new(&factors()).unwrap();
        let a = sampler.draw(20, &mut ChaCha8Rng::seed_from_u64(5));
        let b = sampler.draw(20, &mut ChaCha8Rng::seed_from_u64(5));
        let c = sampler.draw(20, &mut ChaCha8Rng::seed_from_u64(6));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_project_row_keeps_dataset_order() {
        let row: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let sampled = project_row(&factors(), &row).unwrap();
        assert_eq!(sampled.len(), 3);
        assert_eq!(sampled[1].material, "timber");
        assert_eq!(sampled[1].values, Impact::new(4.0, 5.0, 6.0, 7.0));
        assert_eq!(sampled[2].values.gwp_total, 8.0);
    }

    #[test]
    fn test_project_row_rejects_wrong_width() {
        let err = project_row(&factors(), &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, LcaError::MatrixShape { expected: 12, actual: 2 }));
    }

    #[test]
    fn test_invalid_cov_fails_before_sampling() {
        let mut bad = factors();
        bad[1].cov = -0.5;
        assert!(matches!(
            Sampler::new(&bad).unwrap_err(),
            LcaError::InvalidCov { ref key, .. } if key == "timber"
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        let m = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_derive_seed_streams_differ() {
        assert_ne!(derive_seed(1, 0), derive_seed(1, 1));
        assert_eq!(derive_seed(1, 3), derive_seed(1, 3));
    }
}
