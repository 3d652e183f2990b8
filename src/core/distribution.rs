//! Emission factor distributions
//!
//! Each (mean, cov) pair becomes a univariate distribution with that mean and
//! standard deviation |mean|·cov:
//! - mean > 0: log-normal by moment matching, so draws stay positive
//! - mean ≤ 0: normal (biogenic storage factors are legitimately negative)
//! - zero spread: point mass at the mean

use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

use crate::core::error::{LcaError, Result};
use crate::entities::factor::EmissionFactor;
use crate::entities::impact::Category;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorDistribution {
    /// Degenerate distribution (cov = 0 or mean = 0)
    Point(f64),
    /// Log-normal with parameters of the underlying normal
    LogNormal {
        mu: f64,
        sigma: f64,
        inner: LogNormal<f64>,
    },
    Normal {
        mean: f64,
        std_dev: f64,
        inner: Normal<f64>,
    },
}

impl FactorDistribution {
    /// Build the distribution for one channel of one factor
    ///
    /// `key` and `channel` only serve to name the factor in errors.
    pub fn build(key: &str, channel: Category, mean: f64, cov: f64) -> Result<Self> {
        if !(cov.is_finite() && cov >= 0.0) {
            return Err(LcaError::InvalidCov {
                key: key.to_string(),
                channel,
                cov,
            });
        }
        if !mean.is_finite() {
            return Err(LcaError::InvalidMean {
                key: key.to_string(),
                channel,
                mean,
            });
        }

        let std_dev = mean.abs() * cov;
        if std_dev == 0.0 {
            return Ok(FactorDistribution::Point(mean));
        }

        let invalid = |_| LcaError::InvalidCov {
            key: key.to_string(),
            channel,
            cov,
        };

        if mean > 0.0 {
            let variance = std_dev * std_dev;
            let sigma = (variance / (mean * mean) + 1.0).ln().sqrt();
            let mu = mean.ln() - 0.5 * sigma * sigma;
            let inner = LogNormal::new(mu, sigma).map_err(invalid)?;
            Ok(FactorDistribution::LogNormal { mu, sigma, inner })
        } else {
            let inner = Normal::new(mean, std_dev).map_err(invalid)?;
            Ok(FactorDistribution::Normal {
                mean,
                std_dev,
                inner,
            })
        }
    }

    /// The four channel distributions of a factor, in category order
    pub fn for_factor(factor: &EmissionFactor) -> Result<[FactorDistribution; 4]> {
        let build = |channel: Category| {
            FactorDistribution::build(&factor.material, channel, factor.mean(channel), factor.cov)
        };
        Ok([
            build(Category::GwpTotal)?,
            build(Category::GwpFossil)?,
            build(Category::GwpBiogenic)?,
            build(Category::GwpLuluc)?,
        ])
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            FactorDistribution::Point(value) => *value,
            FactorDistribution::LogNormal { inner, .. } => inner.sample(rng),
            FactorDistribution::Normal { inner, .. } => inner.sample(rng),
        }
    }

    /// Theoretical mean
    pub fn mean(&self) -> f64 {
        match self {
            FactorDistribution::Point(value) => *value,
            FactorDistribution::LogNormal { mu, sigma, .. } => (mu + 0.5 * sigma * sigma).exp(),
            FactorDistribution::Normal { mean, .. } => *mean,
        }
    }

    /// Theoretical standard deviation
    pub fn std_dev(&self) -> f64 {
        match self {
            FactorDistribution::Point(_) => 0.0,
            FactorDistribution::LogNormal { mu, sigma, .. } => {
                let s2 = sigma * sigma;
                ((s2.exp() - 1.0) * (2.0 * mu + s2).exp()).sqrt()
            }
            FactorDistribution::Normal { std_dev, .. } => *std_dev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_stats(dist: &FactorDistribution, n: usize, seed: u64) -> (f64, f64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let samples: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn test_lognormal_moment_matching() {
        let dist = FactorDistribution::build("bitumen", Category::GwpTotal, 0.55, 0.3).unwrap();
        assert!(matches!(dist, FactorDistribution::LogNormal { .. }));
        assert!((dist.mean() - 0.55).abs() < 1e-12);
        assert!((dist.std_dev() - 0.165).abs() < 1e-12);

        let (mean, std) = sample_stats(&dist, 100_000, 42);
        let cov = std / mean;
        assert!((mean - 0.55).abs() / 0.55 < 0.01, "sample mean {}", mean);
        assert!((cov - 0.3).abs() / 0.3 < 0.02, "sample cov {}", cov);
    }

    #[test]
    fn test_lognormal_draws_are_positive() {
        let dist = FactorDistribution::build("cement", Category::GwpFossil, 0.8, 1.5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!((0..10_000).all(|_| dist.sample(&mut rng) > 0.0));
    }

    #[test]
    fn test_negative_mean_uses_normal() {
        let dist = FactorDistribution::build("timber", Category::GwpBiogenic, -1.2, 0.25).unwrap();
        assert!(matches!(dist, FactorDistribution::Normal { .. }));
        assert_eq!(dist.std_dev(), 0.3);

        let (mean, std) = sample_stats(&dist, 100_000, 7);
        assert!((mean + 1.2).abs() < 0.01, "sample mean {}", mean);
        assert!((std - 0.3).abs() / 0.3 < 0.02, "sample std {}", std);
    }

    #[test]
    fn test_zero_mean_and_zero_cov_collapse_to_point() {
        let zero = FactorDistribution::build("sand", Category::GwpLuluc, 0.0, 0.5).unwrap();
        assert_eq!(zero, FactorDistribution::Point(0.0));

        let fixed = FactorDistribution::build("sand", Category::GwpTotal, 0.004, 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(fixed.sample(&mut rng), 0.004);
    }

    #[test]
    fn test_invalid_parameters_fail_eagerly() {
        let err = FactorDistribution::build("diesel", Category::GwpTotal, 3.2, -0.1).unwrap_err();
        assert!(matches!(err, LcaError::InvalidCov { ref key, .. } if key == "diesel"));

        assert!(FactorDistribution::build("diesel", Category::GwpTotal, 3.2, f64::NAN).is_err());
        assert!(
            FactorDistribution::build("diesel", Category::GwpTotal, f64::INFINITY, 0.1).is_err()
        );
    }
}
