//! Reward transform based on cumulative prospect theory.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Parameters of the prospect-theoretic utility applied to raw rewards.
///
/// The transform is
///
/// ```text
/// u(r) = max(r, 0)^alpha - lambda * max(-r, 0)^beta
/// ```
///
/// Gains and losses are clamped to non-negative bases before exponentiation,
/// so no fractional power ever sees a negative base. With `alpha < 1` gains
/// are diminished, and with `lambda > 1` losses weigh more than gains of the
/// same magnitude.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CptConfig {
    /// Diminishing-sensitivity exponent for gains, in `(0, 1]`.
    pub alpha: f64,

    /// Diminishing-sensitivity exponent for losses, in `(0, 1]`.
    pub beta: f64,

    /// Loss-aversion multiplier, at least 1.
    pub lambda: f64,
}

impl Default for CptConfig {
    /// The parameter estimates of Tversky and Kahneman (1992).
    fn default() -> Self {
        Self {
            alpha: 0.88,
            beta: 0.88,
            lambda: 2.25,
        }
    }
}

impl CptConfig {
    /// Sets the gain exponent.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the loss exponent.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the loss-aversion multiplier.
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Maps a raw reward to its subjective utility.
    pub fn utility(&self, r: f32) -> f32 {
        let gain = r.max(0.0).powf(self.alpha as f32);
        let loss = (-r).max(0.0).powf(self.beta as f32);
        gain - self.lambda as f32 * loss
    }

    /// Maps a batch of raw rewards element-wise, leaving the input untouched.
    pub fn utility_batch(&self, rewards: &[f32]) -> Vec<f32> {
        rewards.iter().map(|r| self.utility(*r)).collect()
    }

    /// Constructs [`CptConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CptConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CptConfig;

    #[test]
    fn test_zero_maps_to_zero() {
        assert_eq!(CptConfig::default().utility(0.0), 0.0);
    }

    #[test]
    fn test_gains_diminished() {
        let cpt = CptConfig::default();

        // r^alpha <= r holds for r >= 1 when alpha < 1.
        for r in [1.0f32, 2.0, 10.0, 100.0] {
            let u = cpt.utility(r);
            assert!(u > 0.0);
            assert!(u <= r);
        }

        // Sub-unit gains are lifted towards 1 instead.
        for r in [0.1f32, 0.5] {
            let u = cpt.utility(r);
            assert!(u > r);
            assert!(u < 1.0);
        }
    }

    #[test]
    fn test_alpha_one_is_identity_on_gains() {
        let cpt = CptConfig::default().alpha(1.0);
        for r in [0.5f32, 1.0, 3.0, 42.0] {
            assert_eq!(cpt.utility(r), r);
        }
    }

    #[test]
    fn test_losses_amplified_and_monotone() {
        let cpt = CptConfig::default();

        // Loss magnitude grows with |r|.
        let mut prev = 0.0f32;
        for r in [-0.5f32, -1.0, -2.0, -10.0] {
            let u = cpt.utility(r);
            assert!(u < 0.0);
            assert!(u < prev);
            prev = u;
        }

        // Loss magnitude grows with lambda.
        let mild = CptConfig::default().lambda(1.0).utility(-2.0);
        let harsh = CptConfig::default().lambda(3.0).utility(-2.0);
        assert!(harsh < mild);

        // Unit loss weighs more than unit gain.
        let u_gain = cpt.utility(1.0);
        let u_loss = cpt.utility(-1.0);
        assert!(u_loss.abs() > u_gain.abs());
    }

    #[test]
    fn test_batch_does_not_mutate_input() {
        let cpt = CptConfig::default();
        let rewards = vec![1.0f32, -1.0, 0.0];
        let shaped = cpt.utility_batch(&rewards);
        assert_eq!(rewards, vec![1.0, -1.0, 0.0]);
        assert_eq!(shaped.len(), 3);
        assert_eq!(shaped[2], 0.0);
    }
}
