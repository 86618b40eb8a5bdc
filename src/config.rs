//! Run configuration for [`MetropolisSampler`](crate::metropolis_hastings::MetropolisSampler).

use std::time::Duration;

use crate::data::{REFERENCE_INITIAL, REFERENCE_STEP};
use crate::error::ConfigError;
use crate::model::ParameterPair;

/// Which [`RandomSource`](crate::random::RandomSource) a run draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomMode {
    /// One generator seeded once per run.
    #[default]
    Seeded,
    /// Re-seed from the clock on every draw. Biased; kept for comparison with legacy output.
    LegacyClockReseed,
}

/**
Settings for one sampling run.

`Default` gives the reference run: 500 000 accepted draws, 1 000 of them burn-in, starting
at `(a, b) = (2.5, 28.82)` with proposal standard deviations `(0.025, 2.5)`.

# Examples

```rust
use linfit_mcmc::config::SamplerConfig;
use linfit_mcmc::model::ParameterPair;

let config = SamplerConfig::default()
    .chain_length(20_000)
    .burn_in(500)
    .initial(ParameterPair::new(1.0, 0.0))
    .seed(42);
assert!(config.validate().is_ok());

let bad = SamplerConfig::default().chain_length(100).burn_in(100);
assert!(bad.validate().is_err());
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Number of accepted draws to collect.
    pub chain_length: usize,
    /// Leading trace entries left out of the summary statistics.
    pub burn_in: usize,
    pub initial: ParameterPair,
    /// Proposal standard deviations for `a` and `b`.
    pub step_size: ParameterPair,
    pub random_mode: RandomMode,
    pub seed: Option<u64>,
    /// Stop with an error after this many proposals if the chain is not yet full.
    pub max_proposals: Option<u64>,
    /// Stop with an error once this much wall-clock time has passed.
    pub time_budget: Option<Duration>,
}

impl SamplerConfig {
    pub const REFERENCE_CHAIN_LENGTH: usize = 500_000;
    pub const REFERENCE_BURN_IN: usize = 1_000;

    /// The configuration of the reference run.
    pub fn reference() -> Self {
        Self {
            chain_length: Self::REFERENCE_CHAIN_LENGTH,
            burn_in: Self::REFERENCE_BURN_IN,
            initial: REFERENCE_INITIAL,
            step_size: REFERENCE_STEP,
            random_mode: RandomMode::Seeded,
            seed: None,
            max_proposals: None,
            time_budget: None,
        }
    }

    pub fn chain_length(mut self, chain_length: usize) -> Self {
        self.chain_length = chain_length;
        self
    }

    pub fn burn_in(mut self, burn_in: usize) -> Self {
        self.burn_in = burn_in;
        self
    }

    pub fn initial(mut self, initial: ParameterPair) -> Self {
        self.initial = initial;
        self
    }

    pub fn step_size(mut self, step_size: ParameterPair) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn random_mode(mut self, random_mode: RandomMode) -> Self {
        self.random_mode = random_mode;
        self
    }

    /// Fixes the seed of the [`RandomMode::Seeded`] generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_proposals(mut self, max_proposals: u64) -> Self {
        self.max_proposals = Some(max_proposals);
        self
    }

    pub fn time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = Some(time_budget);
        self
    }

    /// Checks every constraint that can be decided without the data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_length == 0 {
            return Err(ConfigError::ZeroChainLength);
        }
        if self.burn_in >= self.chain_length {
            return Err(ConfigError::BurnInNotLessThanChainLength {
                burn_in: self.burn_in,
                chain_length: self.chain_length,
            });
        }
        for (parameter, value) in [("a", self.step_size.a), ("b", self.step_size.b)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveStepSize { parameter, value });
            }
        }
        for (parameter, value) in [("a", self.initial.a), ("b", self.initial.b)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteInitialParameter { parameter, value });
            }
        }
        if self.max_proposals == Some(0) {
            return Err(ConfigError::ZeroProposalCap);
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = SamplerConfig::default();
        assert_eq!(config.chain_length, 500_000);
        assert_eq!(config.burn_in, 1_000);
        assert_eq!(config.initial, ParameterPair::new(2.5, 28.82));
        assert_eq!(config.step_size, ParameterPair::new(0.025, 2.5));
        assert_eq!(config.random_mode, RandomMode::Seeded);
        assert!(config.max_proposals.is_none());
        assert!(config.time_budget.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_burn_in_must_be_less_than_chain_length() {
        let err = SamplerConfig::default()
            .chain_length(10)
            .burn_in(10)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::BurnInNotLessThanChainLength {
                burn_in: 10,
                chain_length: 10
            }
        );
        assert!(SamplerConfig::default()
            .chain_length(10)
            .burn_in(9)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_chain_length() {
        let err = SamplerConfig::default()
            .chain_length(0)
            .burn_in(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroChainLength);
    }

    #[test]
    fn test_step_size_checks() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SamplerConfig::default()
                .step_size(ParameterPair::new(0.1, bad))
                .validate()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::NonPositiveStepSize { parameter: "b", .. }),
                "step {bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_initial_must_be_finite() {
        let err = SamplerConfig::default()
            .initial(ParameterPair::new(f64::NAN, 0.0))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonFiniteInitialParameter { parameter: "a", .. }
        ));
    }

    #[test]
    fn test_zero_proposal_cap() {
        let err = SamplerConfig::default()
            .max_proposals(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroProposalCap);
    }
}
