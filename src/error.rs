//! Error types for setting up and running the sampler.
//!
//! Configuration and data problems are detected before the first proposal is made;
//! the two guard errors are the only ones that can surface once sampling has begun.

use thiserror::Error;

use crate::model::ParameterPair;

/// Problems with a [`SamplerConfig`](crate::config::SamplerConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("chain length must be positive")]
    ZeroChainLength,

    /// Summary statistics would average over an empty post-burn-in trace.
    #[error("burn-in ({burn_in}) must be strictly less than chain length ({chain_length})")]
    BurnInNotLessThanChainLength { burn_in: usize, chain_length: usize },

    #[error("proposal standard deviation for `{parameter}` must be positive and finite, got {value}")]
    NonPositiveStepSize { parameter: &'static str, value: f64 },

    #[error("initial value for `{parameter}` must be finite, got {value}")]
    NonFiniteInitialParameter { parameter: &'static str, value: f64 },

    #[error("proposal cap must be positive when set")]
    ZeroProposalCap,

    #[error("could not reserve a trace of {chain_length} entries")]
    TraceAllocation { chain_length: usize },
}

/// Problems with the observation arrays.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("observation set is empty")]
    Empty,

    #[error("length mismatch: {what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The third observation column is a variance, so it has to be strictly positive.
    #[error("variance at index {index} must be positive, got {value}")]
    NonPositiveVariance { index: usize, value: f64 },

    #[error("{what} at index {index} is not finite")]
    NonFiniteValue { what: &'static str, index: usize },

    /// Finite inputs whose chi-squared at the starting point overflows to infinity.
    #[error("chi-squared at the initial point ({initial}) is not finite")]
    NonFiniteInitialScore { initial: ParameterPair },
}

/// Top-level error returned by the sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Summary statistics were requested while every accepted draw is still burn-in.
    #[error("only {accepted} draws accepted, need more than the burn-in of {burn_in}")]
    InsufficientDraws { accepted: usize, burn_in: usize },

    #[error("proposal cap reached after {proposed} proposals with only {accepted} accepted")]
    ProposalBudgetExhausted { accepted: usize, proposed: u64 },

    #[error("time budget exceeded after {proposed} proposals with {accepted} accepted")]
    TimeBudgetExceeded { accepted: usize, proposed: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
