//! The accepted-draw trace, posterior summaries computed from it, and a small
//! sliding-window acceptance tracker used for progress reporting.

use ndarray::prelude::*;
use ndarray_stats::CorrelationExt;
use std::collections::VecDeque;
use std::fmt;

use crate::error::ConfigError;
use crate::model::ParameterPair;

/**
Append-only record of accepted parameter pairs, one entry per acceptance.

The first `burn_in` entries stay in the trace but are left out of [`post_burn_in`]
and of every summary statistic.

[`post_burn_in`]: Trace::post_burn_in
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    draws: Vec<ParameterPair>,
    capacity: usize,
    burn_in: usize,
}

impl Trace {
    /// Reserves room for exactly `capacity` draws, failing instead of aborting on OOM.
    pub fn with_capacity(capacity: usize, burn_in: usize) -> Result<Self, ConfigError> {
        let mut draws = Vec::new();
        draws
            .try_reserve_exact(capacity)
            .map_err(|_| ConfigError::TraceAllocation {
                chain_length: capacity,
            })?;
        Ok(Self {
            draws,
            capacity,
            burn_in,
        })
    }

    /// Appends a draw. Returns `false`, leaving the trace unchanged, once it is full.
    pub fn push(&mut self, draw: ParameterPair) -> bool {
        if self.is_full() {
            return false;
        }
        self.draws.push(draw);
        true
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.draws.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    /// Every accepted draw, burn-in included.
    pub fn all(&self) -> &[ParameterPair] {
        &self.draws
    }

    pub fn post_burn_in(&self) -> &[ParameterPair] {
        self.draws.get(self.burn_in..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<ParameterPair> {
        self.draws.last().copied()
    }

    /// The full trace as an `[len, 2]` array with columns `a`, `b`.
    pub fn to_array(&self) -> Array2<f64> {
        pairs_to_array(&self.draws)
    }

    /// The post-burn-in trace as an `[len - burn_in, 2]` array.
    pub fn post_burn_in_array(&self) -> Array2<f64> {
        pairs_to_array(self.post_burn_in())
    }

    pub fn into_vec(self) -> Vec<ParameterPair> {
        self.draws
    }
}

fn pairs_to_array(draws: &[ParameterPair]) -> Array2<f64> {
    Array2::from_shape_fn((draws.len(), 2), |(i, j)| {
        if j == 0 {
            draws[i].a
        } else {
            draws[i].b
        }
    })
}

/// Posterior point estimates and chain diagnostics for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSummary {
    pub accepted: usize,
    pub proposed: u64,
    /// `accepted / proposed`.
    pub acceptance_rate: f64,
    /// Arithmetic mean of the post-burn-in draws.
    pub mean: ParameterPair,
    pub std_dev: ParameterPair,
    /// 2x2 sample covariance of `(a, b)` over the post-burn-in draws.
    pub covariance: Array2<f64>,
    /// Number of draws the statistics were computed from.
    pub n_kept: usize,
}

impl PosteriorSummary {
    /// Summarises `trace` after dropping its burn-in. Returns `None` if nothing is left.
    pub fn from_trace(trace: &Trace, proposed: u64) -> Option<Self> {
        let kept = trace.post_burn_in_array();
        let n_kept = kept.nrows();
        let mean = kept.mean_axis(Axis(0))?;

        let covariance = if n_kept >= 2 {
            kept.t().cov(1.0).ok()?
        } else {
            Array2::zeros((2, 2))
        };

        let acceptance_rate = if proposed == 0 {
            0.0
        } else {
            trace.len() as f64 / proposed as f64
        };

        Some(Self {
            accepted: trace.len(),
            proposed,
            acceptance_rate,
            mean: ParameterPair::new(mean[0], mean[1]),
            std_dev: ParameterPair::new(covariance[[0, 0]].sqrt(), covariance[[1, 1]].sqrt()),
            covariance,
            n_kept,
        })
    }

    /// Pearson correlation between `a` and `b`, `0.0` if either is constant.
    pub fn correlation(&self) -> f64 {
        let denom = self.std_dev.a * self.std_dev.b;
        if denom > 0.0 {
            self.covariance[[0, 1]] / denom
        } else {
            0.0
        }
    }
}

impl fmt::Display for PosteriorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "proposed: {}, accepted: {}", self.proposed, self.accepted)?;
        writeln!(f, "acceptance rate: {:.4}", self.acceptance_rate)?;
        writeln!(f, "a: {:.6} +/- {:.6}", self.mean.a, self.std_dev.a)?;
        write!(f, "b: {:.6} +/- {:.6}", self.mean.b, self.std_dev.b)
    }
}

/// Acceptance rate over the most recent `window` proposals plus the running total.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceTracker {
    window: usize,
    recent: VecDeque<bool>,
    recent_accepted: usize,
    accepted: u64,
    proposed: u64,
}

impl AcceptanceTracker {
    pub const DEFAULT_WINDOW: usize = 100;

    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            recent: VecDeque::with_capacity(window),
            recent_accepted: 0,
            accepted: 0,
            proposed: 0,
        }
    }

    pub fn record(&mut self, accepted: bool) {
        self.proposed += 1;
        self.accepted += accepted as u64;
        self.recent.push_back(accepted);
        self.recent_accepted += accepted as usize;
        if self.recent.len() > self.window {
            if let Some(true) = self.recent.pop_front() {
                self.recent_accepted -= 1;
            }
        }
    }

    /// Acceptance rate over the sliding window.
    pub fn recent_rate(&self) -> f64 {
        if self.recent.is_empty() {
            0.0
        } else {
            self.recent_accepted as f64 / self.recent.len() as f64
        }
    }

    pub fn overall_rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }
}

impl Default for AcceptanceTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn trace_of(pairs: &[(f64, f64)], burn_in: usize) -> Trace {
        let mut trace = Trace::with_capacity(pairs.len(), burn_in).unwrap();
        for &p in pairs {
            assert!(trace.push(p.into()));
        }
        trace
    }

    #[test]
    fn test_trace_is_capacity_bounded() {
        let mut trace = Trace::with_capacity(2, 0).unwrap();
        assert!(trace.push(ParameterPair::new(1.0, 1.0)));
        assert!(trace.push(ParameterPair::new(2.0, 2.0)));
        assert!(trace.is_full());
        assert!(!trace.push(ParameterPair::new(3.0, 3.0)));
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.last(), Some(ParameterPair::new(2.0, 2.0)));
    }

    #[test]
    fn test_burn_in_kept_in_trace_but_not_in_summary() {
        let trace = trace_of(&[(100.0, -100.0), (1.0, 2.0), (3.0, 4.0)], 1);
        assert_eq!(trace.all().len(), 3);
        assert_eq!(trace.post_burn_in().len(), 2);
        assert_eq!(trace.to_array().shape(), &[3, 2]);
        assert_eq!(trace.post_burn_in_array(), array![[1.0, 2.0], [3.0, 4.0]]);

        let summary = PosteriorSummary::from_trace(&trace, 6).unwrap();
        assert_eq!(summary.mean, ParameterPair::new(2.0, 3.0));
        assert_eq!(summary.n_kept, 2);
        assert_eq!(summary.accepted, 3);
        assert_abs_diff_eq!(summary.acceptance_rate, 0.5);
        assert_abs_diff_eq!(summary.covariance, array![[2.0, 2.0], [2.0, 2.0]], epsilon = 1e-12);
        assert_abs_diff_eq!(summary.correlation(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_of_single_kept_draw() {
        let trace = trace_of(&[(0.0, 0.0), (5.0, 6.0)], 1);
        let summary = PosteriorSummary::from_trace(&trace, 2).unwrap();
        assert_eq!(summary.mean, ParameterPair::new(5.0, 6.0));
        assert_eq!(summary.std_dev, ParameterPair::new(0.0, 0.0));
        assert_eq!(summary.correlation(), 0.0);
    }

    #[test]
    fn test_summary_of_empty_post_burn_in_is_none() {
        let trace = trace_of(&[(1.0, 1.0)], 1);
        assert!(PosteriorSummary::from_trace(&trace, 1).is_none());
    }

    #[test]
    fn test_acceptance_tracker_window() {
        let mut tracker = AcceptanceTracker::new(4);
        for accepted in [true, true, false, false, false, false] {
            tracker.record(accepted);
        }
        assert_eq!(tracker.recent_rate(), 0.0);
        assert_abs_diff_eq!(tracker.overall_rate(), 2.0 / 6.0);

        tracker.record(true);
        assert_abs_diff_eq!(tracker.recent_rate(), 0.25);
    }
}
