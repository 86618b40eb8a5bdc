/*!
# Metropolis–Hastings Sampler for a Straight-Line Fit

Samples the posterior of `(a, b)` in `y = a * x + b` given observations with known variances.
Each proposal perturbs `a` and `b` independently with Gaussian noise centred on the current
accepted pair. The chi-squared score plays the role of `-2 log L`, so a proposal is accepted
with probability

\[
\alpha = \min\left(1, \exp\left(\frac{\chi^2_\text{current} - \chi^2_\text{trial}}{2}\right)\right).
\]

The run ends once `chain_length` proposals have been **accepted**, however many proposals that
takes. With a very low acceptance rate this is unbounded; [`SamplerConfig::max_proposals`] and
[`SamplerConfig::time_budget`] turn that into an error instead.

## Example Usage

```rust
use linfit_mcmc::config::SamplerConfig;
use linfit_mcmc::data::reference_observations;
use linfit_mcmc::metropolis_hastings::MetropolisSampler;

let config = SamplerConfig::default()
    .chain_length(5_000)
    .burn_in(1_000)
    .seed(42);
let sampler = MetropolisSampler::new(reference_observations(), config).unwrap();
let outcome = sampler.run().unwrap();

assert_eq!(outcome.trace.len(), 5_000);
assert!(outcome.summary.proposed >= 5_000);
assert!(outcome.summary.acceptance_rate > 0.0 && outcome.summary.acceptance_rate < 1.0);
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::config::SamplerConfig;
use crate::core::MarkovChain;
use crate::error::{DataError, Error, Result};
use crate::likelihood::ObservationSet;
use crate::model::{LinearModel, ParameterPair};
use crate::random::{RandomSource, Source};
use crate::stats::{AcceptanceTracker, PosteriorSummary, Trace};

/// Below this, `exp` underflows to zero anyway.
const MIN_LOG_ALPHA: f64 = -745.0;

/// Proposals between wall-clock checks when a time budget is set.
const TIME_CHECK_INTERVAL: u64 = 4096;

/**
Probability of accepting a move from a state scoring `chi_current` to one scoring `chi_trial`.

Always in `[0, 1]`; exactly `1.0` when the trial scores no worse. Exponents below the
underflow limit of `exp` are flushed to zero and positive ones never reach `exp`, so
arbitrarily large score differences neither overflow nor produce NaN. A non-finite trial
score is never accepted.

```rust
use linfit_mcmc::metropolis_hastings::acceptance_probability;

assert_eq!(acceptance_probability(10.0, 4.0), 1.0);
assert_eq!(acceptance_probability(10.0, 12.0), (-1.0f64).exp());
assert_eq!(acceptance_probability(0.0, 1e308), 0.0);
```
*/
pub fn acceptance_probability(chi_current: f64, chi_trial: f64) -> f64 {
    if !chi_trial.is_finite() {
        return 0.0;
    }
    if chi_trial <= chi_current {
        return 1.0;
    }
    let log_alpha = (chi_current - chi_trial) / 2.0;
    if log_alpha < MIN_LOG_ALPHA {
        trace!(chi_current, chi_trial, "acceptance exponent clamped");
        return 0.0;
    }
    log_alpha.exp()
}

/// Where a sampler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Inputs validated and the starting point scored; no proposal made yet.
    Initializing,
    Sampling,
    /// The trace is full. Its first `burn_in` draws will be left out of the summary.
    BurnInExcluded,
    Summarized,
}

/// The running state of the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainState {
    /// Current accepted pair.
    pub current: ParameterPair,
    /// Chi-squared score of `current`.
    pub chi_squared: f64,
    pub accepted: usize,
    /// Every proposal, accepted or not.
    pub proposed: u64,
}

impl ChainState {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }
}

/// Everything a completed run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub summary: PosteriorSummary,
    /// All accepted draws, burn-in included. Drop it if only the summary is needed.
    pub trace: Trace,
    pub final_state: ChainState,
}

/**
A single Metropolis–Hastings chain over `(a, b)`.

The sampler owns its random source, chain state and trace; independent chains are
independent instances. `R` defaults to [`Source`], which is what [`MetropolisSampler::new`]
builds from [`SamplerConfig::random_mode`]. Use [`MetropolisSampler::with_source`] to supply
any other [`RandomSource`].
*/
#[derive(Debug, Clone)]
pub struct MetropolisSampler<R: RandomSource = Source> {
    observations: ObservationSet,
    config: SamplerConfig,
    rng: R,
    state: ChainState,
    trace: Trace,
    phase: Phase,
    predicted: Vec<f64>,
}

impl MetropolisSampler<Source> {
    /// Validates `config` and prepares a chain using the random mode it selects.
    pub fn new(observations: ObservationSet, config: SamplerConfig) -> Result<Self> {
        let rng = Source::from_mode(config.random_mode, config.seed);
        Self::with_source(observations, config, rng)
    }

    /**
    Convenience constructor taking the raw `x`, `y` and **variance** columns.

    ```rust
    use linfit_mcmc::config::SamplerConfig;
    use linfit_mcmc::error::{DataError, Error};
    use linfit_mcmc::metropolis_hastings::MetropolisSampler;

    let err = MetropolisSampler::from_slices(
        &[1.0, 2.0],
        &[1.0, 2.0],
        &[1.0, 0.0],
        SamplerConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Data(DataError::NonPositiveVariance { index: 1, .. })));
    ```
    */
    pub fn from_slices(
        x: &[f64],
        y: &[f64],
        variance: &[f64],
        config: SamplerConfig,
    ) -> Result<Self> {
        let observations = ObservationSet::new(x, y, variance)?;
        Self::new(observations, config)
    }
}

impl<R: RandomSource> MetropolisSampler<R> {
    /// Like [`new`](MetropolisSampler::new) but draws from `rng`; `config.random_mode` and
    /// `config.seed` are ignored.
    pub fn with_source(observations: ObservationSet, config: SamplerConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let trace = Trace::with_capacity(config.chain_length, config.burn_in)?;

        let mut predicted = Vec::with_capacity(observations.len());
        LinearModel::evaluate_into(
            observations.x(),
            config.initial.a,
            config.initial.b,
            &mut predicted,
        );
        let chi_squared = observations.score_predictions(&predicted);
        if !chi_squared.is_finite() {
            return Err(DataError::NonFiniteInitialScore {
                initial: config.initial,
            }
            .into());
        }
        debug!(
            initial = %config.initial,
            chi_squared,
            n_observations = observations.len(),
            "chain initialized"
        );

        Ok(Self {
            state: ChainState {
                current: config.initial,
                chi_squared,
                accepted: 0,
                proposed: 0,
            },
            observations,
            config,
            rng,
            trace,
            phase: Phase::Initializing,
            predicted,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    pub fn is_complete(&self) -> bool {
        self.trace.is_full()
    }

    /// Proposes until `chain_length` draws have been accepted.
    pub fn sample(&mut self) -> Result<()> {
        self.sample_with(|_, _| {})
    }

    /**
    Same as [`sample`](Self::sample) with an [`indicatif`] progress bar showing accepted
    draws against the chain length, the overall acceptance rate and the rate over the last
    100 proposals. The bar is refreshed about every 500 ms.
    */
    pub fn sample_progress(&mut self) -> Result<()> {
        const UPDATE_INTERVAL: Duration = Duration::from_millis(500);

        let pb = ProgressBar::new(self.config.chain_length as u64);
        let style = ProgressStyle::default_bar()
            .template("{prefix:8} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.set_prefix("MH");

        let mut tracker = AcceptanceTracker::default();
        let mut last_update = Instant::now();
        let result = self.sample_with(|state, accepted| {
            tracker.record(accepted);
            if last_update.elapsed() >= UPDATE_INTERVAL {
                pb.set_position(state.accepted as u64);
                pb.set_message(format!(
                    "AcceptRate={:.3} p(accept)≈{:.2}",
                    tracker.overall_rate(),
                    tracker.recent_rate()
                ));
                last_update = Instant::now();
            }
        });

        pb.set_position(self.state.accepted as u64);
        match &result {
            Ok(()) => pb.finish_with_message(format!(
                "Done! AcceptRate={:.3}",
                self.state.acceptance_rate()
            )),
            Err(e) => pb.abandon_with_message(e.to_string()),
        }
        result
    }

    fn sample_with<F>(&mut self, mut on_step: F) -> Result<()>
    where
        F: FnMut(&ChainState, bool),
    {
        let started = Instant::now();
        info!(
            chain_length = self.config.chain_length,
            burn_in = self.config.burn_in,
            seed = ?self.rng.seed(),
            "sampling started"
        );

        while !self.trace.is_full() {
            let accepted = self.step();
            on_step(&self.state, accepted);
            self.check_guards(started)?;
        }

        info!(
            accepted = self.state.accepted,
            proposed = self.state.proposed,
            acceptance_rate = self.state.acceptance_rate(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sampling finished"
        );
        Ok(())
    }

    fn check_guards(&self, started: Instant) -> Result<()> {
        if self.trace.is_full() {
            return Ok(());
        }
        if let Some(cap) = self.config.max_proposals {
            if self.state.proposed >= cap {
                warn!(
                    cap,
                    accepted = self.state.accepted,
                    "proposal cap reached before the chain was full"
                );
                return Err(Error::ProposalBudgetExhausted {
                    accepted: self.state.accepted,
                    proposed: self.state.proposed,
                });
            }
        }
        if let Some(budget) = self.config.time_budget {
            if self.state.proposed % TIME_CHECK_INTERVAL == 0 && started.elapsed() >= budget {
                warn!(
                    budget_ms = budget.as_millis() as u64,
                    accepted = self.state.accepted,
                    "time budget exceeded before the chain was full"
                );
                return Err(Error::TimeBudgetExceeded {
                    accepted: self.state.accepted,
                    proposed: self.state.proposed,
                });
            }
        }
        Ok(())
    }

    /// Drops the burn-in from the trace view and computes the posterior summary.
    ///
    /// Works on a partial chain too, as long as some draw lies past the burn-in.
    pub fn summarize(&mut self) -> Result<PosteriorSummary> {
        debug!(
            burn_in = self.trace.burn_in(),
            kept = self.trace.post_burn_in().len(),
            "burn-in excluded"
        );
        let summary = PosteriorSummary::from_trace(&self.trace, self.state.proposed).ok_or(
            Error::InsufficientDraws {
                accepted: self.state.accepted,
                burn_in: self.trace.burn_in(),
            },
        )?;
        self.phase = Phase::Summarized;
        info!(
            a = summary.mean.a,
            b = summary.mean.b,
            acceptance_rate = summary.acceptance_rate,
            "posterior summarized"
        );
        Ok(summary)
    }

    /// Samples to completion and summarises.
    pub fn run(mut self) -> Result<RunOutcome> {
        self.sample()?;
        self.finish()
    }

    /// [`run`](Self::run) with a progress bar.
    pub fn run_progress(mut self) -> Result<RunOutcome> {
        self.sample_progress()?;
        self.finish()
    }

    fn finish(mut self) -> Result<RunOutcome> {
        let summary = self.summarize()?;
        Ok(RunOutcome {
            summary,
            trace: self.trace,
            final_state: self.state,
        })
    }
}

impl<R: RandomSource> MarkovChain<ParameterPair> for MetropolisSampler<R> {
    /**
    Makes one proposal.

    Draws the trial `a`, then the trial `b`, then the uniform used for the accept decision.
    Once the trace is full this does nothing and returns `false`, so the accepted count never
    exceeds the chain length.
    */
    fn step(&mut self) -> bool {
        if self.trace.is_full() {
            return false;
        }
        self.phase = Phase::Sampling;

        let current = self.state.current;
        let step = self.config.step_size;
        let trial = ParameterPair::new(
            self.rng.gaussian(current.a, step.a),
            self.rng.gaussian(current.b, step.b),
        );

        LinearModel::evaluate_into(self.observations.x(), trial.a, trial.b, &mut self.predicted);
        let chi_trial = self.observations.score_predictions(&self.predicted);
        let alpha = acceptance_probability(self.state.chi_squared, chi_trial);
        let u = self.rng.uniform();

        self.state.proposed += 1;
        if u <= alpha {
            self.state.current = trial;
            self.state.chi_squared = chi_trial;
            self.state.accepted += 1;
            self.trace.push(trial);
            if self.trace.is_full() {
                self.phase = Phase::BurnInExcluded;
            }
            true
        } else {
            false
        }
    }

    fn current_state(&self) -> &ParameterPair {
        &self.state.current
    }
}
