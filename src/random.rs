/*!
Sources of uniform and Gaussian random draws for the sampler.

Two generators are provided and the choice between them is explicit:

- [`SeededSource`] owns a single [`SmallRng`] that is seeded once, either from a caller
  supplied seed or from the thread RNG, and every draw advances that one stream.
- [`ClockReseededSource`] re-creates its generator from a wall-clock reading on **every**
  call. Calls that land in the same clock tick receive the same seed and therefore return
  identical values, which correlates the two proposal coordinates with each other and with
  the acceptance draw. It exists to reproduce the legacy behaviour of the program this crate
  replaces and should not be used for inference.

# Examples

```rust
use linfit_mcmc::random::{RandomSource, SeededSource};

let mut a = SeededSource::seed_from_u64(7);
let mut b = SeededSource::seed_from_u64(7);
assert_eq!(a.gaussian(1.0, 0.5), b.gaussian(1.0, 0.5));

let u = a.uniform();
assert!((0.0..1.0).contains(&u));
```
*/

use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::RandomMode;

/// A provider of the two kinds of random draws the sampler needs.
pub trait RandomSource {
    /// Returns a draw from the uniform distribution on `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Returns a draw from `N(mean, stddev^2)`.
    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64;

    /// The seed of the underlying stream, if there is a single one.
    fn seed(&self) -> Option<u64> {
        None
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        (**self).gaussian(mean, stddev)
    }

    fn seed(&self) -> Option<u64> {
        (**self).seed()
    }
}

fn draw_gaussian<G: Rng>(rng: &mut G, mean: f64, stddev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + stddev * z
}

/// One generator, seeded once, drawn from for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    rng: SmallRng,
}

impl SeededSource {
    /// Creates a source with a seed taken from the thread RNG.
    pub fn new() -> Self {
        let seed = thread_rng().gen::<u64>();
        Self::seed_from_u64(seed)
    }

    /// Creates a reproducible source.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The seed this source was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SeededSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        draw_gaussian(&mut self.rng, mean, stddev)
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/**
Legacy generator that seeds a fresh [`SmallRng`] from the clock on every call.

The seed is the number of whole `resolution` ticks since the Unix epoch. The default
resolution of one microsecond matches a typical process CPU clock; coarser resolutions make
the seed collisions easier to observe.

```rust
use linfit_mcmc::random::{ClockReseededSource, RandomSource};
use std::time::Duration;

let mut legacy = ClockReseededSource::with_resolution(Duration::from_secs(3600));
// Both calls almost certainly fall in the same hour and so share a seed.
let first = legacy.uniform();
let second = legacy.uniform();
assert!((0.0..1.0).contains(&first) && (0.0..1.0).contains(&second));
```
*/
#[derive(Debug, Clone, Copy)]
pub struct ClockReseededSource {
    resolution: Duration,
}

impl ClockReseededSource {
    pub const DEFAULT_RESOLUTION: Duration = Duration::from_micros(1);

    pub fn new() -> Self {
        Self::with_resolution(Self::DEFAULT_RESOLUTION)
    }

    /// A zero resolution is treated as one nanosecond.
    pub fn with_resolution(resolution: Duration) -> Self {
        Self {
            resolution: resolution.max(Duration::from_nanos(1)),
        }
    }

    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    fn fresh_rng(&self) -> SmallRng {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let tick = since_epoch.as_nanos() / self.resolution.as_nanos();
        SmallRng::seed_from_u64(tick as u64)
    }
}

impl Default for ClockReseededSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ClockReseededSource {
    fn uniform(&mut self) -> f64 {
        self.fresh_rng().gen()
    }

    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        draw_gaussian(&mut self.fresh_rng(), mean, stddev)
    }
}

/// The random source selected by [`RandomMode`].
#[derive(Debug, Clone)]
pub enum Source {
    Seeded(SeededSource),
    LegacyClock(ClockReseededSource),
}

impl Source {
    /// Builds the source for `mode`. The seed only applies to [`RandomMode::Seeded`].
    pub fn from_mode(mode: RandomMode, seed: Option<u64>) -> Self {
        match mode {
            RandomMode::Seeded => Source::Seeded(match seed {
                Some(seed) => SeededSource::seed_from_u64(seed),
                None => SeededSource::new(),
            }),
            RandomMode::LegacyClockReseed => Source::LegacyClock(ClockReseededSource::new()),
        }
    }
}

impl RandomSource for Source {
    fn uniform(&mut self) -> f64 {
        match self {
            Source::Seeded(s) => s.uniform(),
            Source::LegacyClock(s) => s.uniform(),
        }
    }

    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        match self {
            Source::Seeded(s) => s.gaussian(mean, stddev),
            Source::LegacyClock(s) => s.gaussian(mean, stddev),
        }
    }

    fn seed(&self) -> Option<u64> {
        match self {
            Source::Seeded(s) => Some(s.seed()),
            Source::LegacyClock(_) => None,
        }
    }
}
