/*!
Bayesian estimation of the slope `a` and intercept `b` of `y = a * x + b` from observations
with known per-point variances, using a Metropolis–Hastings random walk.

```rust
use linfit_mcmc::config::SamplerConfig;
use linfit_mcmc::data::reference_observations;
use linfit_mcmc::metropolis_hastings::MetropolisSampler;

let config = SamplerConfig::default().chain_length(10_000).burn_in(1_000).seed(1);
let outcome = MetropolisSampler::new(reference_observations(), config)?.run()?;
println!("{}", outcome.summary);
# Ok::<(), linfit_mcmc::error::Error>(())
```
*/
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod likelihood;
pub mod metropolis_hastings;
pub mod model;
pub mod random;
pub mod stats;

pub use error::{Error, Result};
