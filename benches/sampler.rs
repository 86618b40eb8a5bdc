use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linfit_mcmc::config::SamplerConfig;
use linfit_mcmc::data::{reference_observations, REFERENCE_INITIAL};
use linfit_mcmc::metropolis_hastings::MetropolisSampler;

fn criterion_benchmark(c: &mut Criterion) {
    let observations = reference_observations();

    c.bench_function("chi squared reference", |b| {
        b.iter(|| observations.score(black_box(REFERENCE_INITIAL)))
    });

    c.bench_function("sample 10k accepted", |b| {
        b.iter(|| {
            let config = SamplerConfig::reference()
                .chain_length(10_000)
                .burn_in(1_000)
                .seed(black_box(42));
            MetropolisSampler::new(observations.clone(), config)
                .unwrap()
                .run()
                .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
