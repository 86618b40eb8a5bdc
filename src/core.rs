/// A Markov chain that can be advanced one proposal at a time.
pub trait MarkovChain<S> {
    /// Makes one proposal and returns whether it was accepted.
    fn step(&mut self) -> bool;

    /// The current accepted state.
    fn current_state(&self) -> &S;
}

/// Runs `chain` for `n_steps` proposals, returning the state after each one
/// and how many of the proposals were accepted.
pub fn run_chain<S, M>(chain: &mut M, n_steps: usize) -> (Vec<S>, usize)
where
    M: MarkovChain<S>,
    S: Clone,
{
    let mut out = Vec::with_capacity(n_steps);
    let mut accepted = 0;

    for _ in 0..n_steps {
        if chain.step() {
            accepted += 1;
        }
        out.push(chain.current_state().clone());
    }

    (out, accepted)
}
