/*!
Chi-squared scoring of model predictions against observations.

The score is `sum((predicted[i] - observed[i])^2 / variance[i])`, i.e. `-2 log L` up to a
constant for independent Gaussian errors. The third input is a **variance**. It is used as
given; nothing is squared or square-rooted on the way in, so passing standard deviations
silently produces a different (wrong) likelihood.
*/

use num_traits::Float;

use crate::error::DataError;
use crate::model::{LinearModel, ParameterPair};

/**
Computes the chi-squared score of `predicted` against `observed`.

Fails if the three slices differ in length or if any variance is not strictly positive and
finite.

# Examples

```rust
use linfit_mcmc::likelihood::chi_squared;

let chi = chi_squared(&[1.0, 2.0], &[0.0, 2.0], &[4.0, 1.0]).unwrap();
assert_eq!(chi, 0.25);
assert!(chi_squared(&[1.0], &[1.0], &[0.0]).is_err());
```
*/
pub fn chi_squared<T: Float>(
    predicted: &[T],
    observed: &[T],
    variance: &[T],
) -> Result<T, DataError> {
    check_len("observed", predicted.len(), observed.len())?;
    check_len("variance", predicted.len(), variance.len())?;
    check_variances(variance)?;
    Ok(chi_squared_unchecked(predicted, observed, variance))
}

fn chi_squared_unchecked<T: Float>(predicted: &[T], observed: &[T], variance: &[T]) -> T {
    predicted
        .iter()
        .zip(observed)
        .zip(variance)
        .fold(T::zero(), |acc, ((&p, &o), &v)| {
            let r = p - o;
            acc + r * r / v
        })
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), DataError> {
    if expected != found {
        return Err(DataError::LengthMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_variances<T: Float>(variance: &[T]) -> Result<(), DataError> {
    for (index, &v) in variance.iter().enumerate() {
        if !(v.is_finite() && v > T::zero()) {
            return Err(DataError::NonPositiveVariance {
                index,
                value: v.to_f64().unwrap_or(f64::NAN),
            });
        }
    }
    Ok(())
}

fn check_finite(what: &'static str, values: &[f64]) -> Result<(), DataError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DataError::NonFiniteValue { what, index }),
        None => Ok(()),
    }
}

/**
A validated set of observations `(x[i], y[i], variance[i])`.

Construction checks everything [`chi_squared`] would, once, so that scoring inside the
sampling loop cannot fail.

# Examples

```rust
use linfit_mcmc::likelihood::ObservationSet;
use linfit_mcmc::model::ParameterPair;

let obs = ObservationSet::new(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0], &[1.0, 1.0, 1.0]).unwrap();
assert_eq!(obs.len(), 3);
assert_eq!(obs.score(ParameterPair::new(2.0, 1.0)), 0.0);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    x: Vec<f64>,
    y: Vec<f64>,
    variance: Vec<f64>,
}

impl ObservationSet {
    pub fn new(x: &[f64], y: &[f64], variance: &[f64]) -> Result<Self, DataError> {
        if x.is_empty() {
            return Err(DataError::Empty);
        }
        check_len("y", x.len(), y.len())?;
        check_len("variance", x.len(), variance.len())?;
        check_finite("x", x)?;
        check_finite("y", y)?;
        check_variances(variance)?;
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            variance: variance.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false`; an empty set cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn variance(&self) -> &[f64] {
        &self.variance
    }

    /// Scores predictions made at this set's `x` values, one per observation.
    pub fn chi_squared(&self, predicted: &[f64]) -> Result<f64, DataError> {
        check_len("predicted", self.len(), predicted.len())?;
        Ok(self.score_predictions(predicted))
    }

    /// Hot-loop form of [`chi_squared`](Self::chi_squared) for buffers the sampler sized itself.
    pub(crate) fn score_predictions(&self, predicted: &[f64]) -> f64 {
        debug_assert_eq!(predicted.len(), self.len());
        chi_squared_unchecked(predicted, &self.y, &self.variance)
    }

    /// Evaluates the line at `params` and scores it.
    pub fn score(&self, params: ParameterPair) -> f64 {
        let predicted = LinearModel::evaluate(&self.x, params.a, params.b);
        self.score_predictions(&predicted)
    }

    /// Weighted least-squares line through the data, the maximum of the likelihood.
    pub fn least_squares(&self) -> ParameterPair {
        let (mut s, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for ((&x, &y), &v) in self.x.iter().zip(&self.y).zip(&self.variance) {
            let w = 1.0 / v;
            s += w;
            sx += w * x;
            sy += w * y;
            sxx += w * x * x;
            sxy += w * x * y;
        }
        let det = s * sxx - sx * sx;
        let a = (s * sxy - sx * sy) / det;
        let b = (sxx * sy - sx * sxy) / det;
        ParameterPair::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_chi_squared_by_hand() {
        let chi = chi_squared(&[3.0, 0.0], &[1.0, 1.0], &[2.0, 0.5]).unwrap();
        // 4/2 + 1/0.5
        assert_abs_diff_eq!(chi, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_variance_is_not_squared() {
        // A residual of 3 against variance 9 contributes 1, not 9/81.
        let chi = chi_squared(&[3.0], &[0.0], &[9.0]).unwrap();
        assert_eq!(chi, 1.0);
    }

    #[test]
    fn test_rejects_non_positive_variance() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let err = chi_squared(&[1.0, 1.0], &[1.0, 1.0], &[1.0, bad]).unwrap_err();
            assert!(
                matches!(err, DataError::NonPositiveVariance { index: 1, .. }),
                "variance {bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = chi_squared(&[1.0, 2.0], &[1.0], &[1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch {
                what: "observed",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_observation_set_validation() {
        assert_eq!(ObservationSet::new(&[], &[], &[]), Err(DataError::Empty));
        assert!(matches!(
            ObservationSet::new(&[1.0, 2.0], &[1.0, 2.0], &[1.0]),
            Err(DataError::LengthMismatch {
                what: "variance",
                ..
            })
        ));
        assert!(matches!(
            ObservationSet::new(&[1.0], &[f64::NAN], &[1.0]),
            Err(DataError::NonFiniteValue { what: "y", index: 0 })
        ));
        assert!(matches!(
            ObservationSet::new(&[1.0, 2.0], &[1.0, 2.0], &[1.0, -1.0]),
            Err(DataError::NonPositiveVariance { index: 1, .. })
        ));
    }

    #[test]
    fn test_observation_set_chi_squared_checks_length() {
        let obs = ObservationSet::new(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0], &[1.0, 1.0, 4.0]).unwrap();
        assert_eq!(
            obs.chi_squared(&[1.0]),
            Err(DataError::LengthMismatch {
                what: "predicted",
                expected: 3,
                found: 1
            })
        );
        assert_eq!(obs.chi_squared(&[1.0, 2.0, 5.0]), Ok(1.0));
    }

    #[test]
    fn test_least_squares_recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|x| -0.5 * x + 4.0).collect();
        let obs = ObservationSet::new(&x, &y, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let fit = obs.least_squares();
        assert_abs_diff_eq!(fit.a, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.b, 4.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn check_exact_fit_scores_zero(
            x in prop::collection::vec(-1e3f64..1e3f64, 1..24),
            a in -10f64..10f64,
            b in -100f64..100f64,
            var in 0.1f64..100f64,
        ) {
            let y = LinearModel::evaluate(&x, a, b);
            let variance = vec![var; x.len()];
            let obs = ObservationSet::new(&x, &y, &variance).unwrap();
            prop_assert_eq!(obs.score(ParameterPair::new(a, b)), 0.0);
            prop_assert_eq!(chi_squared(&y, &y, &variance).unwrap(), 0.0);
        }

        #[test]
        fn check_chi_squared_non_negative(
            pairs in prop::collection::vec((-1e3f64..1e3f64, -1e3f64..1e3f64, 1e-3f64..1e3f64), 1..24),
        ) {
            let p: Vec<f64> = pairs.iter().map(|t| t.0).collect();
            let o: Vec<f64> = pairs.iter().map(|t| t.1).collect();
            let v: Vec<f64> = pairs.iter().map(|t| t.2).collect();
            prop_assert!(chi_squared(&p, &o, &v).unwrap() >= 0.0);
        }
    }
}
