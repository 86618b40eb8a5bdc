//! The straight-line model `y = a * x + b` and the parameter pair it is evaluated at.

use num_traits::Float;
use std::fmt;

/// A point `(a, b)` in parameter space: slope `a`, intercept `b`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterPair {
    pub a: f64,
    pub b: f64,
}

impl ParameterPair {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.a, self.b]
    }
}

impl From<(f64, f64)> for ParameterPair {
    fn from((a, b): (f64, f64)) -> Self {
        Self { a, b }
    }
}

impl fmt::Display for ParameterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a = {}, b = {}", self.a, self.b)
    }
}

/**
Evaluates `a * x[i] + b` for every `x[i]`.

# Examples

```rust
use linfit_mcmc::model::LinearModel;

let y = LinearModel::evaluate(&[0.0, 1.0, 2.0], 2.0, 1.0);
assert_eq!(y, vec![1.0, 3.0, 5.0]);
```
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl LinearModel {
    pub fn evaluate<T: Float>(x: &[T], a: T, b: T) -> Vec<T> {
        x.iter().map(|&xi| a * xi + b).collect()
    }

    /// Allocation-free form of [`evaluate`](Self::evaluate). `out` is resized to `x.len()`.
    pub fn evaluate_into<T: Float>(x: &[T], a: T, b: T, out: &mut Vec<T>) {
        out.clear();
        out.extend(x.iter().map(|&xi| a * xi + b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evaluate_preserves_length() {
        let x = [203.0, 58.0, 210.0];
        assert_eq!(LinearModel::evaluate(&x, 2.5, 28.82).len(), 3);
        assert!(LinearModel::evaluate::<f64>(&[], 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_evaluate_into_reuses_buffer() {
        let mut out = vec![9.0; 10];
        LinearModel::evaluate_into(&[1.0f32, 2.0], 3.0, -1.0, &mut out);
        assert_eq!(out, vec![2.0, 5.0]);
    }

    proptest! {
        #[test]
        fn check_evaluate_is_linear(
            x in prop::collection::vec(-1e6f64..1e6f64, 0..32),
            a in -1e3f64..1e3f64,
            b in -1e3f64..1e3f64,
        ) {
            let y = LinearModel::evaluate(&x, a, b);
            prop_assert_eq!(y.len(), x.len());
            for (yi, xi) in y.iter().zip(x.iter()) {
                prop_assert_eq!(*yi, a * xi + b);
            }
            let mut buf = Vec::new();
            LinearModel::evaluate_into(&x, a, b, &mut buf);
            prop_assert_eq!(buf, y);
        }
    }
}
