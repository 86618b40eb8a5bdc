//! The 16-point reference dataset and the starting point used with it.

use crate::likelihood::ObservationSet;
use crate::model::ParameterPair;

pub const REFERENCE_X: [f64; 16] = [
    203.0, 58.0, 210.0, 202.0, 198.0, 158.0, 165.0, 201.0, 157.0, 131.0, 166.0, 160.0, 186.0,
    125.0, 218.0, 146.0,
];

pub const REFERENCE_Y: [f64; 16] = [
    495.0, 173.0, 479.0, 504.0, 510.0, 416.0, 393.0, 442.0, 317.0, 311.0, 400.0, 337.0, 423.0,
    334.0, 533.0, 344.0,
];

/// Per-point variances (not standard deviations).
pub const REFERENCE_VARIANCE: [f64; 16] = [
    21.0, 15.0, 27.0, 14.0, 30.0, 16.0, 14.0, 25.0, 52.0, 16.0, 34.0, 31.0, 42.0, 26.0, 16.0,
    22.0,
];

pub const REFERENCE_INITIAL: ParameterPair = ParameterPair::new(2.5, 28.82);

pub const REFERENCE_STEP: ParameterPair = ParameterPair::new(0.025, 2.5);

pub fn reference_observations() -> ObservationSet {
    ObservationSet::new(&REFERENCE_X, &REFERENCE_Y, &REFERENCE_VARIANCE)
        .expect("Expected the reference dataset to be valid.")
}
