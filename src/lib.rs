//!Initialization and constraint linearization for COBYLA-family
//!derivative-free trust-region optimizers.
//!
//!Given a nonlinear objective/constraint evaluator, a starting point and
//!linear/bound constraints, this crate collapses every linear constraint
//!into one homogeneous system `A·x <= b`, reconciles the interdependent
//!tuning parameters, builds a numerically conditioned initial simplex of
//!n+1 evaluated points together with its inverse, and seeds the bounded
//!filter archive used to pick the returned point. The trust-region
//!iteration loop itself is an external collaborator plugged in through
//![`IterationEngine`].
//!
//!# Example
//!
//!```rust
//!use cobyla_core::{Constraints, Options, cobyla};
//!use ndarray::array;
//!
//!// Minimize x0^2 + x1^2 subject to x0 + x1 >= 1, i.e. 1 - x0 - x1 <= 0.
//!let result = cobyla(
//!    |x| (x[0] * x[0] + x[1] * x[1], array![1.0 - x[0] - x[1]]),
//!    1,
//!    array![2.0, 2.0],
//!    &Constraints::default(),
//!    &Options::default(),
//!)
//!.unwrap();
//!assert_eq!(result.nf, 3);
//!assert!(result.cstrv.is_finite() && result.cstrv >= 0.0);
//!```

#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_labels
)]

pub mod consts;

mod driver;
pub use crate::driver::*;

mod error;
pub use crate::error::InputError;

pub mod evaluate;
pub mod filter;
pub mod history;
pub mod initialize;
mod linalg;
pub mod lincon;
pub mod params;

mod status;
pub use crate::status::ExitStatus;

pub use crate::params::{Options, Params};

use log::LevelFilter;

/// Initialize a terminal logger at the `Info` level.
pub fn init_default_log() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();
}

/// Initialize a terminal logger at the `Trace` level, showing every
/// function evaluation.
pub fn init_debug_log() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .init();
}
