//! Numerical parameters for a run
//!
//! `Parameters` holds runtime settings:
//! - simulated duration and fixed step size,
//! - random seed for bunch sampling

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub duration: f64, // time to simulate
    pub h: f64,        // step size
    pub seed: u64,     // deterministic seed
}
