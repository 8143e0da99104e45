//! Construction-time failures shared by the simulation types.

use thiserror::Error;

/// Raised when a value cannot be built from the arguments given.
/// Nothing is constructed when this is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidArgument {
    #[error("non-finite vector components ({x}, {y}, {z})")]
    NonFiniteComponents { x: f64, y: f64, z: f64 },

    #[error("massless particle not supported (mass = {0})")]
    NonPositiveMass(f64),

    #[error("use Superimposed to superimpose 2 or more fields (got {0})")]
    TooFewFields(usize),

    #[error("incompatible field type `{0}` (expected `electric` or `magnetic`)")]
    UnknownFieldType(String),

    #[error("masses and charges are unequal in number ({masses} vs {charges})")]
    MismatchedBunch { masses: usize, charges: usize },

    #[error("a bunch needs at least one particle")]
    EmptyBunch,
}
