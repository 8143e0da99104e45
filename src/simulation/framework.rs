//! Mechanics frameworks
//!
//! A framework decides how mass, energy, momentum and force-to-acceleration
//! conversion depend on velocity. Every quantity is a pure function of the
//! rest mass `m` and the current velocity `v`.
//!
//! Relativistic results are not guarded: `|v| >= C` yields a non-finite
//! gamma factor, which propagates into whatever uses it.

use std::fmt;

use crate::simulation::vector::Vector3;

/// Speed of light in SI units (m/s)
pub const C: f64 = 2.99792458e8;

/// Lorentz factor 1 / sqrt(1 - v·v / C²)
pub fn gamma(v: &Vector3) -> f64 {
    1.0 / (1.0 - v.dot(v) / (C * C)).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    Newtonian,
    Relativistic,
}

impl Framework {
    /// Effective (inertial) mass
    pub fn mass(&self, m: f64, v: &Vector3) -> f64 {
        match self {
            Framework::Newtonian => m,
            Framework::Relativistic => gamma(v) * m,
        }
    }

    /// Newtonian: kinetic energy ½mv². Relativistic: total energy γmC².
    pub fn energy(&self, m: f64, v: &Vector3) -> f64 {
        match self {
            Framework::Newtonian => 0.5 * m * v.dot(v),
            Framework::Relativistic => gamma(v) * m * C * C,
        }
    }

    pub fn momentum(&self, m: f64, v: &Vector3) -> Vector3 {
        match self {
            Framework::Newtonian => v.scale(m),
            Framework::Relativistic => v.scale(gamma(v) * m),
        }
    }

    /// Acceleration produced by `force` on a body of rest mass `m` moving at `v`
    ///
    /// The relativistic form removes the share of the force that goes into
    /// raising gamma: a = (F - v (F·v) / C²) / (γ m)
    pub fn acceleration_from_force(&self, m: f64, force: &Vector3, v: &Vector3) -> Vector3 {
        match self {
            Framework::Newtonian => force.scale(1.0 / m),
            Framework::Relativistic => (*force - v.scale(force.dot(v) / (C * C)))
                .scale(1.0 / (gamma(v) * m)),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Newtonian => write!(f, "Newtonian"),
            Framework::Relativistic => write!(f, "Relativistic"),
        }
    }
}
