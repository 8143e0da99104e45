//! High-level runtime engine settings
//!
//! Selects the mechanics framework and the solver used when building and
//! running a `Scenario`

use crate::configuration::config::{FrameworkConfig, SolverConfig};
use crate::simulation::framework::Framework;
use crate::simulation::integrator::{IvpSolver, Scheme};

#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub framework: Framework, // newtonian or relativistic
    pub solver: IvpSolver,    // scheme + fixed step size
}

impl From<FrameworkConfig> for Framework {
    fn from(cfg: FrameworkConfig) -> Self {
        match cfg {
            FrameworkConfig::Newtonian => Framework::Newtonian,
            FrameworkConfig::Relativistic => Framework::Relativistic,
        }
    }
}

impl From<SolverConfig> for Scheme {
    fn from(cfg: SolverConfig) -> Self {
        match cfg {
            SolverConfig::Euler => Scheme::Euler,
            SolverConfig::EulerCromer => Scheme::EulerCromer,
            SolverConfig::Midpoint => Scheme::Midpoint,
            SolverConfig::VelocityVerlet => Scheme::VelocityVerlet,
            SolverConfig::Rk4 => Scheme::RungeKutta4,
        }
    }
}
