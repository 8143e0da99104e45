//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – mechanics framework and solver scheme
//! - [`ParametersConfig`] – run duration, step size and sampling seed
//! - [`FieldConfig`]      – one entry per field; two or more are superimposed
//! - [`ParticleConfig`]   – initial state for each individually tracked particle
//! - [`BunchConfig`]      – optional randomly seeded bunch of one species
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A proton in a magnetic field with an accelerating gap:
//!
//! ```yaml
//! engine:
//!   framework: relativistic   # or newtonian
//!   solver: rk4               # euler | euler_cromer | midpoint | velocity_verlet | rk4
//!
//! parameters:
//!   duration: 1.0e-6          # total simulated time (s)
//!   h: 1.0e-10                # fixed step size, defaults to 1e-3
//!   seed: 7                   # bunch sampling seed, defaults to 0
//!
//! fields:
//!   - type: uniform
//!     kind: magnetic          # or electric
//!     value: [0.0, 0.0, 1.0]
//!   - type: sinusoid
//!     kind: electric
//!     direction: [1.0, 0.0, 0.0]
//!     amplitude: 1.0e5
//!     frequency: 9.58e7       # angular (rad/s)
//!     phase: 0.0
//!     centre: [0.0, 0.0, 0.0]
//!     bounds: [0.01, 1.0e9, 1.0e9]   # half widths of the cavity, unbounded when omitted
//!
//! particles:
//!   - species: proton
//!     position: [0.0, 0.0, 0.0]
//!     velocity: [0.0, 1.0e6, 0.0]
//!   - mass: 1.0e-26
//!     charge: 1.6e-19
//!     position: [0.0, 0.0, 0.0]
//!     velocity: [1.0e5, 0.0, 0.0]
//!
//! bunch:
//!   species: electron
//!   count: 100
//!   distribution: gaussian    # or uniform
//!   position: [0.0, 0.0, 0.0]
//!   position_spread: [1.0e-3, 1.0e-3, 1.0e-3]
//!   velocity: [1.0e6, 0.0, 0.0]
//!   velocity_spread: [1.0e3, 1.0e3, 0.0]
//! ```
//!
//! `Scenario::build_scenario` validates this configuration and maps it onto
//! the runtime types.

use serde::Deserialize;

/// Mechanics framework every particle in the scenario lives under
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkConfig {
    #[serde(rename = "newtonian")] // m, ½mv², mv
    Newtonian,

    #[serde(rename = "relativistic")] // γm, γmC², γmv
    Relativistic,
}

/// Fixed-step scheme used to advance every problem
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverConfig {
    #[serde(rename = "euler")] // first order, explicit
    Euler,

    #[serde(rename = "euler_cromer")] // semi-implicit Euler, bounded energy error for oscillators
    EulerCromer,

    #[serde(rename = "midpoint")]
    Midpoint,

    #[serde(rename = "velocity_verlet")] // second order, symplectic for velocity-independent forces
    VelocityVerlet,

    #[serde(rename = "rk4")] // classical 4th-order Runge–Kutta
    Rk4,
}

/// How the members of a bunch are scattered around their centre
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistributionConfig {
    #[default]
    #[serde(rename = "uniform")] // centre + spread * (U[0,1) - 0.5)
    Uniform,

    #[serde(rename = "gaussian")] // centre + spread * N(0,1)
    Gaussian,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesConfig {
    #[serde(rename = "proton")]
    Proton,

    #[serde(rename = "electron")]
    Electron,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub framework: FrameworkConfig, // Newtonian or relativistic mechanics
    pub solver: SolverConfig,       // Time integrator used for advancing every particle
}

/// Numerical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub duration: f64,     // total simulated time
    pub h: Option<f64>,    // fixed step size
    pub seed: Option<u64>, // deterministic seed to make bunch sampling reproducible
}

/// One field; `kind` is `electric` or `magnetic`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConfig {
    Uniform {
        kind: String,
        value: [f64; 3],
    },
    Sinusoid {
        kind: String,
        direction: [f64; 3], // normalized on build
        amplitude: f64,
        frequency: f64, // angular
        #[serde(default)]
        phase: f64,
        centre: Option<[f64; 3]>, // cavity centre, origin when omitted
        bounds: Option<[f64; 3]>, // cavity half widths, unbounded when omitted
    },
}

/// Initial state of a single particle
///
/// Either `species` or `mass` must be given; an explicit `mass`/`charge`
/// overrides the species value. Charge defaults to zero.
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub species: Option<SpeciesConfig>,
    pub mass: Option<f64>,
    pub charge: Option<f64>,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub acceleration: Option<[f64; 3]>, // overwritten after the first step
}

/// Randomly seeded bunch of `count` particles of one species
#[derive(Deserialize, Debug, Clone)]
pub struct BunchConfig {
    pub species: SpeciesConfig,
    pub count: usize,
    #[serde(default)]
    pub distribution: DistributionConfig,
    pub position: [f64; 3],
    pub position_spread: Option<[f64; 3]>,
    pub velocity: [f64; 3],
    pub velocity_spread: Option<[f64; 3]>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,         // Framework and solver
    pub parameters: ParametersConfig, // Duration, step size, seed
    #[serde(default)]
    pub fields: Vec<FieldConfig>, // Field sources; none means field-free motion
    #[serde(default)]
    pub particles: Vec<ParticleConfig>, // Individually tracked particles
    pub bunch: Option<BunchConfig>,     // Optional bunch sharing the same field
}
