//! Kinematic state and particles.
//!
//! - `InitialState`: plain value describing where a particle (or bunch) starts
//! - `MaterialPoint`: position/velocity/acceleration bound to a framework and rest mass
//! - `Particle`: a material point carrying a fixed charge (zero for neutral bodies)
//!
//! Kinematic state is only mutated by the IVP stepping protocol, which is why
//! the setters are crate-private.

use std::fmt;

use crate::simulation::error::InvalidArgument;
use crate::simulation::framework::Framework;
use crate::simulation::vector::Vector3;

pub const PROTON_MASS: f64 = 1.672621898e-27;
pub const PROTON_CHARGE: f64 = 1.602176620e-19;
pub const ELECTRON_MASS: f64 = 9.10938356e-31;
pub const ELECTRON_CHARGE: f64 = -1.60217662e-19;

/// How bunch members are scattered around a centre value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// centre + spread * (U[0,1) - 0.5)
    #[default]
    Uniform,
    /// centre + spread * N(0,1)
    Gaussian,
}

/// Initial conditions, passed by value into constructors
///
/// Spreads are only read when seeding a bunch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InitialState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub position_spread: Vector3,
    pub velocity_spread: Vector3,
    pub acceleration_spread: Vector3,
    pub distribution: Distribution,
}

impl InitialState {
    /// Everything at the origin and at rest
    pub fn zero() -> Self {
        Self::default()
    }

    /// Copy the kinematic state of an existing particle
    pub fn of(particle: &Particle) -> Self {
        Self {
            position: particle.position(),
            velocity: particle.velocity(),
            acceleration: particle.acceleration(),
            ..Self::default()
        }
    }

    pub fn position(mut self, r: Vector3) -> Self {
        self.position = r;
        self
    }

    pub fn velocity(mut self, v: Vector3) -> Self {
        self.velocity = v;
        self
    }

    pub fn acceleration(mut self, a: Vector3) -> Self {
        self.acceleration = a;
        self
    }

    pub fn position_spread(mut self, dr: Vector3) -> Self {
        self.position_spread = dr;
        self
    }

    pub fn velocity_spread(mut self, dv: Vector3) -> Self {
        self.velocity_spread = dv;
        self
    }

    pub fn acceleration_spread(mut self, da: Vector3) -> Self {
        self.acceleration_spread = da;
        self
    }

    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }
}

/// Mutable kinematic state of a massive point under a mechanics framework
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPoint {
    position: Vector3,
    velocity: Vector3,
    acceleration: Vector3,
    framework: Framework,
    rest_mass: f64,
}

impl MaterialPoint {
    pub fn new(framework: Framework, state: InitialState, rest_mass: f64) -> Result<Self, InvalidArgument> {
        // also catches NaN
        if !(rest_mass > 0.0) {
            return Err(InvalidArgument::NonPositiveMass(rest_mass));
        }
        Ok(Self {
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            framework,
            rest_mass,
        })
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vector3 {
        self.acceleration
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn rest_mass(&self) -> f64 {
        self.rest_mass
    }

    pub fn mass(&self) -> f64 {
        self.framework.mass(self.rest_mass, &self.velocity)
    }

    pub fn energy(&self) -> f64 {
        self.framework.energy(self.rest_mass, &self.velocity)
    }

    pub fn momentum(&self) -> Vector3 {
        self.framework.momentum(self.rest_mass, &self.velocity)
    }

    /// Acceleration due to `force` at the current velocity
    pub fn acceleration_from_force(&self, force: &Vector3) -> Vector3 {
        self.framework.acceleration_from_force(self.rest_mass, force, &self.velocity)
    }

    pub(crate) fn set_position(&mut self, r: Vector3) {
        self.position = r;
    }

    pub(crate) fn set_velocity(&mut self, v: Vector3) {
        self.velocity = v;
    }

    pub(crate) fn set_acceleration(&mut self, a: Vector3) {
        self.acceleration = a;
    }
}

/// A material point with a fixed charge
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    point: MaterialPoint,
    charge: f64,
}

impl Particle {
    pub fn new(framework: Framework, state: InitialState, mass: f64, charge: f64) -> Result<Self, InvalidArgument> {
        Ok(Self {
            point: MaterialPoint::new(framework, state, mass)?,
            charge,
        })
    }

    pub fn point(&self) -> &MaterialPoint {
        &self.point
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn framework(&self) -> Framework {
        self.point.framework()
    }

    pub fn rest_mass(&self) -> f64 {
        self.point.rest_mass()
    }

    pub fn mass(&self) -> f64 {
        self.point.mass()
    }

    pub fn energy(&self) -> f64 {
        self.point.energy()
    }

    pub fn momentum(&self) -> Vector3 {
        self.point.momentum()
    }

    pub fn position(&self) -> Vector3 {
        self.point.position()
    }

    pub fn velocity(&self) -> Vector3 {
        self.point.velocity()
    }

    pub fn acceleration(&self) -> Vector3 {
        self.point.acceleration()
    }

    pub fn acceleration_from_force(&self, force: &Vector3) -> Vector3 {
        self.point.acceleration_from_force(force)
    }

    /// Add increments to position and velocity
    pub(crate) fn advance(&mut self, dr: Vector3, dv: Vector3) {
        let r = self.point.position() + dr;
        let v = self.point.velocity() + dv;
        self.point.set_position(r);
        self.point.set_velocity(v);
    }

    pub(crate) fn set_acceleration(&mut self, a: Vector3) {
        self.point.set_acceleration(a);
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Particle:", self.framework())?;
        writeln!(f, "Mass:         {}", self.mass())?;
        writeln!(f, "Charge:       {}", self.charge)?;
        writeln!(f, "Position:     {}", self.position())?;
        writeln!(f, "Velocity:     {}", self.velocity())?;
        write!(f, "Acceleration: {}", self.acceleration())
    }
}

/// Named particle species
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Proton,
    Electron,
}

impl Species {
    pub fn mass(&self) -> f64 {
        match self {
            Species::Proton => PROTON_MASS,
            Species::Electron => ELECTRON_MASS,
        }
    }

    pub fn charge(&self) -> f64 {
        match self {
            Species::Proton => PROTON_CHARGE,
            Species::Electron => ELECTRON_CHARGE,
        }
    }
}

// Factories: every particle built here lives under `self` for its whole lifetime.
impl Framework {
    /// Uncharged particle
    pub fn massive_particle(self, state: InitialState, mass: f64) -> Result<Particle, InvalidArgument> {
        Particle::new(self, state, mass, 0.0)
    }

    pub fn charged_particle(self, state: InitialState, mass: f64, charge: f64) -> Result<Particle, InvalidArgument> {
        Particle::new(self, state, mass, charge)
    }

    pub fn species(self, species: Species, state: InitialState) -> Particle {
        Particle {
            point: MaterialPoint {
                position: state.position,
                velocity: state.velocity,
                acceleration: state.acceleration,
                framework: self,
                rest_mass: species.mass(),
            },
            charge: species.charge(),
        }
    }

    pub fn proton(self, state: InitialState) -> Particle {
        self.species(Species::Proton, state)
    }

    pub fn electron(self, state: InitialState) -> Particle {
        self.species(Species::Electron, state)
    }

    /// Same rest mass, charge and kinematic state as `other`, under this framework
    pub fn copy_of(self, other: &Particle) -> Particle {
        let mut copy = other.clone();
        copy.point.framework = self;
        copy
    }
}
