//! Problems that move a single particle
//!
//! - `ParticleAccelerator`: a charged particle pushed by the Lorentz force of a shared field
//! - `NewtonSecondLaw`: any particle under a caller-supplied force law `F(r, v, t)`
//!
//! Both expose the state `[r, v]` and convert force into acceleration through
//! the particle's framework at the trial velocity handed to `f`. After each
//! increment the acceleration at the new mesh point is recomputed and stored on
//! the particle, so observers see a consistent triple.

use std::sync::Arc;

use crate::simulation::fields::EmField;
use crate::simulation::ivp::{state_slot, Ivp, IvpError, Observers};
use crate::simulation::states::Particle;
use crate::simulation::vector::Vector3;

fn split(dy: &[Vector3]) -> Result<(Vector3, Vector3), IvpError> {
    Ok((state_slot(dy, 0)?, state_slot(dy, 1)?))
}

/// Charged particle in an electromagnetic field
pub struct ParticleAccelerator {
    particle: Particle,
    field: Arc<dyn EmField>,
    time: f64,
    observers: Observers<Self>,
}

impl ParticleAccelerator {
    /// Starts the clock at zero
    pub fn new(particle: Particle, field: Arc<dyn EmField>) -> Self {
        Self::starting_at(particle, field, 0.0)
    }

    pub fn starting_at(particle: Particle, field: Arc<dyn EmField>, t0: f64) -> Self {
        Self {
            particle,
            field,
            time: t0,
            observers: Observers::new(),
        }
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn field(&self) -> &Arc<dyn EmField> {
        &self.field
    }

    /// Hand the particle back, dropping the field reference
    pub fn into_particle(self) -> Particle {
        self.particle
    }
}

impl Ivp for ParticleAccelerator {
    fn order(&self) -> usize {
        2
    }

    fn f(&self, y: &[Vector3], t: f64) -> Result<Vector3, IvpError> {
        let r = state_slot(y, 0)?;
        let v = state_slot(y, 1)?;
        let force = self.field.lorentz_force(self.particle.charge(), v, r, t);
        Ok(self
            .particle
            .framework()
            .acceleration_from_force(self.particle.rest_mass(), &force, &v))
    }

    fn y(&self) -> Vec<Vector3> {
        vec![self.particle.position(), self.particle.velocity()]
    }

    fn t(&self) -> f64 {
        self.time
    }

    fn increment(&mut self, dy: &[Vector3], h: f64) -> Result<(), IvpError> {
        let (dr, dv) = split(dy)?;
        self.time += h;
        self.particle.advance(dr, dv);
        let a = self.f_now()?;
        self.particle.set_acceleration(a);
        Ok(())
    }

    fn observers(&mut self) -> &mut Observers<Self> {
        &mut self.observers
    }
}

/// Particle under an arbitrary force law `F(r, v, t)`
pub struct NewtonSecondLaw<F> {
    particle: Particle,
    force: F,
    time: f64,
    observers: Observers<Self>,
}

impl<F> NewtonSecondLaw<F>
where
    F: Fn(Vector3, Vector3, f64) -> Vector3,
{
    pub fn new(particle: Particle, force: F) -> Self {
        Self {
            particle,
            force,
            time: 0.0,
            observers: Observers::new(),
        }
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn into_particle(self) -> Particle {
        self.particle
    }
}

impl<F> Ivp for NewtonSecondLaw<F>
where
    F: Fn(Vector3, Vector3, f64) -> Vector3,
{
    fn order(&self) -> usize {
        2
    }

    fn f(&self, y: &[Vector3], t: f64) -> Result<Vector3, IvpError> {
        let r = state_slot(y, 0)?;
        let v = state_slot(y, 1)?;
        let force = (self.force)(r, v, t);
        Ok(self
            .particle
            .framework()
            .acceleration_from_force(self.particle.rest_mass(), &force, &v))
    }

    fn y(&self) -> Vec<Vector3> {
        vec![self.particle.position(), self.particle.velocity()]
    }

    fn t(&self) -> f64 {
        self.time
    }

    fn increment(&mut self, dy: &[Vector3], h: f64) -> Result<(), IvpError> {
        let (dr, dv) = split(dy)?;
        self.time += h;
        self.particle.advance(dr, dv);
        let a = self.f_now()?;
        self.particle.set_acceleration(a);
        Ok(())
    }

    fn observers(&mut self) -> &mut Observers<Self> {
        &mut self.observers
    }
}
