//! Bunches of non-interacting charged particles
//!
//! A `Bunch` owns particles under one framework, seeded around an
//! `InitialState` centre with its spreads. `BunchAccelerator` pushes every
//! member through the same shared field, one lockstep at a time.

use std::sync::Arc;

use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::simulation::accelerator::ParticleAccelerator;
use crate::simulation::error::InvalidArgument;
use crate::simulation::fields::EmField;
use crate::simulation::framework::Framework;
use crate::simulation::integrator::IvpSolver;
use crate::simulation::ivp::{Ivp, IvpError, Observers, Subscriber};
use crate::simulation::states::{Distribution, InitialState, Particle, Species};
use crate::simulation::vector::Vector3;

/// Draw one vector scattered around `centre`
pub fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    distribution: Distribution,
    centre: Vector3,
    spread: Vector3,
) -> Result<Vector3, InvalidArgument> {
    let mut draw = || -> f64 {
        match distribution {
            Distribution::Uniform => rng.gen::<f64>() - 0.5,
            Distribution::Gaussian => rng.sample::<f64, _>(StandardNormal),
        }
    };
    Vector3::new(
        centre.x() + spread.x() * draw(),
        centre.y() + spread.y() * draw(),
        centre.z() + spread.z() * draw(),
    )
}

/// Kinematic state of one member drawn from the bunch's initial state
fn member_state<R: Rng + ?Sized>(rng: &mut R, state: &InitialState) -> Result<InitialState, InvalidArgument> {
    let d = state.distribution;
    Ok(InitialState::zero()
        .position(sample(rng, d, state.position, state.position_spread)?)
        .velocity(sample(rng, d, state.velocity, state.velocity_spread)?)
        .acceleration(sample(rng, d, state.acceleration, state.acceleration_spread)?))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bunch {
    framework: Framework,
    particles: Vec<Particle>,
}

impl Bunch {
    /// One particle per (mass, charge) pair
    pub fn new<R: Rng + ?Sized>(
        framework: Framework,
        state: &InitialState,
        masses: &[f64],
        charges: &[f64],
        rng: &mut R,
    ) -> Result<Self, InvalidArgument> {
        if masses.len() != charges.len() {
            return Err(InvalidArgument::MismatchedBunch {
                masses: masses.len(),
                charges: charges.len(),
            });
        }
        if masses.is_empty() {
            return Err(InvalidArgument::EmptyBunch);
        }

        let particles = masses
            .iter()
            .zip(charges)
            .map(|(&m, &q)| framework.charged_particle(member_state(rng, state)?, m, q))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("seeded {} particle bunch ({:?})", particles.len(), state.distribution);
        Ok(Self { framework, particles })
    }

    /// `n` particles of one species
    pub fn of_species<R: Rng + ?Sized>(
        framework: Framework,
        species: Species,
        n: usize,
        state: &InitialState,
        rng: &mut R,
    ) -> Result<Self, InvalidArgument> {
        let masses = vec![species.mass(); n];
        let charges = vec![species.charge(); n];
        Self::new(framework, state, &masses, &charges, rng)
    }

    /// Gather existing particles, moving each under `framework`
    pub fn from_particles(framework: Framework, particles: &[Particle]) -> Result<Self, InvalidArgument> {
        if particles.is_empty() {
            return Err(InvalidArgument::EmptyBunch);
        }
        Ok(Self {
            framework,
            particles: particles.iter().map(|p| framework.copy_of(p)).collect(),
        })
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn mean_position(&self) -> Vector3 {
        self.mean(Particle::position)
    }

    pub fn mean_velocity(&self) -> Vector3 {
        self.mean(Particle::velocity)
    }

    pub fn mean_acceleration(&self) -> Vector3 {
        self.mean(Particle::acceleration)
    }

    /// Sum of the framework masses (velocity dependent when relativistic)
    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(Particle::mass).sum()
    }

    pub fn total_energy(&self) -> f64 {
        self.particles.iter().map(Particle::energy).sum()
    }

    pub fn total_charge(&self) -> f64 {
        self.particles.iter().map(Particle::charge).sum()
    }

    fn mean(&self, get: fn(&Particle) -> Vector3) -> Vector3 {
        let sum = self.particles.iter().map(get).fold(Vector3::ZERO, |acc, v| acc + v);
        sum / self.particles.len() as f64
    }
}

/// Every member of a bunch in one shared field
pub struct BunchAccelerator {
    framework: Framework,
    accelerators: Vec<ParticleAccelerator>,
    field: Arc<dyn EmField>,
    time: f64,
    observers: Observers<Self>,
}

impl BunchAccelerator {
    pub fn new(bunch: Bunch, field: Arc<dyn EmField>) -> Self {
        let accelerators = bunch
            .particles
            .into_iter()
            .map(|p| ParticleAccelerator::new(p, field.clone()))
            .collect();
        Self {
            framework: bunch.framework,
            accelerators,
            field,
            time: 0.0,
            observers: Observers::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn field(&self) -> &Arc<dyn EmField> {
        &self.field
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.accelerators.iter().map(ParticleAccelerator::particle)
    }

    /// Current members as a bunch, for the aggregates
    pub fn bunch(&self) -> Bunch {
        Bunch {
            framework: self.framework,
            particles: self.particles().cloned().collect(),
        }
    }

    /// Register an observer run after every lockstep
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&Self) -> anyhow::Result<()> + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Handle for registering observers while the bunch is running
    pub fn subscriber(&self) -> Subscriber<Self> {
        self.observers.subscriber()
    }

    /// Advance every member by one step per iteration until `duration` has elapsed
    ///
    /// Returns the number of locksteps taken.
    pub fn solve(&mut self, solver: &IvpSolver, duration: f64) -> Result<usize, IvpError> {
        let h = solver.step_size();
        if !(h > 0.0 && h.is_finite()) {
            return Err(IvpError::InvalidStepSize(h));
        }
        for accelerator in self.accelerators.iter_mut() {
            accelerator.check_consistency()?;
        }

        let t0 = self.time;
        let mut steps = 0;
        while self.time - t0 < duration {
            for accelerator in self.accelerators.iter_mut() {
                accelerator.step(solver)?;
            }
            self.time += h;
            steps += 1;

            let mut observers = std::mem::take(&mut self.observers);
            let notified = observers.notify(&*self);
            self.observers = observers;
            notified?;
        }
        debug!("bunch of {} advanced {} steps", self.accelerators.len(), steps);
        Ok(steps)
    }
}
