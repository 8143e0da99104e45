//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the shared field every particle moves through
//! - individually tracked particles and an optional bunch
//!
//! `Scenario::run` then advances everything for the configured duration and
//! hands back a `Report` with the final states.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::configuration::config::{
    BunchConfig, DistributionConfig, FieldConfig, ParticleConfig, ScenarioConfig, SpeciesConfig,
};
use crate::recording::orbit::OrbitTracker;
use crate::recording::trajectory::{recorder, TrajectoryWriter};
use crate::simulation::accelerator::ParticleAccelerator;
use crate::simulation::bunch::{Bunch, BunchAccelerator};
use crate::simulation::engine::Engine;
use crate::simulation::fields::{EmField, FieldType, Sinusoid, Superimposed, Uniform};
use crate::simulation::framework::Framework;
use crate::simulation::integrator::IvpSolver;
use crate::simulation::ivp::{Ivp, IvpError};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Distribution, InitialState, Particle, Species};
use crate::simulation::vector::Vector3;

impl From<SpeciesConfig> for Species {
    fn from(cfg: SpeciesConfig) -> Self {
        match cfg {
            SpeciesConfig::Proton => Species::Proton,
            SpeciesConfig::Electron => Species::Electron,
        }
    }
}

impl From<DistributionConfig> for Distribution {
    fn from(cfg: DistributionConfig) -> Self {
        match cfg {
            DistributionConfig::Uniform => Distribution::Uniform,
            DistributionConfig::Gaussian => Distribution::Gaussian,
        }
    }
}

/// Fully-initialized simulation scenario
///
/// This is the main "runtime bundle" constructed from a [`ScenarioConfig`]:
/// it contains the engine settings, parameters, the field, and every
/// particle at t = 0
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub field: Arc<dyn EmField>,
    pub particles: Vec<Particle>,
    pub bunch: Option<Bunch>,
}

/// Outcome of [`Scenario::run`]
#[derive(Debug, Clone)]
pub struct Report {
    pub steps: usize,             // steps taken by each problem
    pub particles: Vec<Particle>, // final state of each tracked particle
    pub orbits: Vec<usize>,       // completed revolutions per tracked particle
    pub bunch: Option<Bunch>,     // final state of the bunch
    pub records: usize,           // trajectory records written
}

fn build_field(cfg: &FieldConfig) -> Result<Arc<dyn EmField>> {
    let field: Arc<dyn EmField> = match cfg {
        FieldConfig::Uniform { kind, value } => {
            Arc::new(Uniform::new(kind.parse()?, Vector3::try_from(*value)?))
        }
        FieldConfig::Sinusoid {
            kind,
            direction,
            amplitude,
            frequency,
            phase,
            centre,
            bounds,
        } => {
            let kind: FieldType = kind.parse()?;
            let mut builder = Sinusoid::builder(kind)
                .direction(Vector3::try_from(*direction)?)
                .amplitude(*amplitude)
                .frequency(*frequency)
                .phase(*phase);
            if let Some(centre) = centre {
                builder = builder.cavity_centre(Vector3::try_from(*centre)?);
            }
            if let Some([lx, ly, lz]) = *bounds {
                builder = builder.lx(lx).ly(ly).lz(lz);
            }
            Arc::new(builder.build())
        }
    };
    Ok(field)
}

fn build_particle(framework: Framework, cfg: &ParticleConfig) -> Result<Particle> {
    let mut state = InitialState::zero()
        .position(Vector3::try_from(cfg.position)?)
        .velocity(Vector3::try_from(cfg.velocity)?);
    if let Some(a) = cfg.acceleration {
        state = state.acceleration(Vector3::try_from(a)?);
    }

    let species = cfg.species.map(Species::from);
    let mass = cfg
        .mass
        .or(species.map(|s| s.mass()))
        .context("particle needs either a species or a mass")?;
    let charge = cfg.charge.or(species.map(|s| s.charge())).unwrap_or(0.0);
    Ok(framework.charged_particle(state, mass, charge)?)
}

fn build_bunch(framework: Framework, cfg: &BunchConfig, seed: u64) -> Result<Bunch> {
    let spread = |s: Option<[f64; 3]>| s.map(Vector3::try_from).unwrap_or(Ok(Vector3::ZERO));
    let state = InitialState::zero()
        .position(Vector3::try_from(cfg.position)?)
        .position_spread(spread(cfg.position_spread)?)
        .velocity(Vector3::try_from(cfg.velocity)?)
        .velocity_spread(spread(cfg.velocity_spread)?)
        .distribution(cfg.distribution.into());

    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Bunch::of_species(framework, cfg.species.into(), cfg.count, &state, &mut rng)?)
}

fn is_finite(p: &Particle) -> bool {
    p.position().is_finite() && p.velocity().is_finite() && p.acceleration().is_finite()
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            duration: p_cfg.duration,
            h: p_cfg.h.unwrap_or(IvpSolver::DEFAULT_STEP_SIZE),
            seed: p_cfg.seed.unwrap_or(0),
        };
        ensure!(
            parameters.duration.is_finite() && parameters.duration >= 0.0,
            "duration must be finite and non-negative, got {}",
            parameters.duration
        );
        if !(parameters.h > 0.0 && parameters.h.is_finite()) {
            return Err(IvpError::InvalidStepSize(parameters.h).into());
        }

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            framework: cfg.engine.framework.into(),
            solver: IvpSolver::new(cfg.engine.solver.into(), parameters.h),
        };

        // Field: nothing, a single source, or the superposition of all of them
        let mut fields = cfg
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| build_field(f).with_context(|| format!("field {i}")))
            .collect::<Result<Vec<_>>>()?;
        let field: Arc<dyn EmField> = match fields.len() {
            0 => Arc::new(Uniform::electric(Vector3::ZERO)),
            1 => fields.remove(0),
            _ => Arc::new(Superimposed::new(fields)?),
        };

        let particles = cfg
            .particles
            .iter()
            .enumerate()
            .map(|(i, pc)| build_particle(engine.framework, pc).with_context(|| format!("particle {i}")))
            .collect::<Result<Vec<_>>>()?;

        let bunch = cfg
            .bunch
            .as_ref()
            .map(|bc| build_bunch(engine.framework, bc, parameters.seed).context("bunch"))
            .transpose()?;

        ensure!(
            !particles.is_empty() || bunch.is_some(),
            "scenario has neither particles nor a bunch"
        );

        debug!(
            "{} scenario: {} field source(s), {} particle(s), bunch of {}",
            engine.framework,
            cfg.fields.len(),
            particles.len(),
            bunch.as_ref().map_or(0, Bunch::len)
        );

        Ok(Self {
            engine,
            parameters,
            field,
            particles,
            bunch,
        })
    }

    /// Advance every particle and the bunch for the configured duration
    ///
    /// When `trajectory` is given, the first particle's position is written
    /// there at t = 0 and after every step.
    pub fn run(self, trajectory: Option<&Path>) -> Result<Report> {
        let solver = self.engine.solver;
        let duration = self.parameters.duration;
        info!(
            "running {} for {} with {} particle(s)",
            solver,
            duration,
            self.particles.len()
        );

        let writer = trajectory
            .map(|path| {
                TrajectoryWriter::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))
                    .map(|w| Rc::new(RefCell::new(w)))
            })
            .transpose()?;

        let mut report = Report {
            steps: 0,
            particles: Vec::with_capacity(self.particles.len()),
            orbits: Vec::with_capacity(self.particles.len()),
            bunch: None,
            records: 0,
        };

        for (i, particle) in self.particles.into_iter().enumerate() {
            let mut accelerator = ParticleAccelerator::new(particle, self.field.clone());

            let tracker = Rc::new(RefCell::new(OrbitTracker::new(&accelerator.particle().velocity())));
            let seen = tracker.clone();
            accelerator.subscribe(move |a: &ParticleAccelerator| {
                if seen.borrow_mut().has_orbited(&a.particle().velocity()) {
                    debug!("orbit completed at t = {}", a.t());
                }
                Ok(())
            });

            if let (0, Some(w)) = (i, &writer) {
                w.borrow_mut().write(&accelerator.particle().position())?;
                accelerator.subscribe(recorder(w.clone(), |a: &ParticleAccelerator| a.particle().position()));
            }

            report.steps = accelerator
                .solve(&solver, duration)
                .with_context(|| format!("particle {i}"))?;

            let particle = accelerator.into_particle();
            if !is_finite(&particle) {
                warn!("particle {i} left the finite range at t = {duration}");
            }
            debug!("particle {i} after {} steps:\n{particle}", report.steps);

            let orbits = tracker.borrow().orbit_count();
            report.orbits.push(orbits);
            report.particles.push(particle);
        }

        if let Some(bunch) = self.bunch {
            let mut accelerator = BunchAccelerator::new(bunch, self.field.clone());
            report.steps = accelerator.solve(&solver, duration).context("bunch")?;

            let bunch = accelerator.bunch();
            if !bunch.particles().iter().all(is_finite) {
                warn!("bunch members left the finite range at t = {duration}");
            }
            info!(
                "bunch of {}: mean position {}, total energy {}",
                bunch.len(),
                bunch.mean_position(),
                bunch.total_energy()
            );
            report.bunch = Some(bunch);
        }

        if let Some(w) = writer {
            let mut w = w.borrow_mut();
            w.flush()?;
            report.records = w.len();
        }

        info!("done after {} steps, orbits: {:?}", report.steps, report.orbits);
        Ok(report)
    }
}
