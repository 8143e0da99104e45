pub mod simulation;
pub mod configuration;
pub mod recording;
pub mod benchmark;

pub use simulation::vector::{Vector3, NVec3};
pub use simulation::error::InvalidArgument;
pub use simulation::framework::{Framework, gamma, C};
pub use simulation::states::{InitialState, MaterialPoint, Particle, Species, Distribution};
pub use simulation::fields::{EmField, FieldType, Uniform, Sinusoid, SinusoidBuilder, Superimposed, ElectricField, MagneticField};
pub use simulation::ivp::{Ivp, IvpError, Observers, Subscriber, state_slot};
pub use simulation::integrator::{IvpSolver, Scheme};
pub use simulation::accelerator::{ParticleAccelerator, NewtonSecondLaw};
pub use simulation::bunch::{Bunch, BunchAccelerator};
pub use simulation::scenario::{Scenario, Report};

pub use configuration::config::{EngineConfig, ParametersConfig, FieldConfig, ParticleConfig, BunchConfig, ScenarioConfig};

pub use recording::{orbit::OrbitTracker, trajectory::{TrajectoryWriter, TrajectoryReader, TrajectoryError, recorder}};

pub use benchmark::benchmark::{bench_solvers, bench_solver_curve};
