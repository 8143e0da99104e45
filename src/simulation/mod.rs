pub mod vector;
pub mod error;
pub mod framework;
pub mod states;
pub mod fields;
pub mod ivp;
pub mod integrator;
pub mod accelerator;
pub mod bunch;
pub mod params;
pub mod engine;
pub mod scenario;
