use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::simulation::accelerator::ParticleAccelerator;
use crate::simulation::fields::{EmField, Uniform};
use crate::simulation::framework::Framework;
use crate::simulation::integrator::{IvpSolver, Scheme};
use crate::simulation::ivp::Ivp;
use crate::simulation::states::InitialState;
use crate::simulation::vector::Vector3;

/// Unit charge and mass launched along x through B = z, period 2 pi
fn make_cyclotron() -> Result<ParticleAccelerator> {
    let particle = Framework::Newtonian.charged_particle(InitialState::zero().velocity(Vector3::I), 1.0, 1.0)?;
    let field: Arc<dyn EmField> = Arc::new(Uniform::magnetic(Vector3::K));
    Ok(ParticleAccelerator::new(particle, field))
}

/// Run one period; returns (seconds, distance from the start point)
fn closure_error(scheme: Scheme, steps_per_period: usize) -> Result<(f64, f64)> {
    let period = 2.0 * PI;
    let h = period / steps_per_period as f64;
    let solver = IvpSolver::new(scheme, h);
    let mut problem = make_cyclotron()?;

    let t0 = Instant::now();
    problem.solve(&solver, period - h / 2.0)?;
    let elapsed = t0.elapsed().as_secs_f64();

    Ok((elapsed, problem.particle().position().norm()))
}

/// Wall time and closure error of every scheme at a few resolutions
pub fn bench_solvers() -> Result<()> {
    let resolutions = [100, 1_000, 10_000, 100_000];

    for n in resolutions {
        for scheme in Scheme::ALL {
            let (secs, err) = closure_error(scheme, n)?;
            println!(
                "steps = {n:6}, {:>14}: time = {:9.6} s, closure error = {:.3e}",
                scheme.name(),
                secs,
                err
            );
        }
    }
    Ok(())
}

/// Closure error against steps per period, one column per scheme
/// Paste output directly into a spreadsheet to graph convergence
pub fn bench_solver_curve() -> Result<()> {
    let names: Vec<_> = Scheme::ALL.iter().map(Scheme::name).collect();
    println!("steps,{}", names.join(","));

    // Powers of two so the slopes read off cleanly on a log-log plot
    for k in 6..=16 {
        let n = 1usize << k;
        let mut row = vec![n.to_string()];
        for scheme in Scheme::ALL {
            let (_, err) = closure_error(scheme, n)?;
            row.push(format!("{err:.6e}"));
        }
        println!("{}", row.join(","));
    }
    Ok(())
}
