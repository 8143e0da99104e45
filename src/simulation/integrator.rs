//! Fixed-step solvers for second-order initial value problems
//!
//! Every scheme maps the current problem state `(y, y')` at time `t` to the
//! increments `[Δy, Δy']` for one step of size `h`. Schemes keep no memory
//! between calls apart from their step size, so the same state always gives
//! the same increments.
//!
//! | scheme          | Δy                        | Δy'                        |
//! |-----------------|---------------------------|----------------------------|
//! | Euler           | y' h                      | f h                        |
//! | Euler-Cromer    | (y' + f h) h              | f h                        |
//! | Midpoint        | y'_mid h                  | f(y_mid, t + h/2) h        |
//! | Velocity-Verlet | (y' + f h/2) h            | f h/2 + f(y_new, t + h) h/2 |
//! | RK4             | (k0 + 2k1 + 2k2 + k3) / 6 | (l0 + 2l1 + 2l2 + l3) / 6  |

use std::fmt;

use crate::simulation::ivp::{state_slot, Ivp, IvpError};
use crate::simulation::vector::Vector3;

/// Increments `[Δy, Δy']` for one step
pub type Increments = [Vector3; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Euler,
    EulerCromer,
    Midpoint,
    VelocityVerlet,
    RungeKutta4,
}

impl Scheme {
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Euler => "EULER",
            Scheme::EulerCromer => "EULERCROMER",
            Scheme::Midpoint => "MIDPOINT",
            Scheme::VelocityVerlet => "VELOCITYVERLET",
            Scheme::RungeKutta4 => "RK4",
        }
    }

    pub const ALL: [Scheme; 5] = [
        Scheme::Euler,
        Scheme::EulerCromer,
        Scheme::Midpoint,
        Scheme::VelocityVerlet,
        Scheme::RungeKutta4,
    ];
}

/// A scheme paired with its fixed step size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvpSolver {
    scheme: Scheme,
    h: f64,
}

impl IvpSolver {
    pub const DEFAULT_STEP_SIZE: f64 = 1e-3;

    pub fn new(scheme: Scheme, h: f64) -> Self {
        Self { scheme, h }
    }

    pub fn euler(h: f64) -> Self {
        Self::new(Scheme::Euler, h)
    }

    pub fn euler_cromer(h: f64) -> Self {
        Self::new(Scheme::EulerCromer, h)
    }

    pub fn midpoint(h: f64) -> Self {
        Self::new(Scheme::Midpoint, h)
    }

    pub fn velocity_verlet(h: f64) -> Self {
        Self::new(Scheme::VelocityVerlet, h)
    }

    pub fn rk4(h: f64) -> Self {
        Self::new(Scheme::RungeKutta4, h)
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn step_size(&self) -> f64 {
        self.h
    }

    pub fn name(&self) -> &'static str {
        self.scheme.name()
    }

    /// Increments taking the problem from its current mesh point to the next
    pub fn dy<P: Ivp + ?Sized>(&self, ivp: &P) -> Result<Increments, IvpError> {
        match self.scheme {
            Scheme::Euler => euler(ivp, self.h),
            Scheme::EulerCromer => euler_cromer(ivp, self.h),
            Scheme::Midpoint => midpoint(ivp, self.h),
            Scheme::VelocityVerlet => velocity_verlet(ivp, self.h),
            Scheme::RungeKutta4 => runge_kutta_4(ivp, self.h),
        }
    }
}

/// Default step size
impl From<Scheme> for IvpSolver {
    fn from(scheme: Scheme) -> Self {
        Self::new(scheme, Self::DEFAULT_STEP_SIZE)
    }
}

impl fmt::Display for IvpSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (h = {})", self.name(), self.h)
    }
}

fn euler<P: Ivp + ?Sized>(ivp: &P, h: f64) -> Result<Increments, IvpError> {
    let y = ivp.y(); // [x_n, v_n]
    let v = state_slot(&y, 1)?;

    // x_n+1 = x_n + h v_n, v_n+1 = v_n + h a_n
    Ok([v.scale(h), ivp.f(&y, ivp.t())?.scale(h)])
}

fn euler_cromer<P: Ivp + ?Sized>(ivp: &P, h: f64) -> Result<Increments, IvpError> {
    let y = ivp.y();

    // v_n+1 = v_n + h a_n
    let dv = ivp.f(&y, ivp.t())?.scale(h);

    // x_n+1 = x_n + h v_n+1, position uses the already-updated velocity
    let dr = (state_slot(&y, 1)? + dv).scale(h);
    Ok([dr, dv])
}

fn midpoint<P: Ivp + ?Sized>(ivp: &P, h: f64) -> Result<Increments, IvpError> {
    let y = ivp.y();
    let (r, v) = (state_slot(&y, 0)?, state_slot(&y, 1)?);

    // Euler half step to the midpoint: (x_n+1/2, v_n+1/2)
    let [half_r, half_v] = euler(ivp, h / 2.0)?;
    let mid = [r + half_r, v + half_v];

    // a_n+1/2 at t_n + h/2, then v_n+1 = v_n + h a_n+1/2
    let dv = ivp.f(&mid, ivp.t_after(h / 2.0))?.scale(h);

    // x_n+1 = x_n + h v_n+1/2
    let dr = mid[1].scale(h);
    Ok([dr, dv])
}

fn velocity_verlet<P: Ivp + ?Sized>(ivp: &P, h: f64) -> Result<Increments, IvpError> {
    let y = ivp.y();
    let (r, v) = (state_slot(&y, 0)?, state_slot(&y, 1)?);
    let half_h = 0.5 * h; // half step h/2

    // a_n from x_n at time t_n
    let a = ivp.f(&y, ivp.t())?;

    // Drift: x_n+1 = x_n + (v_n + a_n h/2) h
    let dr = (v + a.scale(half_h)).scale(h);

    // a_n+1 from x_n+1 at time t_n+1, velocity predicted by a full Euler kick
    let next = [r + dr, v + a.scale(h)];
    let a_next = ivp.f(&next, ivp.t_after(h))?;

    // Kick: v_n+1 = v_n + (a_n + a_n+1) h/2
    let dv = a.scale(half_h) + a_next.scale(half_h);
    Ok([dr, dv])
}

fn runge_kutta_4<P: Ivp + ?Sized>(ivp: &P, h: f64) -> Result<Increments, IvpError> {
    let y = ivp.y();
    let (r, v) = (state_slot(&y, 0)?, state_slot(&y, 1)?);

    // k: position slopes, l: velocity slopes (both already scaled by h)

    // slopes at the start of the step, t_n
    let k0 = v.scale(h);
    let l0 = ivp.f(&y, ivp.t())?.scale(h);

    // first midpoint estimate, from the start slopes, at t_n + h/2
    let s1 = [r + k0.scale(0.5), v + l0.scale(0.5)];
    let k1 = (v + l0.scale(0.5)).scale(h);
    let l1 = ivp.f(&s1, ivp.t_after(0.5 * h))?.scale(h);

    // second midpoint estimate, from the first one
    let s2 = [r + k1.scale(0.5), v + l1.scale(0.5)];
    let k2 = (v + l1.scale(0.5)).scale(h);
    let l2 = ivp.f(&s2, ivp.t_after(0.5 * h))?.scale(h);

    // end of the step, t_n + h, from the second midpoint slopes
    let s3 = [r + k2, v + l2];
    let k3 = (v + l2).scale(h);
    let l3 = ivp.f(&s3, ivp.t_after(h))?.scale(h);

    // weighted average, 1 2 2 1 over 6
    let dr = (k0 + k1.scale(2.0) + k2.scale(2.0) + k3).scale(1.0 / 6.0);
    let dv = (l0 + l1.scale(2.0) + l2.scale(2.0) + l3).scale(1.0 / 6.0);
    Ok([dr, dv])
}
