//! Revolution counting for orbiting particles
//!
//! The tracker compares the current direction of motion with the initial
//! one. Their dot product peaks once per revolution; a peak is recognised on
//! the first call after it, when the measure stops rising.

use crate::simulation::vector::Vector3;

#[derive(Debug, Clone)]
pub struct OrbitTracker {
    initial_tangent: Vector3,
    approaching_peak: bool,
    last_measure: f64,
    orbits: usize,
}

impl OrbitTracker {
    /// Start tracking from the particle's current velocity
    pub fn new(velocity: &Vector3) -> Self {
        let initial_tangent = velocity.unit();
        Self {
            initial_tangent,
            approaching_peak: false,
            last_measure: initial_tangent.dot(&initial_tangent),
            orbits: 0,
        }
    }

    fn measure(&self, velocity: &Vector3) -> f64 {
        self.initial_tangent.dot(&velocity.unit())
    }

    /// Feed the current velocity; true when a revolution just completed
    pub fn has_orbited(&mut self, velocity: &Vector3) -> bool {
        let measure = self.measure(velocity);
        let falling = measure <= self.last_measure;
        let at_peak = self.approaching_peak && falling;

        self.approaching_peak = !falling;
        self.last_measure = measure;
        if at_peak {
            self.orbits += 1;
        }
        at_peak
    }

    pub fn orbit_count(&self) -> usize {
        self.orbits
    }
}
