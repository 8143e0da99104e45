//! Electromagnetic fields
//!
//! Every field implements [`EmField`]: pure functions `E(r, t)` and `B(r, t)`
//! plus the derived Lorentz force. Provided fields:
//! - [`Uniform`]: constant electric or magnetic value everywhere
//! - [`Sinusoid`]: `direction * A sin(wt + phi)` inside an axis-aligned cavity, zero outside
//! - [`Superimposed`]: sum of two or more shared fields
//! - [`ElectricField`] / [`MagneticField`]: arbitrary single-component fields from a closure
//!
//! Fields are immutable once built and are shared between problems through `Arc`.

use std::str::FromStr;
use std::sync::Arc;

use crate::simulation::error::InvalidArgument;
use crate::simulation::states::Particle;
use crate::simulation::vector::Vector3;

/// Which component of the electromagnetic field a single-component field feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Electric,
    Magnetic,
}

impl FromStr for FieldType {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "electric" | "e" => Ok(FieldType::Electric),
            "magnetic" | "b" => Ok(FieldType::Magnetic),
            _ => Err(InvalidArgument::UnknownFieldType(s.to_string())),
        }
    }
}

/// Field contract over space-time
pub trait EmField: Send + Sync {
    /// Electric field at `r`, time `t`
    fn e(&self, r: Vector3, t: f64) -> Vector3;

    /// Magnetic field at `r`, time `t`
    fn b(&self, r: Vector3, t: f64) -> Vector3;

    /// F = q (v × B + E)
    fn lorentz_force(&self, q: f64, v: Vector3, r: Vector3, t: f64) -> Vector3 {
        (v.cross(&self.b(r, t)) + self.e(r, t)).scale(q)
    }

    /// Lorentz force on `particle` at its current position and velocity
    fn lorentz_force_on(&self, particle: &Particle, t: f64) -> Vector3 {
        self.lorentz_force(particle.charge(), particle.velocity(), particle.position(), t)
    }
}

/// Homogeneous, static field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    kind: FieldType,
    value: Vector3,
}

impl Uniform {
    pub fn new(kind: FieldType, value: Vector3) -> Self {
        Self { kind, value }
    }

    pub fn electric(value: Vector3) -> Self {
        Self::new(FieldType::Electric, value)
    }

    pub fn magnetic(value: Vector3) -> Self {
        Self::new(FieldType::Magnetic, value)
    }
}

impl EmField for Uniform {
    fn e(&self, _r: Vector3, _t: f64) -> Vector3 {
        match self.kind {
            FieldType::Electric => self.value,
            FieldType::Magnetic => Vector3::ZERO,
        }
    }

    fn b(&self, _r: Vector3, _t: f64) -> Vector3 {
        match self.kind {
            FieldType::Electric => Vector3::ZERO,
            FieldType::Magnetic => self.value,
        }
    }
}

/// Time-harmonic field confined to an accelerating cavity
///
/// The cavity is the box `|r - centre| <= (lx, ly, lz)` componentwise.
/// Built with [`SinusoidBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sinusoid {
    kind: FieldType,
    centre: Vector3,
    lx: f64,
    ly: f64,
    lz: f64,
    direction: Vector3,
    amplitude: f64,
    frequency: f64, // angular
    phase: f64,
}

impl Sinusoid {
    pub fn builder(kind: FieldType) -> SinusoidBuilder {
        SinusoidBuilder::new(kind)
    }

    pub fn in_cavity(&self, r: &Vector3) -> bool {
        (r.x() - self.centre.x()).abs() <= self.lx
            && (r.y() - self.centre.y()).abs() <= self.ly
            && (r.z() - self.centre.z()).abs() <= self.lz
    }

    /// A sin(wt + phi)
    pub fn magnitude(&self, t: f64) -> f64 {
        self.amplitude * (self.frequency * t + self.phase).sin()
    }

    fn value(&self, r: Vector3, t: f64) -> Vector3 {
        if self.in_cavity(&r) {
            self.direction.scale(self.magnitude(t))
        } else {
            Vector3::ZERO
        }
    }
}

impl EmField for Sinusoid {
    fn e(&self, r: Vector3, t: f64) -> Vector3 {
        match self.kind {
            FieldType::Electric => self.value(r, t),
            FieldType::Magnetic => Vector3::ZERO,
        }
    }

    fn b(&self, r: Vector3, t: f64) -> Vector3 {
        match self.kind {
            FieldType::Electric => Vector3::ZERO,
            FieldType::Magnetic => self.value(r, t),
        }
    }
}

/// Builder for [`Sinusoid`]
///
/// Cavity bounds default to +inf (unbounded), the centre to the origin,
/// everything else to zero.
#[derive(Debug, Clone, Copy)]
pub struct SinusoidBuilder {
    kind: FieldType,
    centre: Vector3,
    lx: f64,
    ly: f64,
    lz: f64,
    direction: Vector3,
    amplitude: f64,
    frequency: f64,
    phase: f64,
}

impl SinusoidBuilder {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            centre: Vector3::ZERO,
            lx: f64::INFINITY,
            ly: f64::INFINITY,
            lz: f64::INFINITY,
            direction: Vector3::ZERO,
            amplitude: 0.0,
            frequency: 0.0,
            phase: 0.0,
        }
    }

    pub fn cavity_centre(mut self, r: Vector3) -> Self {
        self.centre = r;
        self
    }

    pub fn lx(mut self, x: f64) -> Self {
        self.lx = x;
        self
    }

    pub fn ly(mut self, y: f64) -> Self {
        self.ly = y;
        self
    }

    pub fn lz(mut self, z: f64) -> Self {
        self.lz = z;
        self
    }

    /// Stored normalized
    pub fn direction(mut self, r: Vector3) -> Self {
        self.direction = r.unit();
        self
    }

    pub fn amplitude(mut self, a: f64) -> Self {
        self.amplitude = a;
        self
    }

    /// Angular frequency (rad/s)
    pub fn frequency(mut self, omega: f64) -> Self {
        self.frequency = omega;
        self
    }

    pub fn phase(mut self, phi: f64) -> Self {
        self.phase = phi;
        self
    }

    pub fn build(self) -> Sinusoid {
        Sinusoid {
            kind: self.kind,
            centre: self.centre,
            lx: self.lx,
            ly: self.ly,
            lz: self.lz,
            direction: self.direction,
            amplitude: self.amplitude,
            frequency: self.frequency,
            phase: self.phase,
        }
    }
}

/// Vector sum of two or more fields
///
/// Constituents are held by shared reference; the same field may feed
/// several superpositions and problems at once.
#[derive(Clone)]
pub struct Superimposed {
    fields: Vec<Arc<dyn EmField>>,
}

impl Superimposed {
    pub fn new(fields: Vec<Arc<dyn EmField>>) -> Result<Self, InvalidArgument> {
        if fields.len() < 2 {
            return Err(InvalidArgument::TooFewFields(fields.len()));
        }
        Ok(Self { fields })
    }

    pub fn pair(a: Arc<dyn EmField>, b: Arc<dyn EmField>) -> Self {
        Self { fields: vec![a, b] }
    }

    /// Add a further constituent
    pub fn with(mut self, field: Arc<dyn EmField>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl EmField for Superimposed {
    fn e(&self, r: Vector3, t: f64) -> Vector3 {
        self.fields
            .iter()
            .fold(Vector3::ZERO, |acc, f| acc + f.e(r, t))
    }

    fn b(&self, r: Vector3, t: f64) -> Vector3 {
        self.fields
            .iter()
            .fold(Vector3::ZERO, |acc, f| acc + f.b(r, t))
    }
}

/// Arbitrary electric field; the magnetic component is zero
pub struct ElectricField<F> {
    e: F,
}

impl<F> ElectricField<F>
where
    F: Fn(Vector3, f64) -> Vector3 + Send + Sync,
{
    pub fn new(e: F) -> Self {
        Self { e }
    }
}

impl<F> EmField for ElectricField<F>
where
    F: Fn(Vector3, f64) -> Vector3 + Send + Sync,
{
    fn e(&self, r: Vector3, t: f64) -> Vector3 {
        (self.e)(r, t)
    }

    fn b(&self, _r: Vector3, _t: f64) -> Vector3 {
        Vector3::ZERO
    }
}

/// Arbitrary magnetic field; the electric component is zero
pub struct MagneticField<F> {
    b: F,
}

impl<F> MagneticField<F>
where
    F: Fn(Vector3, f64) -> Vector3 + Send + Sync,
{
    pub fn new(b: F) -> Self {
        Self { b }
    }
}

impl<F> EmField for MagneticField<F>
where
    F: Fn(Vector3, f64) -> Vector3 + Send + Sync,
{
    fn e(&self, _r: Vector3, _t: f64) -> Vector3 {
        Vector3::ZERO
    }

    fn b(&self, r: Vector3, t: f64) -> Vector3 {
        (self.b)(r, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOL: f64 = 1e-10;

    fn assert_vectors_close(expected: Vector3, actual: Vector3) {
        assert_abs_diff_eq!(expected.x(), actual.x(), epsilon = TOL);
        assert_abs_diff_eq!(expected.y(), actual.y(), epsilon = TOL);
        assert_abs_diff_eq!(expected.z(), actual.z(), epsilon = TOL);
    }

    fn random_vector(rng: &mut StdRng) -> Vector3 {
        Vector3::new(rng.gen(), rng.gen(), rng.gen()).unwrap()
    }

    #[test]
    fn field_type_parsing() {
        assert_eq!("electric".parse::<FieldType>(), Ok(FieldType::Electric));
        assert_eq!("MAGNETIC".parse::<FieldType>(), Ok(FieldType::Magnetic));
        assert_eq!(
            "gravitational".parse::<FieldType>(),
            Err(InvalidArgument::UnknownFieldType("gravitational".to_string()))
        );
    }

    #[test]
    fn uniform_fields_are_independent_of_position_and_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = random_vector(&mut rng);
        let e = Uniform::electric(value);
        let b = Uniform::magnetic(value);

        for _ in 0..20 {
            let r = random_vector(&mut rng);
            let t: f64 = rng.gen();
            assert_eq!(e.e(r, t), value);
            assert_eq!(e.b(r, t), Vector3::ZERO);
            assert_eq!(b.b(r, t), value);
            assert_eq!(b.e(r, t), Vector3::ZERO);
        }
    }

    #[test]
    fn lorentz_force_combines_both_components() {
        let e = Arc::new(Uniform::electric(Vector3::I * 1000.0)) as Arc<dyn EmField>;
        let b = Arc::new(Uniform::magnetic(Vector3::K)) as Arc<dyn EmField>;
        let field = Superimposed::pair(e, b);

        let q = 1e-6;
        let v = Vector3::I * 100.0;
        let f = field.lorentz_force(q, v, Vector3::ZERO, 0.0);

        // q (v x B + E) = 1e-6 * ((0, -100, 0) + (1000, 0, 0))
        assert_vectors_close(Vector3::new(1e-3, -1e-4, 0.0).unwrap(), f);
    }

    fn cavity(rng: &mut StdRng, kind: FieldType) -> (Sinusoid, Vector3, [f64; 3], Vector3, f64) {
        let centre = random_vector(rng);
        let bounds = [rng.gen::<f64>() + 0.1, rng.gen::<f64>() + 0.1, rng.gen::<f64>() + 0.1];
        let direction = random_vector(rng);
        let (amplitude, frequency, phase): (f64, f64, f64) = (rng.gen(), rng.gen(), rng.gen());
        let s = Sinusoid::builder(kind)
            .amplitude(amplitude)
            .frequency(frequency)
            .phase(phase)
            .direction(direction)
            .cavity_centre(centre)
            .lx(bounds[0])
            .ly(bounds[1])
            .lz(bounds[2])
            .build();
        let t: f64 = rng.gen();
        let expected = direction.unit().scale(amplitude * (frequency * t + phase).sin());
        (s, centre, bounds, expected, t)
    }

    #[test]
    fn sinusoid_inside_cavity() {
        let mut rng = StdRng::seed_from_u64(2);
        for kind in [FieldType::Electric, FieldType::Magnetic] {
            let (s, centre, bounds, expected, t) = cavity(&mut rng, kind);
            let offset = Vector3::new(
                rng.gen::<f64>() * bounds[0],
                -rng.gen::<f64>() * bounds[1],
                rng.gen::<f64>() * bounds[2],
            )
            .unwrap();
            let r = centre + offset;

            let (active, idle) = match kind {
                FieldType::Electric => (s.e(r, t), s.b(r, t)),
                FieldType::Magnetic => (s.b(r, t), s.e(r, t)),
            };
            assert_vectors_close(expected, active);
            assert_eq!(idle, Vector3::ZERO);
        }
    }

    #[test]
    fn sinusoid_outside_any_bound_is_exactly_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let (s, centre, bounds, _, t) = cavity(&mut rng, FieldType::Electric);

        for (axis, bound) in [(Vector3::I, bounds[0]), (Vector3::J, bounds[1]), (Vector3::K, bounds[2])] {
            let r = centre + axis.scale((1.01 + rng.gen::<f64>()) * bound);
            assert_eq!(s.e(r, t), Vector3::ZERO);
            let r = centre - axis.scale((1.01 + rng.gen::<f64>()) * bound);
            assert_eq!(s.e(r, t), Vector3::ZERO);
        }
    }

    #[test]
    fn cavity_face_is_inside() {
        let s = Sinusoid::builder(FieldType::Electric)
            .lx(1.0)
            .ly(1.0)
            .lz(1.0)
            .direction(Vector3::I)
            .amplitude(2.0)
            .phase(std::f64::consts::FRAC_PI_2)
            .build();

        assert_vectors_close(Vector3::I * 2.0, s.e(Vector3::I, 0.0));
        assert_vectors_close(Vector3::I * 2.0, s.e(-Vector3::K, 0.0));
        assert_eq!(s.e(Vector3::I * (1.0 + 1e-12), 0.0), Vector3::ZERO);
    }

    #[test]
    fn sinusoid_defaults_to_unbounded_cavity_at_origin() {
        let s = Sinusoid::builder(FieldType::Magnetic)
            .direction(Vector3::K * 5.0)
            .amplitude(2.0)
            .frequency(1.0)
            .build();
        let far = Vector3::new(1e12, -1e12, 1e12).unwrap();
        let t = std::f64::consts::FRAC_PI_2;

        assert!(s.in_cavity(&far));
        assert_vectors_close(Vector3::K * 2.0, s.b(far, t));
    }

    #[test]
    fn superposition_is_the_sum_of_its_constituents() {
        let mut rng = StdRng::seed_from_u64(4);
        let f1: Arc<dyn EmField> = Arc::new(Uniform::electric(random_vector(&mut rng)));
        let f2: Arc<dyn EmField> = Arc::new(
            Sinusoid::builder(FieldType::Magnetic)
                .direction(random_vector(&mut rng))
                .amplitude(3.0)
                .frequency(2.0)
                .build(),
        );
        let f3: Arc<dyn EmField> = Arc::new(MagneticField::new(|r: Vector3, t: f64| r.scale(t)));
        let sum = Superimposed::new(vec![f1.clone(), f2.clone()]).unwrap().with(f3.clone());

        for _ in 0..20 {
            let r = random_vector(&mut rng);
            let t: f64 = rng.gen();
            assert_vectors_close(f1.e(r, t) + f2.e(r, t) + f3.e(r, t), sum.e(r, t));
            assert_vectors_close(f1.b(r, t) + f2.b(r, t) + f3.b(r, t), sum.b(r, t));
        }
        assert_eq!(sum.len(), 3);
    }

    #[test]
    fn superposition_needs_two_fields() {
        let f: Arc<dyn EmField> = Arc::new(Uniform::electric(Vector3::I));
        assert_eq!(Superimposed::new(vec![]).err(), Some(InvalidArgument::TooFewFields(0)));
        assert_eq!(Superimposed::new(vec![f]).err(), Some(InvalidArgument::TooFewFields(1)));
    }

    #[test]
    fn closure_fields_fill_one_component() {
        let e = ElectricField::new(|r: Vector3, _t: f64| r);
        let r = Vector3::new(1.0, 2.0, 3.0).unwrap();
        assert_eq!(e.e(r, 0.0), r);
        assert_eq!(e.b(r, 0.0), Vector3::ZERO);
    }
}
