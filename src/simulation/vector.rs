//! Immutable 3D vector used for positions, velocities, accelerations and fields.
//!
//! `Vector3` wraps a nalgebra `Vector3<f64>` (`NVec3`). Construction through
//! [`Vector3::new`] rejects non-finite components; arithmetic on vectors that
//! already exist never re-validates, so overflow (e.g. a particle pushed past
//! the speed of light) shows up as inf/NaN components downstream.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::Vector3 as NalgebraVector3;

use crate::simulation::error::InvalidArgument;

pub type NVec3 = NalgebraVector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3(NVec3);

impl Vector3 {
    pub const ZERO: Vector3 = Vector3(NVec3::new(0.0, 0.0, 0.0));
    pub const ONES: Vector3 = Vector3(NVec3::new(1.0, 1.0, 1.0));
    pub const I: Vector3 = Vector3(NVec3::new(1.0, 0.0, 0.0));
    pub const J: Vector3 = Vector3(NVec3::new(0.0, 1.0, 0.0));
    pub const K: Vector3 = Vector3(NVec3::new(0.0, 0.0, 1.0));

    /// Build a vector from finite components
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, InvalidArgument> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(InvalidArgument::NonFiniteComponents { x, y, z });
        }
        Ok(Self(NVec3::new(x, y, z)))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.0.x, self.0.y, self.0.z]
    }

    pub fn scale(&self, c: f64) -> Self {
        Self(self.0 * c)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self(self.0.cross(&other.0))
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Unit vector in the same direction
    /// A vector whose norm is zero is returned unchanged.
    pub fn unit(&self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            *self
        } else {
            self.scale(1.0 / n)
        }
    }

    /// a · (b × c)
    pub fn scalar_triple(a: &Self, b: &Self, c: &Self) -> f64 {
        a.dot(&b.cross(c))
    }

    /// a × (b × c)
    pub fn vector_triple(a: &Self, b: &Self, c: &Self) -> Self {
        a.cross(&b.cross(c))
    }

    /// Finite check for state produced by arithmetic (construction is always finite)
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<[f64; 3]> for Vector3 {
    type Error = InvalidArgument;

    fn try_from(c: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(c[0], c[1], c[2])
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, c: f64) -> Self {
        self.scale(c)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;
    fn mul(self, v: Vector3) -> Vector3 {
        v.scale(self)
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, c: f64) -> Self {
        Self(self.0 / c)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.0.x, self.0.y, self.0.z)
    }
}
