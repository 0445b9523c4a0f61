//! Four-momentum and three-vector arithmetic in natural units (c = 1).
//!
//! Energies and momenta are in GeV; positions are in metres.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in the lab frame.
///
/// The z axis is the beam axis; the detector front face sits at positive z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl Vector3 {
    /// Construct a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y.mul_add(other.y, self.z * other.z))
    }

    /// Cross product.
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y.mul_add(other.z, -(self.z * other.y)),
            self.z.mul_add(other.x, -(self.x * other.z)),
            self.x.mul_add(other.y, -(self.y * other.x)),
        )
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn unit(self) -> Option<Self> {
        let len = self.norm();
        if len.is_finite() && len > f64::EPSILON {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Whether every component is finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Energy-momentum four-vector `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Momentum x component.
    pub px: f64,
    /// Momentum y component.
    pub py: f64,
    /// Momentum z component (beam axis).
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// Construct a four-momentum from its components.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// A particle of the given mass at rest.
    pub const fn at_rest(mass: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, mass)
    }

    /// Build a four-momentum from a three-momentum and an energy.
    pub const fn from_parts(p: Vector3, e: f64) -> Self {
        Self::new(p.x, p.y, p.z, e)
    }

    /// The spatial part.
    pub const fn momentum(&self) -> Vector3 {
        Vector3::new(self.px, self.py, self.pz)
    }

    /// Magnitude of the three-momentum.
    pub fn p(&self) -> f64 {
        self.momentum().norm()
    }

    /// Invariant mass squared `E^2 - |p|^2`.
    pub fn mass_squared(&self) -> f64 {
        self.e.mul_add(self.e, -self.momentum().dot(self.momentum()))
    }

    /// Invariant mass. Spacelike vectors (rounding noise included) report
    /// the negative root, matching the usual four-vector convention.
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 >= 0.0 { m2.sqrt() } else { -(-m2).sqrt() }
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.px - other.px).abs() <= tolerance
            && (self.py - other.py).abs() <= tolerance
            && (self.pz - other.pz).abs() <= tolerance
            && (self.e - other.e).abs() <= tolerance
    }
}

impl Add for FourMomentum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.px + rhs.px,
            self.py + rhs.py,
            self.pz + rhs.pz,
            self.e + rhs.e,
        )
    }
}

impl Sub for FourMomentum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.px - rhs.px,
            self.py - rhs.py,
            self.pz - rhs.pz,
            self.e - rhs.e,
        )
    }
}
