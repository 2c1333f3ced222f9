use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// A three-component vector. 2D callers leave `z` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Right-hand side of a component-wise vector operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Vector(Vector),
    Scalar(f64),
}

impl Operand {
    /// The operand as a vector; a scalar `s` stands for `(s, s, s)`.
    pub fn as_vector(self) -> Vector {
        match self {
            Operand::Vector(v) => v,
            Operand::Scalar(s) => Vector::new(s, s, s),
        }
    }
}

impl From<Vector> for Operand {
    fn from(v: Vector) -> Self {
        Operand::Vector(v)
    }
}

impl From<f64> for Operand {
    fn from(s: f64) -> Self {
        Operand::Scalar(s)
    }
}

impl Vector {
    pub const ZERO: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Vector { x, y, z: 0.0 }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    // Applies `op` per component against another vector or a broadcast scalar
    fn zip_with(self, rhs: impl Into<Operand>, op: impl Fn(f64, f64) -> f64) -> Vector {
        let [rx, ry, rz] = rhs.into().as_vector().to_array();
        Vector::new(op(self.x, rx), op(self.y, ry), op(self.z, rz))
    }

    pub fn add(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, |a, b| a + b)
    }

    pub fn subtract(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, |a, b| a - b)
    }

    pub fn divide(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, |a, b| a / b)
    }

    pub fn floor_divide(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, |a, b| (a / b).floor())
    }

    /// Component-wise product. A scalar scales the whole vector.
    pub fn multiply(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, |a, b| a * b)
    }

    /// Component-wise power.
    pub fn power(self, rhs: impl Into<Operand>) -> Vector {
        self.zip_with(rhs, f64::powf)
    }

    /// Scalar (dot) product. This is what `*` between two vectors means.
    pub fn dot(self, rhs: Vector) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Vector (cross) product.
    pub fn cross(self, rhs: Vector) -> Vector {
        Vector::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Euclidean norm.
    pub fn mag(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, `None` for a zero or non-finite vector.
    pub fn normalized(self) -> Option<Vector> {
        let mag = self.mag();
        (mag > 0.0 && mag.is_finite()).then(|| self.multiply(1.0 / mag))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector [{}, {}, {}]", self.x, self.y, self.z)
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index {index} out of range for a 3-component vector"),
        }
    }
}

impl IntoIterator for Vector {
    type Item = f64;
    type IntoIter = std::array::IntoIter<f64, 3>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

impl From<[f64; 3]> for Vector {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vector::new(x, y, z)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Vector::planar(x, y)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Add<f64> for Vector {
    type Output = Vector;
    fn add(self, rhs: f64) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        self.subtract(rhs)
    }
}

impl Sub<f64> for Vector {
    type Output = Vector;
    fn sub(self, rhs: f64) -> Vector {
        self.subtract(rhs)
    }
}

/// `Vector * Vector` is the dot product and yields a scalar.
impl Mul for Vector {
    type Output = f64;
    fn mul(self, rhs: Vector) -> f64 {
        self.dot(rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        self.multiply(rhs)
    }
}

impl Div for Vector {
    type Output = Vector;
    fn div(self, rhs: Vector) -> Vector {
        self.divide(rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;
    fn div(self, rhs: f64) -> Vector {
        self.divide(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn magnitude_of_3_4_0_is_5() {
        assert_relative_eq!(Vector::new(3.0, 4.0, 0.0).mag(), 5.0);
    }

    #[test]
    fn dot_commutes_and_cross_anticommutes() {
        let a = Vector::new(1.5, -2.0, 0.25);
        let b = Vector::new(-3.0, 0.5, 4.0);
        assert_eq!(a * b, b * a);
        assert_eq!(a.cross(b), -(b.cross(a)));
    }

    #[test]
    fn cross_of_unit_axes() {
        let x = Vector::new(1.0, 0.0, 0.0);
        let y = Vector::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn scalar_operands_apply_to_every_component() {
        let v = Vector::new(2.0, -3.0, 4.0);
        assert_eq!(v + 1.0, Vector::new(3.0, -2.0, 5.0));
        assert_eq!(v.power(2.0), Vector::new(4.0, 9.0, 16.0));
        assert_eq!(v.floor_divide(3.0), Vector::new(0.0, -1.0, 1.0));
        // z is 0 for planar vectors, so 0 / 0 surfaces as NaN
        assert!(Vector::planar(1.0, 1.0).divide(0.0).z.is_nan());
    }

    #[test]
    fn iteration_and_indexing_follow_xyz_order() {
        let v = Vector::new(7.0, 8.0, 9.0);
        assert_eq!(v.into_iter().collect::<Vec<_>>(), vec![7.0, 8.0, 9.0]);
        assert_eq!(v[2], 9.0);
    }

    #[test]
    fn equality_compares_all_components() {
        assert_ne!(Vector::new(1.0, 2.0, 3.0), Vector::new(1.0, 2.0, 0.0));
        assert_eq!(Vector::planar(1.0, 2.0), Vector::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn display_lists_components() {
        assert_eq!(Vector::new(1.0, 2.5, 0.0).to_string(), "Vector [1, 2.5, 0]");
    }
}
