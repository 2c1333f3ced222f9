//! Built-in sample functions the command-line driver can load onto a mesh.

use crate::vector::Vector;
use serde::{Deserialize, Serialize};

fn coords(p: &[f64]) -> (f64, f64, f64) {
    (p[0], p[1], p.get(2).copied().unwrap_or(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarSample {
    /// f = x
    Plane,
    /// f = x² + y² + z²
    Paraboloid,
    /// f = x² - y²
    Saddle,
    /// f = exp(-(x² + y² + z²))
    Gaussian,
}

impl ScalarSample {
    pub fn eval(self, p: &[f64]) -> f64 {
        let (x, y, z) = coords(p);
        match self {
            ScalarSample::Plane => x,
            ScalarSample::Paraboloid => x * x + y * y + z * z,
            ScalarSample::Saddle => x * x - y * y,
            ScalarSample::Gaussian => (-(x * x + y * y + z * z)).exp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSample {
    /// v = (1, 0, 0)
    Uniform,
    /// v = (x, y, z)
    Radial,
    /// v = (-y, x, 0)
    Rotation,
    /// v = (y, 0, 0)
    Shear,
}

impl VectorSample {
    pub fn eval(self, p: &[f64]) -> Vector {
        let (x, y, z) = coords(p);
        match self {
            VectorSample::Uniform => Vector::new(1.0, 0.0, 0.0),
            VectorSample::Radial => Vector::new(x, y, z),
            VectorSample::Rotation => Vector::planar(-y, x),
            VectorSample::Shear => Vector::planar(y, 0.0),
        }
    }
}
