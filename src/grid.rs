use crate::error::{FieldError, Result};
use serde::{Deserialize, Serialize};

/// Physical axis of the embedding space. Indexes `origin` and `dist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalAxis {
    X,
    Y,
    Z,
}

impl PhysicalAxis {
    pub fn index(self) -> usize {
        match self {
            PhysicalAxis::X => 0,
            PhysicalAxis::Y => 1,
            PhysicalAxis::Z => 2,
        }
    }
}

/// Rank of a field grid, resolved once when the field is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    OneD,
    TwoD,
    ThreeD,
}

impl Dimensionality {
    pub fn of(ndim: usize) -> Option<Self> {
        match ndim {
            1 => Some(Dimensionality::OneD),
            2 => Some(Dimensionality::TwoD),
            3 => Some(Dimensionality::ThreeD),
            _ => None,
        }
    }

    pub fn ndim(self) -> usize {
        match self {
            Dimensionality::OneD => 1,
            Dimensionality::TwoD => 2,
            Dimensionality::ThreeD => 3,
        }
    }

    /// Physical axis that a grid axis runs along.
    ///
    /// 1D and 2D grids map in order. 3D grids are stored z-major: grid axis 0
    /// is z, axis 1 is x and axis 2 is y.
    pub fn physical_axis(self, grid_axis: usize) -> PhysicalAxis {
        match (self, grid_axis) {
            (Dimensionality::ThreeD, 0) => PhysicalAxis::Z,
            (Dimensionality::ThreeD, 1) => PhysicalAxis::X,
            (Dimensionality::ThreeD, _) => PhysicalAxis::Y,
            (_, 0) => PhysicalAxis::X,
            (_, 1) => PhysicalAxis::Y,
            (_, _) => PhysicalAxis::Z,
        }
    }

    /// Inverse of [`Dimensionality::physical_axis`], `None` when the grid
    /// has no axis along `axis`.
    pub fn grid_axis(self, axis: PhysicalAxis) -> Option<usize> {
        (0..self.ndim()).find(|&a| self.physical_axis(a) == axis)
    }
}

/// Which finite-difference formulas the differential operators use.
///
/// `Legacy` (the default) keeps the compatibility formulas bit for bit:
/// unit spacing for the 2D gradient, a divergence that sums all nine
/// partials, a 2D curl that differentiates along axis 0 with the z spacing,
/// and 3D sampling that reads z from the y mesh. `Standard` is textbook
/// vector calculus on the same axis mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    #[default]
    Legacy,
    Standard,
}

/// Where a grid sits in physical space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Physical coordinate of grid index 0 along x, y, z.
    pub origin: [f64; 3],
    /// Physical distance of one index step along x, y, z.
    pub dist: [f64; 3],
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            origin: [0.0; 3],
            dist: [1.0; 3],
        }
    }
}

impl Geometry {
    pub fn new(origin: [f64; 3], dist: [f64; 3]) -> Self {
        Geometry { origin, dist }
    }

    /// Builds a geometry from user slices. A 2-element origin gets z = 0 and
    /// a 2-element dist gets a unit z spacing.
    pub fn from_slices(origin: &[f64], dist: &[f64]) -> Result<Self> {
        Ok(Geometry {
            origin: pad(origin, 0.0, "origin")?,
            dist: pad(dist, 1.0, "dist")?,
        })
    }

    /// Geometry carried by a field derived from one with this geometry.
    ///
    /// Legacy results are placed at the default geometry, so chained
    /// operators differentiate them with unit spacing. Standard results keep
    /// this geometry.
    pub fn derived(self, convention: Convention) -> Geometry {
        match convention {
            Convention::Legacy => Geometry::default(),
            Convention::Standard => self,
        }
    }

    pub fn spacing(&self, axis: PhysicalAxis) -> f64 {
        self.dist[axis.index()]
    }

    /// Physical coordinate of a (possibly fractional) grid position.
    pub fn coordinate(&self, axis: PhysicalAxis, index: f64) -> f64 {
        index * self.dist[axis.index()] + self.origin[axis.index()]
    }

    /// Total extent of `samples` points along `axis`.
    pub fn extent(&self, axis: PhysicalAxis, samples: usize) -> f64 {
        samples.saturating_sub(1) as f64 * self.spacing(axis)
    }

    /// Physical (x, y, z) position of every cell, in row-major cell order.
    ///
    /// Along a physical axis with a `range`, the grid index is replaced by
    /// evenly spaced samples over that range before scaling by `dist` and
    /// shifting by `origin`. Axes the grid does not have stay at 0.
    pub fn positions(
        &self,
        dimensionality: Dimensionality,
        shape: &[usize],
        ranges: [Option<(f64, f64)>; 3],
    ) -> Vec<[f64; 3]> {
        let samples: Vec<Vec<f64>> = shape
            .iter()
            .enumerate()
            .map(|(grid_axis, &n)| {
                let axis = dimensionality.physical_axis(grid_axis);
                match ranges[axis.index()] {
                    Some((start, stop)) => linspace(start, stop, n),
                    None => (0..n).map(|i| i as f64).collect(),
                }
            })
            .collect();

        ndarray::indices(shape)
            .into_iter()
            .map(|cell| {
                let mut position = [0.0; 3];
                for (grid_axis, axis_samples) in samples.iter().enumerate() {
                    let axis = dimensionality.physical_axis(grid_axis);
                    position[axis.index()] =
                        self.coordinate(axis, axis_samples[cell[grid_axis]]);
                }
                position
            })
            .collect()
    }
}

fn pad(values: &[f64], fill: f64, what: &str) -> Result<[f64; 3]> {
    match *values {
        [a, b] => Ok([a, b, fill]),
        [a, b, c] => Ok([a, b, c]),
        _ => Err(FieldError::InvalidGeometry(format!(
            "{what} needs 2 or 3 values, got {}",
            values.len()
        ))),
    }
}

/// `n` evenly spaced samples from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    ndarray::Array1::linspace(start, stop, n).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_element_origin_is_padded_with_zero() {
        let geometry = Geometry::from_slices(&[1.0, 2.0], &[0.5, 0.5, 0.5]).unwrap();
        assert_eq!(geometry.origin, [1.0, 2.0, 0.0]);
        assert!(Geometry::from_slices(&[1.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn three_d_grids_are_z_major() {
        let dim = Dimensionality::ThreeD;
        assert_eq!(dim.physical_axis(0), PhysicalAxis::Z);
        assert_eq!(dim.physical_axis(1), PhysicalAxis::X);
        assert_eq!(dim.physical_axis(2), PhysicalAxis::Y);
        assert_eq!(dim.grid_axis(PhysicalAxis::Y), Some(2));
        assert_eq!(Dimensionality::TwoD.grid_axis(PhysicalAxis::Z), None);
    }

    #[test]
    fn legacy_results_reset_to_the_default_geometry() {
        let geometry = Geometry::new([1.0, 2.0, 3.0], [0.5, 0.5, 2.0]);
        assert_eq!(geometry.derived(Convention::Legacy), Geometry::default());
        assert_eq!(geometry.derived(Convention::Standard), geometry);
    }

    #[test]
    fn coordinate_scales_then_shifts() {
        let geometry = Geometry::new([1.0, -1.0, 0.0], [0.5, 2.0, 1.0]);
        assert_relative_eq!(geometry.coordinate(PhysicalAxis::X, 4.0), 3.0);
        assert_relative_eq!(geometry.coordinate(PhysicalAxis::Y, 1.0), 1.0);
        assert_relative_eq!(geometry.extent(PhysicalAxis::Y, 5), 8.0);
    }

    #[test]
    fn positions_cover_every_cell_in_row_major_order() {
        let geometry = Geometry::new([10.0, 0.0, 0.0], [1.0, 2.0, 1.0]);
        let positions = geometry.positions(Dimensionality::TwoD, &[2, 3], [None; 3]);
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], [10.0, 0.0, 0.0]);
        assert_eq!(positions[5], [11.0, 4.0, 0.0]);

        let ranged =
            geometry.positions(Dimensionality::TwoD, &[2, 3], [None, Some((0.0, 1.0)), None]);
        assert_eq!(ranged[1], [10.0, 1.0, 0.0]);
    }
}
