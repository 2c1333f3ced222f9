//! Second-order finite differences on regular grids.
//!
//! Interior points use centered differences, the two boundary points use
//! one-sided first-order differences. Works along any axis of an N-D grid.

use crate::error::{FieldError, Result};
use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Zip};

/// Partial derivative of `grid` along `axis` with sample spacing `spacing`.
///
/// The result has the grid's shape. Zero or non-finite spacing is not
/// rejected; it yields infinities or NaNs like any other float division.
pub fn gradient_along<S, D>(grid: &ArrayBase<S, D>, axis: usize, spacing: f64) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let ndim = grid.ndim();
    if axis >= ndim {
        return Err(FieldError::UnsupportedDimension {
            operation: "differentiation along an absent axis",
            ndim,
        });
    }
    let len = grid.len_of(Axis(axis));
    if len < 2 {
        return Err(FieldError::TooFewSamples { axis, len });
    }

    let mut derivative = Array::<f64, D>::zeros(grid.raw_dim());
    Zip::from(derivative.lanes_mut(Axis(axis)))
        .and(grid.lanes(Axis(axis)))
        .for_each(|mut d, f| {
            for i in 1..len - 1 {
                d[i] = (f[i + 1] - f[i - 1]) / (2.0 * spacing);
            }
            // Boundaries: use one-sided differences
            d[0] = (f[1] - f[0]) / spacing;
            d[len - 1] = (f[len - 1] - f[len - 2]) / spacing;
        });

    Ok(derivative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2, Array3};

    #[test]
    fn linear_profile_has_constant_slope() {
        let f = array![0.0, 2.0, 4.0, 6.0];
        let d = gradient_along(&f, 0, 0.5).unwrap();
        for &v in d.iter() {
            assert_relative_eq!(v, 4.0);
        }
    }

    #[test]
    fn quadratic_uses_centered_interior_and_one_sided_edges() {
        let f = array![1.0, 2.0, 4.0, 7.0, 11.0];
        let d = gradient_along(&f, 0, 1.0).unwrap();
        assert_eq!(d, array![1.0, 1.5, 2.5, 3.5, 4.0]);
    }

    #[test]
    fn differentiates_the_requested_axis_only() {
        let f = Array2::from_shape_fn((3, 4), |(i, j)| 3.0 * i as f64 + j as f64);
        let d0 = gradient_along(&f, 0, 1.0).unwrap();
        let d1 = gradient_along(&f, 1, 1.0).unwrap();
        assert!(d0.iter().all(|&v| (v - 3.0).abs() < 1e-12));
        assert!(d1.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn works_on_three_dimensional_dynamic_grids() {
        let f = Array3::from_shape_fn((2, 3, 4), |(_, _, k)| k as f64 * k as f64).into_dyn();
        let d = gradient_along(&f, 2, 2.0).unwrap();
        assert_eq!(d.shape(), &[2, 3, 4]);
        assert_relative_eq!(d[[1, 2, 0]], 0.5);
        assert_relative_eq!(d[[1, 2, 2]], 2.0);
    }

    #[test]
    fn single_sample_axis_is_rejected() {
        let f = Array2::<f64>::zeros((1, 5));
        assert_eq!(
            gradient_along(&f, 0, 1.0),
            Err(FieldError::TooFewSamples { axis: 0, len: 1 })
        );
        assert!(gradient_along(&f, 2, 1.0).is_err());
    }
}
