use crate::error::{FieldError, Result};
use crate::grid::{Convention, Dimensionality, Geometry, PhysicalAxis};
use crate::mesh::Mesh;
use crate::stencil::gradient_along;
use crate::vector::Vector;
use crate::vector_field::VectorField;
use ndarray::{Array, ArrayD, ArrayViewD, Dimension, Zip};
use std::fmt;

/// A 2D or 3D grid of scalar samples placed in physical space.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    field: ArrayD<f64>,
    dimensionality: Dimensionality,
    geometry: Geometry,
}

/// Right-hand side of an elementwise scalar-field operation.
#[derive(Debug, Clone)]
pub enum ScalarOperand<'a> {
    /// Another field; shapes must match exactly.
    Field(&'a ScalarField),
    /// A constant applied to every cell.
    Scalar(f64),
    /// A raw grid, broadcast to the field's shape.
    Grid(ArrayViewD<'a, f64>),
}

impl<'a> From<&'a ScalarField> for ScalarOperand<'a> {
    fn from(field: &'a ScalarField) -> Self {
        ScalarOperand::Field(field)
    }
}

impl From<f64> for ScalarOperand<'_> {
    fn from(value: f64) -> Self {
        ScalarOperand::Scalar(value)
    }
}

impl<'a, D: Dimension> From<&'a Array<f64, D>> for ScalarOperand<'a> {
    fn from(grid: &'a Array<f64, D>) -> Self {
        ScalarOperand::Grid(grid.view().into_dyn())
    }
}

impl ScalarField {
    /// Wraps a 2D or 3D grid with the default geometry.
    pub fn new<D: Dimension>(grid: Array<f64, D>) -> Result<Self> {
        Self::with_geometry(grid, Geometry::default())
    }

    pub fn with_geometry<D: Dimension>(grid: Array<f64, D>, geometry: Geometry) -> Result<Self> {
        let field = grid.into_dyn();
        let dimensionality = match Dimensionality::of(field.ndim()) {
            Some(d @ (Dimensionality::TwoD | Dimensionality::ThreeD)) => d,
            _ => {
                return Err(FieldError::UnsupportedDimension {
                    operation: "a scalar field",
                    ndim: field.ndim(),
                })
            }
        };
        Ok(ScalarField {
            field,
            dimensionality,
            geometry,
        })
    }

    /// Samples `fun` over `mesh` with the legacy sampling rule.
    ///
    /// `origin` may have two entries, in which case z is 0.
    pub fn load_field<F>(origin: &[f64], fun: F, mesh: &Mesh, dist: &[f64]) -> Result<Self>
    where
        F: FnMut(&[f64]) -> f64,
    {
        Self::load_field_with(origin, fun, mesh, dist, Convention::Legacy)
    }

    pub fn load_field_with<F>(
        origin: &[f64],
        fun: F,
        mesh: &Mesh,
        dist: &[f64],
        convention: Convention,
    ) -> Result<Self>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let geometry = Geometry::from_slices(origin, dist)?;
        Self::with_geometry(mesh.sample(convention, fun), geometry)
    }

    pub fn field(&self) -> &ArrayD<f64> {
        &self.field
    }

    pub fn into_field(self) -> ArrayD<f64> {
        self.field
    }

    pub fn shape(&self) -> &[usize] {
        self.field.shape()
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn origin(&self) -> [f64; 3] {
        self.geometry.origin
    }

    pub fn dist(&self) -> [f64; 3] {
        self.geometry.dist
    }

    // Results sit at the default geometry, like every legacy derived field
    fn combine<'a>(
        &self,
        rhs: impl Into<ScalarOperand<'a>>,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<ScalarField> {
        let field = match rhs.into() {
            ScalarOperand::Field(other) => {
                if self.shape() != other.shape() {
                    return Err(FieldError::dimension_mismatch(self.shape(), other.shape()));
                }
                Zip::from(&self.field)
                    .and(&other.field)
                    .map_collect(|&a, &b| op(a, b))
            }
            ScalarOperand::Scalar(value) => self.field.mapv(|a| op(a, value)),
            ScalarOperand::Grid(grid) => {
                let operand_shape = grid.shape().to_vec();
                let rhs = grid
                    .broadcast(self.field.raw_dim())
                    .ok_or_else(|| FieldError::Broadcast {
                        field: self.shape().to_vec(),
                        operand: operand_shape,
                    })?;
                Zip::from(&self.field)
                    .and(rhs)
                    .map_collect(|&a, &b| op(a, b))
            }
        };
        Ok(ScalarField {
            field,
            dimensionality: self.dimensionality,
            geometry: Geometry::default(),
        })
    }

    pub fn add<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, |a, b| a + b)
    }

    pub fn subtract<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, |a, b| a - b)
    }

    pub fn multiply<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, |a, b| a * b)
    }

    pub fn power<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, f64::powf)
    }

    pub fn divide<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, |a, b| a / b)
    }

    pub fn floor_divide<'a>(&self, rhs: impl Into<ScalarOperand<'a>>) -> Result<ScalarField> {
        self.combine(rhs, |a, b| (a / b).floor())
    }

    /// Discrete gradient with the legacy formulas.
    pub fn gradient(&self) -> Result<VectorField> {
        self.gradient_with(Convention::Legacy)
    }

    /// Discrete gradient, one vector per cell.
    ///
    /// 2D: partials along axis 0 and axis 1 become x and y, z is 0. The
    /// legacy convention differentiates with unit spacing.
    /// 3D: axis 0 is z (spacing `dist[2]`), axis 1 is x (`dist[0]`), axis 2
    /// is y (`dist[1]`).
    ///
    /// See [`Geometry::derived`] for the geometry of the result.
    pub fn gradient_with(&self, convention: Convention) -> Result<VectorField> {
        let grid = match self.dimensionality {
            Dimensionality::TwoD => {
                let (hx, hy) = match convention {
                    Convention::Legacy => (1.0, 1.0),
                    Convention::Standard => (
                        self.geometry.spacing(PhysicalAxis::X),
                        self.geometry.spacing(PhysicalAxis::Y),
                    ),
                };
                let x = gradient_along(&self.field, 0, hx)?;
                let y = gradient_along(&self.field, 1, hy)?;
                Zip::from(&x)
                    .and(&y)
                    .map_collect(|&x, &y| Vector::planar(x, y))
            }
            Dimensionality::ThreeD => {
                let z = gradient_along(&self.field, 0, self.geometry.spacing(PhysicalAxis::Z))?;
                let x = gradient_along(&self.field, 1, self.geometry.spacing(PhysicalAxis::X))?;
                let y = gradient_along(&self.field, 2, self.geometry.spacing(PhysicalAxis::Y))?;
                Zip::from(&x)
                    .and(&y)
                    .and(&z)
                    .map_collect(|&x, &y, &z| Vector::new(x, y, z))
            }
            Dimensionality::OneD => {
                return Err(FieldError::UnsupportedDimension {
                    operation: "gradient",
                    ndim: 1,
                })
            }
        };
        VectorField::with_geometry(grid, self.geometry.derived(convention))
    }

    /// Min, max and mean over all cells.
    pub fn summary(&self) -> FieldSummary {
        FieldSummary::of(&self.field)
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalarField {:?}", self.shape())
    }
}

/// Value statistics used for reporting and colour scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub max_abs: f64,
}

impl FieldSummary {
    pub fn of(grid: &ArrayD<f64>) -> Self {
        let min = grid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = grid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let max_abs = grid.iter().map(|&v| v.abs()).fold(0.0_f64, f64::max);
        let mean = grid.mean().unwrap_or(f64::NAN);
        FieldSummary {
            min,
            max,
            mean,
            max_abs,
        }
    }
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={:.4e} max={:.4e} mean={:.4e} |max|={:.4e}",
            self.min, self.max, self.mean, self.max_abs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Indexing;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2, Array3};

    fn ramp() -> ScalarField {
        ScalarField::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn field_ops_match_grid_arithmetic() {
        let a = ramp();
        let b = ScalarField::new(array![[2.0, 2.0, 2.0], [0.5, 3.0, -1.0]]).unwrap();
        let (ga, gb) = (a.field(), b.field());
        assert_eq!(a.add(&b).unwrap().field(), &(ga + gb));
        assert_eq!(a.subtract(&b).unwrap().field(), &(ga - gb));
        assert_eq!(a.multiply(&b).unwrap().field(), &(ga * gb));
        assert_eq!(a.divide(&b).unwrap().field(), &(ga / gb));
        assert_eq!(
            a.floor_divide(&b).unwrap().field(),
            &(ga / gb).mapv(f64::floor)
        );
        assert_eq!(
            a.power(&b).unwrap().field(),
            &Zip::from(ga).and(gb).map_collect(|&x, &y| x.powf(y))
        );
    }

    #[test]
    fn mismatched_fields_report_both_shapes() {
        let a = ramp();
        let b = ScalarField::new(Array2::<f64>::zeros((3, 2))).unwrap();
        assert_eq!(
            a.add(&b),
            Err(FieldError::DimensionMismatch {
                left: vec![2, 3],
                right: vec![3, 2],
            })
        );
    }

    #[test]
    fn scalars_and_raw_grids_broadcast() {
        let a = ramp();
        assert_eq!(a.add(1.0).unwrap().field()[[1, 2]], 7.0);
        let row = array![10.0, 20.0, 30.0];
        assert_eq!(a.multiply(&row).unwrap().field()[[1, 0]], 40.0);
        let column = array![1.0, 2.0];
        assert!(matches!(
            a.add(&column),
            Err(FieldError::Broadcast { .. })
        ));
    }

    #[test]
    fn arithmetic_results_use_the_default_geometry() {
        let geometry = Geometry::new([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
        let a = ScalarField::with_geometry(array![[1.0, 2.0], [3.0, 4.0]], geometry).unwrap();
        let b = a.subtract(1.0).unwrap();
        assert_eq!(b.geometry(), &Geometry::default());
        assert_eq!(b.field(), &array![[0.0, 1.0], [2.0, 3.0]].into_dyn());
    }

    #[test]
    fn chained_legacy_operators_differentiate_with_unit_spacing() {
        // Value = axis0^2 on a grid spaced 2 apart; axis 0 is physical z
        let geometry = Geometry::new([0.0; 3], [2.0, 2.0, 2.0]);
        let grid = Array3::from_shape_fn((3, 3, 3), |(i, _, _)| (i * i) as f64);
        let field = ScalarField::with_geometry(grid, geometry).unwrap();

        let gradient = field.gradient().unwrap();
        assert_eq!(gradient.geometry(), &Geometry::default());
        // dz = [0.5, 1.0, 1.5] along axis 0 with dist[2] = 2
        assert_abs_diff_eq!(gradient.field()[[1, 1, 1]].z, 1.0, epsilon = 1e-12);

        // Second derivative taken with unit spacing: (1.5 - 0.5) / 2
        let divergence = gradient.divergence().unwrap();
        assert_abs_diff_eq!(divergence[[1, 1, 1]], 0.5, epsilon = 1e-12);

        let standard = field
            .gradient_with(Convention::Standard)
            .unwrap()
            .divergence_with(Convention::Standard)
            .unwrap();
        assert_abs_diff_eq!(standard[[1, 1, 1]], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn division_by_zero_is_not_intercepted() {
        let a = ramp().divide(0.0).unwrap();
        assert!(a.field().iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn one_dimensional_grids_are_rejected() {
        assert_eq!(
            ScalarField::new(array![1.0, 2.0]),
            Err(FieldError::UnsupportedDimension {
                operation: "a scalar field",
                ndim: 1
            })
        );
    }

    #[test]
    fn constant_field_has_zero_gradient() {
        let field = ScalarField::new(Array2::from_elem((4, 5), 3.5)).unwrap();
        let gradient = field.gradient().unwrap();
        assert!(gradient.field().iter().all(|v| *v == Vector::ZERO));
    }

    #[test]
    fn legacy_2d_gradient_ignores_spacing() {
        let geometry = Geometry::new([0.0; 3], [0.5, 0.25, 1.0]);
        let grid = Array2::from_shape_fn((3, 3), |(i, j)| i as f64 + 2.0 * j as f64);
        let field = ScalarField::with_geometry(grid, geometry).unwrap();

        let legacy = field.gradient().unwrap();
        assert_eq!(legacy.field()[[1, 1]], Vector::planar(1.0, 2.0));

        let standard = field.gradient_with(Convention::Standard).unwrap();
        assert_eq!(standard.field()[[1, 1]], Vector::planar(2.0, 8.0));
        assert_eq!(standard.geometry(), &geometry);
    }

    #[test]
    fn three_d_gradient_follows_the_z_major_axis_mapping() {
        let geometry = Geometry::new([0.0; 3], [2.0, 4.0, 0.5]);
        // Value = 1 * axis0 + 10 * axis1 + 100 * axis2
        let grid = Array3::from_shape_fn((3, 3, 3), |(i, j, k)| {
            i as f64 + 10.0 * j as f64 + 100.0 * k as f64
        });
        let field = ScalarField::with_geometry(grid, geometry).unwrap();
        let v = field.gradient().unwrap().field()[[1, 1, 1]];
        assert_abs_diff_eq!(v.x, 10.0 / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 100.0 / 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.z, 1.0 / 0.5, epsilon = 1e-12);
    }

    #[test]
    fn load_field_samples_the_mesh() {
        let mesh = Mesh::from_axes2(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], Indexing::Xy);
        let field = ScalarField::load_field(&[0.0, 0.0], |p| p[0] + p[1], &mesh, &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(field.field(), &(mesh.x() + mesh.y()));
        assert_eq!(field.origin(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn summary_reports_range_and_mean() {
        let summary = ramp().subtract(4.0).unwrap().summary();
        assert_eq!(summary.min, -3.0);
        assert_eq!(summary.max, 2.0);
        assert_eq!(summary.max_abs, 3.0);
        assert_abs_diff_eq!(summary.mean, -0.5);
        assert_eq!(ramp().to_string(), "ScalarField [2, 3]");
    }
}
