use crate::error::{FieldError, Result};
use crate::grid::{Convention, Dimensionality, Geometry, PhysicalAxis};
use crate::mesh::Mesh;
use crate::scalar_field::ScalarField;
use crate::stencil::gradient_along;
use crate::vector::{Operand, Vector};
use ndarray::{Array, ArrayD, ArrayViewD, Dimension, Zip};
use std::fmt;

/// A 1D, 2D or 3D grid of vectors placed in physical space.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    field: ArrayD<Vector>,
    dimensionality: Dimensionality,
    geometry: Geometry,
}

/// Right-hand side of a per-cell vector-field operation.
#[derive(Debug, Clone)]
pub enum VectorOperand<'a> {
    /// Another field; shapes must match exactly.
    Field(&'a VectorField),
    /// One vector applied to every cell.
    Vector(Vector),
    /// A scalar `s`, acting as `(s, s, s)` per cell.
    Scalar(f64),
    /// A raw grid of scalars, broadcast to the field's shape. Each cell's
    /// value acts like [`VectorOperand::Scalar`].
    Grid(ArrayViewD<'a, f64>),
}

impl<'a> From<&'a VectorField> for VectorOperand<'a> {
    fn from(field: &'a VectorField) -> Self {
        VectorOperand::Field(field)
    }
}

impl From<Vector> for VectorOperand<'_> {
    fn from(v: Vector) -> Self {
        VectorOperand::Vector(v)
    }
}

impl From<f64> for VectorOperand<'_> {
    fn from(s: f64) -> Self {
        VectorOperand::Scalar(s)
    }
}

impl<'a, D: Dimension> From<&'a Array<f64, D>> for VectorOperand<'a> {
    fn from(grid: &'a Array<f64, D>) -> Self {
        VectorOperand::Grid(grid.view().into_dyn())
    }
}

impl VectorField {
    /// Wraps a 1D, 2D or 3D grid of vectors with the default geometry.
    pub fn new<D: Dimension>(grid: Array<Vector, D>) -> Result<Self> {
        Self::with_geometry(grid, Geometry::default())
    }

    pub fn with_geometry<D: Dimension>(grid: Array<Vector, D>, geometry: Geometry) -> Result<Self> {
        let field = grid.into_dyn();
        let dimensionality =
            Dimensionality::of(field.ndim()).ok_or(FieldError::UnsupportedDimension {
                operation: "a vector field",
                ndim: field.ndim(),
            })?;
        Ok(VectorField {
            field,
            dimensionality,
            geometry,
        })
    }

    /// Assembles a field from per-axis component grids of identical shape.
    pub fn from_components(
        x: &ArrayD<f64>,
        y: &ArrayD<f64>,
        z: &ArrayD<f64>,
        geometry: Geometry,
    ) -> Result<Self> {
        for other in [y, z] {
            if x.shape() != other.shape() {
                return Err(FieldError::dimension_mismatch(x.shape(), other.shape()));
            }
        }
        let grid = Zip::from(x)
            .and(y)
            .and(z)
            .map_collect(|&x, &y, &z| Vector::new(x, y, z));
        Self::with_geometry(grid, geometry)
    }

    /// Samples `fun` over `mesh` with the legacy sampling rule.
    pub fn load_field<F>(origin: &[f64], fun: F, mesh: &Mesh, dist: &[f64]) -> Result<Self>
    where
        F: FnMut(&[f64]) -> Vector,
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
        F: FnMut(&[f64]) -> Vector,
    {
        let geometry = Geometry::from_slices(origin, dist)?;
        Self::with_geometry(mesh.sample(convention, fun), geometry)
    }

    pub fn field(&self) -> &ArrayD<Vector> {
        &self.field
    }

    pub fn into_field(self) -> ArrayD<Vector> {
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

    /// The x, y and z component grids.
    pub fn components(&self) -> [ArrayD<f64>; 3] {
        [
            self.field.mapv(|v| v.x),
            self.field.mapv(|v| v.y),
            self.field.mapv(|v| v.z),
        ]
    }

    fn zip_cells<'a, R>(
        &self,
        rhs: impl Into<VectorOperand<'a>>,
        op: impl Fn(Vector, Operand) -> R,
    ) -> Result<ArrayD<R>> {
        Ok(match rhs.into() {
            VectorOperand::Field(other) => {
                if self.shape() != other.shape() {
                    return Err(FieldError::dimension_mismatch(self.shape(), other.shape()));
                }
                Zip::from(&self.field)
                    .and(&other.field)
                    .map_collect(|&a, &b| op(a, Operand::Vector(b)))
            }
            VectorOperand::Vector(v) => self.field.map(|&a| op(a, Operand::Vector(v))),
            VectorOperand::Scalar(s) => self.field.map(|&a| op(a, Operand::Scalar(s))),
            VectorOperand::Grid(grid) => {
                let operand_shape = grid.shape().to_vec();
                let rhs = grid
                    .broadcast(self.field.raw_dim())
                    .ok_or_else(|| FieldError::Broadcast {
                        field: self.shape().to_vec(),
                        operand: operand_shape,
                    })?;
                Zip::from(&self.field)
                    .and(rhs)
                    .map_collect(|&a, &s| op(a, Operand::Scalar(s)))
            }
        })
    }

    fn derive(&self, grid: ArrayD<Vector>, geometry: Geometry) -> VectorField {
        VectorField {
            field: grid,
            dimensionality: self.dimensionality,
            geometry,
        }
    }

    // Arithmetic results sit at the default geometry
    fn per_cell<'a>(
        &self,
        rhs: impl Into<VectorOperand<'a>>,
        op: impl Fn(Vector, Operand) -> Vector,
    ) -> Result<VectorField> {
        Ok(self.derive(self.zip_cells(rhs, op)?, Geometry::default()))
    }

    pub fn add<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.add(b))
    }

    pub fn subtract<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.subtract(b))
    }

    pub fn divide<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.divide(b))
    }

    pub fn floor_divide<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.floor_divide(b))
    }

    /// Scales every vector by a scalar or a per-cell grid. Vector operands
    /// multiply component-wise; [`VectorField::dot`] is the inner product.
    pub fn multiply<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.multiply(b))
    }

    /// Raises every component to the operand's matching component.
    pub fn power<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.power(b))
    }

    /// Per-cell dot product. The result is a bare grid of scalars.
    pub fn dot<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<ArrayD<f64>> {
        self.zip_cells(rhs, |a, b| a.dot(b.as_vector()))
    }

    /// Per-cell cross product.
    pub fn cross<'a>(&self, rhs: impl Into<VectorOperand<'a>>) -> Result<VectorField> {
        self.per_cell(rhs, |a, b| a.cross(b.as_vector()))
    }

    /// Euclidean norm of every cell as a bare grid.
    pub fn magnitude_grid(&self) -> ArrayD<f64> {
        self.field.mapv(Vector::mag)
    }

    /// Euclidean norm of every cell. Fails for 1D fields, which have no
    /// scalar-field counterpart.
    pub fn magnitude(&self) -> Result<ScalarField> {
        ScalarField::with_geometry(self.magnitude_grid(), self.geometry)
    }

    fn partial(&self, component: &ArrayD<f64>, grid_axis: usize, axis: PhysicalAxis) -> Result<ArrayD<f64>> {
        gradient_along(component, grid_axis, self.geometry.spacing(axis))
    }

    /// Divergence with the legacy formula.
    pub fn divergence(&self) -> Result<ArrayD<f64>> {
        self.divergence_with(Convention::Legacy)
    }

    /// Divergence as a bare grid of the field's shape.
    ///
    /// The legacy formula is only defined on 3D fields: every component is
    /// differentiated along axis 0 (`dist[2]`), axis 1 (`dist[0]`) and axis 2
    /// (`dist[1]`) and all nine partials are summed. The standard formula
    /// sums the diagonal terms for any rank.
    pub fn divergence_with(&self, convention: Convention) -> Result<ArrayD<f64>> {
        let [x, y, z] = self.components();
        match convention {
            Convention::Legacy => {
                if self.dimensionality != Dimensionality::ThreeD {
                    return Err(FieldError::UnsupportedDimension {
                        operation: "divergence",
                        ndim: self.dimensionality.ndim(),
                    });
                }
                let across = |grid_axis: usize, axis: PhysicalAxis| -> Result<ArrayD<f64>> {
                    Ok(self.partial(&x, grid_axis, axis)?
                        + self.partial(&z, grid_axis, axis)?
                        + self.partial(&y, grid_axis, axis)?)
                };
                let dz = across(0, PhysicalAxis::Z)?;
                let dx = across(1, PhysicalAxis::X)?;
                let dy = across(2, PhysicalAxis::Y)?;
                Ok(dx + dy + dz)
            }
            Convention::Standard => {
                let mut divergence = ArrayD::<f64>::zeros(self.field.raw_dim());
                for (component, axis) in [(&x, PhysicalAxis::X), (&y, PhysicalAxis::Y), (&z, PhysicalAxis::Z)] {
                    if let Some(grid_axis) = self.dimensionality.grid_axis(axis) {
                        divergence += &self.partial(component, grid_axis, axis)?;
                    }
                }
                Ok(divergence)
            }
        }
    }

    /// Curl with the legacy formulas.
    pub fn curl(&self) -> Result<VectorField> {
        self.curl_with(Convention::Legacy)
    }

    /// Curl of the field, same shape.
    ///
    /// 2D fields get `(0, 0, curl_z)` per cell. The legacy 2D formula
    /// differentiates y along axis 0 with `dist[2]` and x along axis 1 with
    /// `dist[0]`; the standard one uses `dist[0]` and `dist[1]`.
    /// See [`Geometry::derived`] for the geometry of the result.
    pub fn curl_with(&self, convention: Convention) -> Result<VectorField> {
        let [x, y, z] = self.components();
        let geometry = self.geometry.derived(convention);
        match self.dimensionality {
            Dimensionality::TwoD => {
                let (y_x, x_y) = match convention {
                    Convention::Legacy => (
                        self.partial(&y, 0, PhysicalAxis::Z)?,
                        self.partial(&x, 1, PhysicalAxis::X)?,
                    ),
                    Convention::Standard => (
                        self.partial(&y, 0, PhysicalAxis::X)?,
                        self.partial(&x, 1, PhysicalAxis::Y)?,
                    ),
                };
                let curl_z = y_x - x_y;
                Ok(self.derive(curl_z.mapv(|c| Vector::new(0.0, 0.0, c)), geometry))
            }
            Dimensionality::ThreeD => {
                let x_y = self.partial(&x, 2, PhysicalAxis::Y)?;
                let x_z = self.partial(&x, 0, PhysicalAxis::Z)?;
                let y_x = self.partial(&y, 1, PhysicalAxis::X)?;
                let y_z = self.partial(&y, 0, PhysicalAxis::Z)?;
                let z_x = self.partial(&z, 1, PhysicalAxis::X)?;
                let z_y = self.partial(&z, 2, PhysicalAxis::Y)?;

                let curl_x = z_y - y_z;
                let curl_y = x_z - z_x;
                let curl_z = y_x - x_y;
                Self::from_components(&curl_x, &curl_y, &curl_z, geometry)
            }
            Dimensionality::OneD => Err(FieldError::UnsupportedDimension {
                operation: "curl",
                ndim: 1,
            }),
        }
    }
}

impl fmt::Display for VectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector Field {:?}", self.shape())
    }
}
