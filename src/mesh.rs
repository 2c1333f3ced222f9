use crate::error::{FieldError, Result};
use crate::grid::Convention;
use ndarray::{ArrayD, IxDyn, Zip};
use serde::{Deserialize, Serialize};

/// Axis ordering of generated coordinate meshes.
///
/// `Xy` is the cartesian convention: for 2D meshes the first output axis
/// runs along y and the second along x. `Ij` keeps the inputs in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indexing {
    #[default]
    Xy,
    Ij,
}

/// Coordinate meshes of matching shape, one per physical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    x: ArrayD<f64>,
    y: ArrayD<f64>,
    z: Option<ArrayD<f64>>,
}

impl Mesh {
    /// Wraps pre-built meshes. Without `z` the meshes must be 2D, with `z`
    /// they must be 3D, and all must share one shape.
    pub fn new(x: ArrayD<f64>, y: ArrayD<f64>, z: Option<ArrayD<f64>>) -> Result<Self> {
        let mut shapes = vec![x.shape().to_vec(), y.shape().to_vec()];
        if let Some(z) = &z {
            shapes.push(z.shape().to_vec());
        }
        if shapes.iter().any(|s| s != &shapes[0]) {
            return Err(FieldError::MeshMismatch {
                reason: "meshes differ in shape",
                shapes,
            });
        }
        let expected = if z.is_some() { 3 } else { 2 };
        if x.ndim() != expected {
            return Err(FieldError::MeshMismatch {
                reason: "mesh rank must be 2 without z and 3 with z",
                shapes,
            });
        }
        Ok(Mesh { x, y, z })
    }

    /// 2D meshes from axis samples.
    pub fn from_axes2(xs: &[f64], ys: &[f64], indexing: Indexing) -> Self {
        let (nx, ny) = (xs.len(), ys.len());
        let (x, y) = match indexing {
            Indexing::Xy => (
                ArrayD::from_shape_fn(IxDyn(&[ny, nx]), |i| xs[i[1]]),
                ArrayD::from_shape_fn(IxDyn(&[ny, nx]), |i| ys[i[0]]),
            ),
            Indexing::Ij => (
                ArrayD::from_shape_fn(IxDyn(&[nx, ny]), |i| xs[i[0]]),
                ArrayD::from_shape_fn(IxDyn(&[nx, ny]), |i| ys[i[1]]),
            ),
        };
        Mesh { x, y, z: None }
    }

    /// 3D meshes from axis samples.
    pub fn from_axes3(xs: &[f64], ys: &[f64], zs: &[f64], indexing: Indexing) -> Self {
        let (nx, ny, nz) = (xs.len(), ys.len(), zs.len());
        let (shape, ix, iy) = match indexing {
            Indexing::Xy => ([ny, nx, nz], 1, 0),
            Indexing::Ij => ([nx, ny, nz], 0, 1),
        };
        Mesh {
            x: ArrayD::from_shape_fn(IxDyn(&shape), |i| xs[i[ix]]),
            y: ArrayD::from_shape_fn(IxDyn(&shape), |i| ys[i[iy]]),
            z: Some(ArrayD::from_shape_fn(IxDyn(&shape), |i| zs[i[2]])),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.x.shape()
    }

    pub fn ndim(&self) -> usize {
        self.x.ndim()
    }

    pub fn x(&self) -> &ArrayD<f64> {
        &self.x
    }

    pub fn y(&self) -> &ArrayD<f64> {
        &self.y
    }

    pub fn z(&self) -> Option<&ArrayD<f64>> {
        self.z.as_ref()
    }

    /// Calls `fun` with the coordinates of every cell and collects the
    /// results into a grid of the mesh's shape.
    ///
    /// 2D meshes pass `[x, y]`, 3D meshes pass `[x, y, z]`. Under
    /// [`Convention::Legacy`] the third coordinate is read from the y mesh.
    pub fn sample<T, F>(&self, convention: Convention, mut fun: F) -> ArrayD<T>
    where
        F: FnMut(&[f64]) -> T,
    {
        match &self.z {
            None => Zip::from(&self.x)
                .and(&self.y)
                .map_collect(|&x, &y| fun(&[x, y])),
            Some(z) => {
                let z = match convention {
                    Convention::Legacy => &self.y,
                    Convention::Standard => z,
                };
                Zip::from(&self.x)
                    .and(&self.y)
                    .and(z)
                    .map_collect(|&x, &y, &z| fun(&[x, y, z]))
            }
        }
    }
}
