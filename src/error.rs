use thiserror::Error;

/// All errors returned by the field types and their operators.
///
/// Floating-point trouble (division by zero, NaN from a negative base raised
/// to a fractional power) is never reported here; it shows up in the values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Two fields combined by an elementwise operator have different shapes.
    #[error("Dimensions of the arguments are different {left:?}, {right:?}")]
    DimensionMismatch { left: Vec<usize>, right: Vec<usize> },

    /// A raw grid operand cannot be broadcast to the field's shape.
    #[error("cannot broadcast operand of shape {operand:?} to field shape {field:?}")]
    Broadcast { field: Vec<usize>, operand: Vec<usize> },

    /// The operation has no definition for a grid of this rank.
    #[error("{operation} is not defined for a {ndim}-dimensional grid")]
    UnsupportedDimension {
        operation: &'static str,
        ndim: usize,
    },

    /// Finite differences need at least two samples along the axis.
    #[error("axis {axis} has {len} sample(s), at least 2 are needed to differentiate")]
    TooFewSamples { axis: usize, len: usize },

    /// Coordinate meshes disagree in shape or have the wrong rank.
    #[error("coordinate meshes do not line up: {reason} (shapes {shapes:?})")]
    MeshMismatch {
        reason: &'static str,
        shapes: Vec<Vec<usize>>,
    },

    /// Origin or spacing of the wrong length.
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),
}

impl FieldError {
    pub fn dimension_mismatch(left: &[usize], right: &[usize]) -> Self {
        Self::DimensionMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_names_both_shapes() {
        let err = FieldError::dimension_mismatch(&[3, 3], &[2, 4]);
        assert_eq!(
            err.to_string(),
            "Dimensions of the arguments are different [3, 3], [2, 4]"
        );
    }
}
