use crate::grid::{linspace, Convention};
use crate::mesh::{Indexing, Mesh};
use crate::samples::{ScalarSample, VectorSample};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Evenly spaced samples along one physical axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub start: f64,
    pub stop: f64,
    pub samples: usize,
}

impl AxisConfig {
    fn validate(&self, name: &str) -> Result<()> {
        if self.samples < 2 {
            return Err(anyhow!(
                "Axis {} needs at least 2 samples to differentiate, got {}",
                name,
                self.samples
            ));
        }
        if self.stop <= self.start || self.start.is_nan() || self.stop.is_nan() {
            return Err(anyhow!(
                "Axis {} must increase (start={}, stop={})",
                name,
                self.start,
                self.stop
            ));
        }
        Ok(())
    }

    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.samples)
    }

    /// Distance between neighbouring samples
    pub fn step(&self) -> f64 {
        (self.stop - self.start) / (self.samples - 1) as f64
    }
}

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub x: AxisConfig,
    pub y: AxisConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<AxisConfig>,
    #[serde(default)]
    pub indexing: Indexing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>, // Optional: axis starts if not provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<Vec<f64>>, // Optional: axis steps if not provided
    #[serde(default)]
    pub convention: Convention,
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        if let Some(z) = &self.z {
            z.validate("z")?;
        }
        if let Some(origin) = &self.origin {
            if !(2..=3).contains(&origin.len()) {
                return Err(anyhow!("origin needs 2 or 3 values, got {}", origin.len()));
            }
        }
        if let Some(dist) = &self.dist {
            if !(2..=3).contains(&dist.len()) {
                return Err(anyhow!("dist needs 2 or 3 values, got {}", dist.len()));
            }
            if dist.iter().any(|&d| d <= 0.0) {
                return Err(anyhow!("Grid spacing must be positive (dist={:?})", dist));
            }
        }
        Ok(())
    }

    pub fn ndim(&self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }

    pub fn mesh(&self) -> Mesh {
        match &self.z {
            Some(z) => Mesh::from_axes3(&self.x.values(), &self.y.values(), &z.values(), self.indexing),
            None => Mesh::from_axes2(&self.x.values(), &self.y.values(), self.indexing),
        }
    }

    pub fn origin(&self) -> Vec<f64> {
        self.origin.clone().unwrap_or_else(|| {
            vec![self.x.start, self.y.start, self.z.map_or(0.0, |z| z.start)]
        })
    }

    pub fn dist(&self) -> Vec<f64> {
        self.dist.clone().unwrap_or_else(|| {
            vec![self.x.step(), self.y.step(), self.z.map_or(1.0, |z| z.step())]
        })
    }
}

/// Which field to sample onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldConfig {
    Scalar { sample: ScalarSample },
    Vector { sample: VectorSample },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Gradient,
    Divergence,
    Curl,
    Magnitude,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Gradient => "gradient",
            Operation::Divergence => "divergence",
            Operation::Curl => "curl",
            Operation::Magnitude => "magnitude",
        }
    }
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_image_width() -> u32 {
    1200
}

fn default_image_height() -> u32 {
    1000
}

fn default_scale() -> f64 {
    0.2
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            enabled: default_enabled(),
            output_dir: default_output_dir(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            scale: default_scale(),
        }
    }
}

impl VisualizationConfig {
    fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(anyhow!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width,
                self.image_height
            ));
        }
        if self.scale <= 0.0 {
            return Err(anyhow!("Arrow scale must be positive, got {}", self.scale));
        }
        Ok(())
    }
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    pub field: FieldConfig,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        // Validate before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.visualization.validate()?;

        if self.operations.is_empty() {
            return Err(anyhow!("At least one operation must be requested"));
        }

        for &operation in &self.operations {
            match (operation, self.field) {
                (Operation::Gradient, FieldConfig::Scalar { .. }) => {}
                (Operation::Gradient, FieldConfig::Vector { .. }) => {
                    return Err(anyhow!("gradient needs a scalar field"));
                }
                (_, FieldConfig::Scalar { .. }) => {
                    return Err(anyhow!("{} needs a vector field", operation.name()));
                }
                (Operation::Divergence, _)
                    if self.grid.convention == Convention::Legacy && self.grid.ndim() != 3 =>
                {
                    return Err(anyhow!(
                        "legacy divergence needs a 3D grid; add a z axis or use convention = \"standard\""
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        let shape: Vec<usize> = self.grid.mesh().shape().to_vec();
        info!("=== Field Configuration ===");
        info!(
            "Grid: {:?} ({}D, {:?} indexing, {:?} convention)",
            shape,
            self.grid.ndim(),
            self.grid.indexing,
            self.grid.convention
        );
        info!("Origin: {:?}, dist: {:?}", self.grid.origin(), self.grid.dist());
        match self.field {
            FieldConfig::Scalar { sample } => info!("Field: scalar {:?}", sample),
            FieldConfig::Vector { sample } => info!("Field: vector {:?}", sample),
        }
        let names: Vec<&str> = self.operations.iter().map(|op| op.name()).collect();
        info!("Operations: {}", names.join(", "));
        if self.visualization.enabled {
            info!(
                "Visualization: {}x{} into '{}'",
                self.visualization.image_width,
                self.visualization.image_height,
                self.visualization.output_dir
            );
        }
        info!("===========================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATION: &str = r#"
        operations = ["curl", "divergence", "magnitude"]

        [grid]
        x = { start = -1.0, stop = 1.0, samples = 5 }
        y = { start = 0.0, stop = 2.0, samples = 3 }
        z = { start = 0.0, stop = 1.0, samples = 2 }

        [field]
        kind = "vector"
        sample = "rotation"
    "#;

    #[test]
    fn parses_and_fills_defaults() {
        let config = Config::parse(ROTATION).unwrap();
        assert_eq!(config.field, FieldConfig::Vector { sample: VectorSample::Rotation });
        assert_eq!(config.grid.indexing, Indexing::Xy);
        assert_eq!(config.grid.convention, Convention::Legacy);
        assert_eq!(config.grid.origin(), vec![-1.0, 0.0, 0.0]);
        assert_eq!(config.grid.dist(), vec![0.5, 1.0, 1.0]);
        assert_eq!(config.grid.mesh().shape(), &[3, 5, 2]);
        assert!(config.visualization.enabled);
        assert_eq!(config.visualization.image_width, 1200);
    }

    #[test]
    fn rejects_operations_that_do_not_fit_the_field() {
        let scalar_curl = ROTATION
            .replace("kind = \"vector\"", "kind = \"scalar\"")
            .replace("rotation", "saddle");
        let err = Config::parse(&scalar_curl).unwrap_err();
        assert!(err.to_string().contains("curl needs a vector field"));
    }

    #[test]
    fn legacy_divergence_needs_a_third_axis() {
        let planar = ROTATION.replace("z = { start = 0.0, stop = 1.0, samples = 2 }", "");
        assert!(Config::parse(&planar).is_err());

        let standard = planar.replace("[grid]", "[grid]\nconvention = \"standard\"");
        assert!(Config::parse(&standard).is_ok());
    }

    #[test]
    fn rejects_decreasing_and_nan_axes() {
        let reversed = ROTATION.replace("start = -1.0, stop = 1.0", "start = 1.0, stop = -1.0");
        let err = Config::parse(&reversed).unwrap_err();
        assert!(err.to_string().contains("must increase"));

        let axis = AxisConfig {
            start: 0.0,
            stop: f64::NAN,
            samples: 3,
        };
        assert!(axis.validate("x").is_err());
    }

    #[test]
    fn rejects_single_sample_axes() {
        let thin = ROTATION.replace("samples = 5", "samples = 1");
        let err = Config::parse(&thin).unwrap_err();
        assert!(err.to_string().contains("at least 2 samples"));
    }
}
