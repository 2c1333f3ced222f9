use crate::config::{Config, FieldConfig, Operation};
use crate::error::Result;
use crate::mesh::Mesh;
use crate::scalar_field::{FieldSummary, ScalarField};
use crate::vector_field::VectorField;
use crate::visualisation::{FieldVisualiser, PlotOptions};
use anyhow::bail;
use ndarray::ArrayD;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A field sampled from the configuration.
#[derive(Debug, Clone)]
pub enum Sampled {
    Scalar(ScalarField),
    Vector(VectorField),
}

/// Result of applying one operation.
#[derive(Debug, Clone)]
pub enum Outcome {
    Scalar(ScalarField),
    Vector(VectorField),
    /// Bare grid, as returned by divergence.
    Grid(ArrayD<f64>),
}

impl Outcome {
    /// Statistics of the values, or of the magnitudes for vector results.
    pub fn summary(&self) -> FieldSummary {
        match self {
            Outcome::Scalar(field) => field.summary(),
            Outcome::Vector(field) => FieldSummary::of(&field.magnitude_grid()),
            Outcome::Grid(grid) => FieldSummary::of(grid),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperationReport {
    pub operation: Operation,
    pub summary: FieldSummary,
    pub plot: Option<PathBuf>,
}

/// Samples the configured field and runs the configured operations on it.
pub struct Analysis {
    config: Config,
    mesh: Mesh,
}

impl Analysis {
    pub fn new(config: Config) -> Self {
        let mesh = config.grid.mesh();
        Analysis { config, mesh }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sample(&self) -> Result<Sampled> {
        let grid = &self.config.grid;
        let (origin, dist) = (grid.origin(), grid.dist());
        Ok(match self.config.field {
            FieldConfig::Scalar { sample } => Sampled::Scalar(ScalarField::load_field_with(
                &origin,
                |p| sample.eval(p),
                &self.mesh,
                &dist,
                grid.convention,
            )?),
            FieldConfig::Vector { sample } => Sampled::Vector(VectorField::load_field_with(
                &origin,
                |p| sample.eval(p),
                &self.mesh,
                &dist,
                grid.convention,
            )?),
        })
    }

    pub fn apply(&self, input: &Sampled, operation: Operation) -> anyhow::Result<Outcome> {
        let convention = self.config.grid.convention;
        let outcome = match (input, operation) {
            (Sampled::Scalar(field), Operation::Gradient) => {
                Outcome::Vector(field.gradient_with(convention)?)
            }
            (Sampled::Vector(field), Operation::Divergence) => {
                Outcome::Grid(field.divergence_with(convention)?)
            }
            (Sampled::Vector(field), Operation::Curl) => Outcome::Vector(field.curl_with(convention)?),
            (Sampled::Vector(field), Operation::Magnitude) => Outcome::Scalar(field.magnitude()?),
            (Sampled::Scalar(field), _) => {
                bail!("{} does not apply to the scalar field {}", operation.name(), field)
            }
            (Sampled::Vector(field), Operation::Gradient) => {
                bail!("gradient does not apply to the vector field {}", field)
            }
        };
        Ok(outcome)
    }

    /// Runs every configured operation, logging a summary for each and
    /// plotting the input and every result when a visualiser is given.
    pub fn run(&self, visualiser: Option<&FieldVisualiser>) -> anyhow::Result<Vec<OperationReport>> {
        info!("Sampling field on a {:?} mesh...", self.mesh.shape());
        let input = self.sample()?;

        if let Some(visualiser) = visualiser {
            if let Some(path) = self.plot_input(&input, visualiser) {
                info!("input -> {}", path.display());
            }
        }

        let mut reports = Vec::with_capacity(self.config.operations.len());
        for &operation in &self.config.operations {
            debug!(operation = operation.name(), "applying");
            let outcome = self.apply(&input, operation)?;
            let summary = outcome.summary();
            info!("{}: {}", operation.name(), summary);

            let plot = visualiser.and_then(|visualiser| {
                let title = operation.name();
                match &outcome {
                    Outcome::Scalar(field) => self.plot(visualiser, || {
                        visualiser.plot_scalar(field, title, &self.options(title))
                    }),
                    Outcome::Vector(field) => self.plot(visualiser, || {
                        visualiser.plot_vector(field, title, &self.options(title))
                    }),
                    Outcome::Grid(grid) => {
                        let input_geometry = match &input {
                            Sampled::Scalar(field) => *field.geometry(),
                            Sampled::Vector(field) => *field.geometry(),
                        };
                        match ScalarField::with_geometry(grid.clone(), input_geometry) {
                            Ok(field) => self.plot(visualiser, || {
                                visualiser.plot_scalar(&field, title, &self.options(title))
                            }),
                            Err(e) => {
                                warn!("Skipping plot of {}: {}", title, e);
                                None
                            }
                        }
                    }
                }
            });

            reports.push(OperationReport {
                operation,
                summary,
                plot,
            });
        }

        info!("Analysis complete!");
        Ok(reports)
    }

    /// Plots the sampled field, `None` when drawing failed.
    pub fn plot_input(&self, input: &Sampled, visualiser: &FieldVisualiser) -> Option<PathBuf> {
        match input {
            Sampled::Scalar(field) => self.plot(visualiser, || {
                visualiser.plot_scalar(field, "input", &self.options("Scalar Field"))
            }),
            Sampled::Vector(field) => self.plot(visualiser, || {
                visualiser.plot_vector(field, "input", &self.options("Vector Field"))
            }),
        }
    }

    fn options(&self, title: &str) -> PlotOptions {
        PlotOptions {
            scale: self.config.visualization.scale,
            ..PlotOptions::titled(title)
        }
    }

    fn plot<F>(&self, visualiser: &FieldVisualiser, draw: F) -> Option<PathBuf>
    where
        F: FnOnce() -> std::result::Result<PathBuf, Box<dyn std::error::Error>>,
    {
        match draw() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(
                    "Failed to visualise into {}: {}",
                    visualiser.output_dir().display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(field: &str, operations: &str, extra_grid: &str) -> Config {
        Config::parse(&format!(
            r#"
            operations = [{operations}]

            [grid]
            x = {{ start = 0.0, stop = 2.0, samples = 5 }}
            y = {{ start = 0.0, stop = 2.0, samples = 5 }}
            indexing = "ij"
            {extra_grid}

            [field]
            {field}
            "#
        ))
        .unwrap()
    }

    #[test]
    fn gradient_of_a_plane_is_uniform() {
        let analysis = Analysis::new(config(
            "kind = \"scalar\"\nsample = \"plane\"",
            "\"gradient\"",
            "convention = \"standard\"",
        ));
        let reports = analysis.run(None).unwrap();
        assert_eq!(reports.len(), 1);
        // |grad x| = 1 everywhere with ij indexing and standard spacing
        assert_abs_diff_eq!(reports[0].summary.min, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(reports[0].summary.max, 1.0, epsilon = 1e-12);
        assert!(reports[0].plot.is_none());
    }

    #[test]
    fn failed_plots_are_reported_without_aborting() {
        let output_dir = std::env::temp_dir().join(format!("field-calculus-{}", std::process::id()));
        let visualiser = FieldVisualiser::new(&output_dir, 200, 200).unwrap();
        std::fs::remove_dir_all(&output_dir).unwrap();

        let analysis = Analysis::new(config(
            "kind = \"scalar\"\nsample = \"saddle\"",
            "\"gradient\"",
            "",
        ));
        let input = analysis.sample().unwrap();
        assert!(analysis.plot_input(&input, &visualiser).is_none());

        let reports = analysis.run(Some(&visualiser)).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].plot.is_none());
    }

    #[test]
    fn rotation_has_uniform_curl_and_no_divergence() {
        let analysis = Analysis::new(config(
            "kind = \"vector\"\nsample = \"rotation\"",
            "\"curl\", \"divergence\"",
            "convention = \"standard\"",
        ));
        let input = analysis.sample().unwrap();
        let curl = analysis.apply(&input, Operation::Curl).unwrap().summary();
        assert_abs_diff_eq!(curl.mean, 2.0, epsilon = 1e-12);
        let divergence = analysis.apply(&input, Operation::Divergence).unwrap().summary();
        assert_abs_diff_eq!(divergence.max_abs, 0.0, epsilon = 1e-12);
    }
}
