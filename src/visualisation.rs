use crate::grid::{Dimensionality, PhysicalAxis};
use crate::scalar_field::{FieldSummary, ScalarField};
use crate::vector_field::VectorField;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

/// Optional physical ranges and styling for one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
    pub z: Option<(f64, f64)>,
    pub title: String,
    /// Arrow length for vector plots.
    pub scale: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            x: None,
            y: None,
            z: None,
            title: String::from("Field"),
            scale: 0.2,
        }
    }
}

impl PlotOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        PlotOptions {
            title: title.into(),
            ..Default::default()
        }
    }

    fn ranges(&self) -> [Option<(f64, f64)>; 3] {
        [self.x, self.y, self.z]
    }
}

pub struct FieldVisualiser {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    gradient: Box<dyn colorgrad::Gradient>,
}

impl FieldVisualiser {
    pub fn new(output_dir: impl AsRef<Path>, width: u32, height: u32) -> std::io::Result<Self> {
        std::fs::create_dir_all(output_dir.as_ref())?;

        let gradient = Box::new(colorgrad::preset::rd_yl_bu());

        Ok(Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            width,
            height,
            gradient,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Coloured scatter of every cell, written to `<output_dir>/<name>.png`.
    ///
    /// 3D fields are drawn in a 3D chart with z pointing up.
    pub fn plot_scalar(
        &self,
        field: &ScalarField,
        name: &str,
        options: &PlotOptions,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let positions =
            field
                .geometry()
                .positions(field.dimensionality(), field.shape(), options.ranges());
        let summary = field.summary();
        let path = self.output_dir.join(format!("{name}.png"));

        {
            let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;

            let cells = positions.iter().zip(field.field().iter());
            match field.dimensionality() {
                Dimensionality::ThreeD => {
                    let mut chart = ChartBuilder::on(&root)
                        .caption(&options.title, ("sans-serif", 30))
                        .margin(10)
                        .build_cartesian_3d(
                            span(positions.iter().map(|p| p[0])),
                            span(positions.iter().map(|p| p[2])),
                            span(positions.iter().map(|p| p[1])),
                        )?;
                    chart.with_projection(|mut pb| {
                        pb.yaw = 0.6;
                        pb.scale = 0.85;
                        pb.into_matrix()
                    });
                    chart.configure_axes().draw()?;
                    chart.draw_series(cells.map(|(p, &value)| {
                        Circle::new(lift(*p), 3, self.value_to_color(value, &summary).filled())
                    }))?;
                }
                _ => {
                    let mut chart = ChartBuilder::on(&root)
                        .caption(&options.title, ("sans-serif", 30))
                        .margin(10)
                        .x_label_area_size(40)
                        .y_label_area_size(40)
                        .build_cartesian_2d(
                            span(positions.iter().map(|p| p[0])),
                            span(positions.iter().map(|p| p[1])),
                        )?;
                    chart
                        .configure_mesh()
                        .x_desc("x axis")
                        .y_desc("y axis")
                        .draw()?;
                    chart.draw_series(cells.map(|(p, &value)| {
                        Circle::new((p[0], p[1]), 4, self.value_to_color(value, &summary).filled())
                    }))?;
                }
            }

            root.present()?;
        }

        info!(path = %path.display(), "saved scalar plot");
        Ok(path)
    }

    /// Arrow plot of a vector field, written to `<output_dir>/<name>.png`.
    ///
    /// Arrows are normalized to `options.scale` and coloured by magnitude.
    /// 1D fields lie along x and 2D fields in the z = 0 plane.
    pub fn plot_vector(
        &self,
        field: &VectorField,
        name: &str,
        options: &PlotOptions,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let positions =
            field
                .geometry()
                .positions(field.dimensionality(), field.shape(), options.ranges());
        let magnitudes = field.magnitude_grid();
        let summary = FieldSummary::of(&magnitudes);
        let path = self.output_dir.join(format!("{name}.png"));

        let arrows: Vec<([f64; 3], [f64; 3], RGBColor)> = positions
            .iter()
            .zip(field.field().iter().zip(magnitudes.iter()))
            .filter_map(|(&tail, (v, &mag))| {
                let unit = v.normalized()?;
                let head = [
                    tail[0] + unit.x * options.scale,
                    tail[1] + unit.y * options.scale,
                    tail[2] + unit.z * options.scale,
                ];
                Some((tail, head, self.value_to_color(mag, &summary)))
            })
            .collect();

        let extent = |axis: PhysicalAxis| {
            let i = axis.index();
            span(
                positions
                    .iter()
                    .map(|p| p[i])
                    .chain(arrows.iter().map(|(_, head, _)| head[i])),
            )
        };

        {
            let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(&options.title, ("sans-serif", 30))
                .margin(10)
                .build_cartesian_3d(
                    extent(PhysicalAxis::X),
                    extent(PhysicalAxis::Z),
                    extent(PhysicalAxis::Y),
                )?;
            chart.with_projection(|mut pb| {
                pb.yaw = 0.6;
                pb.scale = 0.85;
                pb.into_matrix()
            });
            chart.configure_axes().draw()?;

            chart.draw_series(arrows.iter().map(|&(tail, head, color)| {
                PathElement::new(vec![lift(tail), lift(head)], color.stroke_width(2))
            }))?;
            chart.draw_series(
                arrows
                    .iter()
                    .map(|&(_, head, color)| Circle::new(lift(head), 2, color.filled())),
            )?;

            root.present()?;
        }

        info!(path = %path.display(), arrows = arrows.len(), "saved vector plot");
        Ok(path)
    }

    fn value_to_color(&self, value: f64, summary: &FieldSummary) -> RGBColor {
        let normalized = if summary.max > summary.min {
            (value - summary.min) / (summary.max - summary.min)
        } else {
            0.5
        };
        let normalized = normalized.clamp(0.0, 1.0);
        let color_rgba = self.gradient.at(normalized as f32).to_rgba8();
        RGBColor(color_rgba[0], color_rgba[1], color_rgba[2])
    }
}

// Plotters draws its second 3D coordinate upwards; physical z goes there.
fn lift(p: [f64; 3]) -> (f64, f64, f64) {
    (p[0], p[2], p[1])
}

/// Padded drawing range over `values`.
fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return -1.0..1.0;
    }
    let pad = if max > min { 0.05 * (max - min) } else { 0.5 };
    (min - pad)..(max + pad)
}
