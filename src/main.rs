use anyhow::{Context, Result};
use clap::Parser;
use field_calculus::analysis::Analysis;
use field_calculus::config::Config;
use field_calculus::visualisation::FieldVisualiser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file describing the grid, the field and the operations
    #[arg(short, long)]
    config: PathBuf,

    /// Write plots here instead of the configured directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip plotting even when the config enables it
    #[arg(long)]
    no_plot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "field_calculus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading config from: {}", cli.config.display());
    let config = Config::from_file(&cli.config)?;
    config.log_summary();

    let visualiser = if config.visualization.enabled && !cli.no_plot {
        let output_dir = cli
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.visualization.output_dir));
        let visualiser = FieldVisualiser::new(
            &output_dir,
            config.visualization.image_width,
            config.visualization.image_height,
        )
        .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
        Some(visualiser)
    } else {
        None
    };

    let analysis = Analysis::new(config);
    let reports = analysis.run(visualiser.as_ref())?;

    for report in &reports {
        match &report.plot {
            Some(path) => info!("{} -> {}", report.operation.name(), path.display()),
            None => info!("{} (not plotted)", report.operation.name()),
        }
    }

    Ok(())
}
