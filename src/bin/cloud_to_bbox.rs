//! cloud_to_bbox - fit one oriented box per point file
//!
//! Usage:
//!   cloud_to_bbox <DIR>                 Write boxes for every file in DIR to data.json
//!   cloud_to_bbox <DIR> -o out.json     Choose the output file
//!   cloud_to_bbox <DIR> --class pipe    Class name written for every box

use anyhow::{Context, Result};
use bbox3d_label::batch::extract_directory;
use bbox3d_label::LabelConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Fit oriented bounding boxes to a directory of point files")]
struct Cli {
    /// Directory of whitespace-separated `x y z` point files
    dir: PathBuf,

    /// Output record
    #[arg(short, long, default_value = "data.json")]
    output: PathBuf,

    /// Class name assigned to every fitted box
    #[arg(long, default_value = "pipe")]
    class: String,

    /// Decimal places written to the record
    #[arg(long)]
    precision: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = LabelConfig {
        default_class: cli.class,
        ..LabelConfig::default()
    };
    if let Some(precision) = cli.precision {
        config.export_precision = precision;
    }

    let report = extract_directory(&cli.dir, &config)
        .with_context(|| format!("Failed to list {}", cli.dir.display()))?;
    for failure in &report.failures {
        println!("{}", failure.path().display());
    }

    report
        .write_json(&cli.output, &config)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    Ok(())
}
