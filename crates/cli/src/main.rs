use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Turn vectorization engine SVG output into editor scene JSON.
#[derive(Parser)]
#[command(name = "autosvg", version, about, long_about = None)]
struct Cli {
    /// SVG file produced by the engine
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the scene JSON (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the JSON
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let svg = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let scene = autosvg_core::parse_svg_document(&svg)
        .with_context(|| format!("parsing {}", cli.input.display()))?;
    tracing::info!(
        shapes = scene.len(),
        segments = scene.segment_count(),
        "built scene from {}",
        cli.input.display()
    );

    let mut json = if cli.pretty {
        serde_json::to_vec_pretty(&scene)?
    } else {
        serde_json::to_vec(&scene)?
    };
    json.push(b'\n');

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => std::io::stdout().lock().write_all(&json)?,
    }
    Ok(())
}
