//! EIS Plot - command line entry point
//!
//! Reads a JSON dataset collection and renders it as a static Nyquist figure,
//! a Vega-Lite chart description, or in the native interactive viewer.

use anyhow::{bail, Context};
use clap::Parser;
use eis_plot::charts::{plot_interactive_with, save_nyquist, series_from_collection, NyquistPlot};
use eis_plot::gui::run_viewer;
use eis_plot::{DatasetCollection, RenderConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eis-plot", version, about = "Nyquist & Bode charts for impedance data")]
struct Args {
    /// JSON file mapping dataset labels to {"f": [...], "z": [[re, im], ...], "fmt": "o"}
    input: PathBuf,

    /// Write a static Nyquist figure (.png or .svg)
    #[arg(long = "static", value_name = "FILE")]
    static_out: Option<PathBuf>,

    /// Write the interactive chart as Vega-Lite JSON
    #[arg(long, value_name = "FILE")]
    vega: Option<PathBuf>,

    /// Open the interactive viewer
    #[arg(long)]
    view: bool,

    /// Axis scale for the static figure (tick exponent is -log10(scale))
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Impedance units shown on the static axes
    #[arg(long, default_value = "Ohms")]
    units: String,

    /// Interactive panel size in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Render settings (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.static_out.is_none() && args.vega.is_none() && !args.view {
        bail!("nothing to do: pass --static, --vega or --view");
    }
    if args.scale <= 0.0 {
        bail!("--scale must be positive, got {}", args.scale);
    }

    let config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let collection: DatasetCollection = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    log::info!(
        "Loaded {} datasets ({} samples)",
        collection.len(),
        collection.sample_count()
    );

    if let Some(path) = &args.static_out {
        let series = series_from_collection(&collection);

        let plot = NyquistPlot::new()
            .scale(args.scale)
            .units(args.units.clone())
            .config(config.clone());
        save_nyquist(
            path,
            &plot,
            &series,
            (config.image_width, config.image_height),
        )
        .with_context(|| format!("writing {}", path.display()))?;
        println!("Nyquist chart saved as '{}'.", path.display());
    }

    if args.vega.is_none() && !args.view {
        return Ok(());
    }

    let size = args.size.unwrap_or(config.panel_size);
    let chart = plot_interactive_with(&collection, size, &config)
        .context("building interactive chart")?;

    if let Some(path) = &args.vega {
        chart
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Vega-Lite chart saved as '{}'.", path.display());
    }

    if args.view {
        run_viewer(chart).map_err(|e| anyhow::anyhow!("viewer failed: {}", e))?;
    }

    Ok(())
}
