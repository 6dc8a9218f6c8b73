//! castrig: assemble the capture pipeline and run it until EOS, error or Ctrl+C.

use clap::Parser;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use castrig::config::{Config, ConfigOverrides};
use castrig::{add_test_sources, PipelineContext};

/// castrig - front/surface camera and audio capture rig
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use test pattern sources instead of capture devices
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    fake: Option<bool>,

    /// V4L2 device of the front camera
    #[arg(long)]
    front_device: Option<PathBuf>,

    /// V4L2 device of the surface camera
    #[arg(long)]
    surface_device: Option<PathBuf>,

    /// Directory for pipeline DOT graphs
    #[arg(long)]
    dot_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        fake: args.fake,
        front_device: args.front_device,
        surface_device: args.surface_device,
        dot_dir: args.dot_dir,
        log_level: args.log_level,
    };
    let config = Config::from_figment(args.config.as_deref(), &overrides)?;

    // Config log level wins over RUST_LOG
    let env_filter = match config.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting castrig...");
    debug!("Configuration: {:?}", config);

    let mut ctx = PipelineContext::new("castrig")?.with_dot_dir(config.dot_dir.clone());
    ctx.start(|bin: &gst::Bin, element: &gst::Element| {
        debug!("Element {} added to {}", element.name(), bin.name());
    })?;

    let sources = add_test_sources(&ctx, &config.source_options())?;
    info!(
        "Sources ready: {}, {}, {}",
        sources.front.name(),
        sources.surface.name(),
        sources.audio.name()
    );

    ctx.dump_debug("castrig-assembled")?;

    let main_loop = ctx.main_loop().clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down...");
        main_loop.quit();
    })?;

    ctx.run();
    ctx.stop();
    info!("Pipeline stopped");

    Ok(())
}
