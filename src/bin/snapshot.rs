//! Headless renderer: runs a demo for a fixed number of frames and writes
//! the last frame to a PNG

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rasterpipe::config::load_config;
use rasterpipe::demo::{self, DemoOptions, FrameInput, FrameStats, DEMO_NAMES};
use rasterpipe::rasterizer::{RasterMode, RenderContext};
use rasterpipe::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "snapshot", version, about = "Render a demo frame to PNG without a window")]
struct Args {
    /// Demo to run: triangle, cube, tanks or field
    #[arg(short, long, default_value = "tanks")]
    demo: String,

    /// Frames to simulate before writing
    #[arg(short, long, default_value_t = 1)]
    frames: u32,

    /// Seconds per simulated frame
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Fill triangles instead of drawing wireframes
    #[arg(long)]
    fill: bool,

    /// Output PNG
    #[arg(short, long, default_value = "snapshot.png")]
    output: PathBuf,

    /// Engine configuration (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset directory holding models/ and scenes/
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,
}

fn run(args: &Args) -> Result<FrameStats, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut ctx = RenderContext::new(&config)?;

    let options = DemoOptions {
        assets: args.assets.clone(),
        render_list_capacity: config.render_list_capacity,
    };
    let mut scene = demo::create(&args.demo, &options)
        .ok_or_else(|| format!("unknown demo '{}', expected one of {:?}", args.demo, DEMO_NAMES))?;
    scene.init(&mut ctx)?;

    let input = FrameInput {
        raster_mode: if args.fill { RasterMode::Fill } else { RasterMode::Wire },
        ..Default::default()
    };
    let mut stats = FrameStats::default();
    for _ in 0..args.frames.max(1) {
        stats = scene.update(&mut ctx, args.dt, &input)?;
    }
    scene.teardown();

    ctx.save_png(&args.output)?;
    Ok(stats)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(stats) => {
            log::info!(
                "{}: {} objects ({} culled), {} triangles, {} drawn, {} skipped",
                args.demo,
                stats.objects,
                stats.culled,
                stats.triangles,
                stats.drawn,
                stats.skipped,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
