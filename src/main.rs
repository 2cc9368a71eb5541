//! rasterpipe viewer: runs a demo scene in a window
//!
//! The software rasterizer renders into its own BGRA buffer; each frame the
//! buffer is converted to RGBA and drawn as a single nearest-filtered
//! texture scaled to fill the window.

use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;
use rasterpipe::config::load_config;
use rasterpipe::demo::{self, DemoOptions, FrameInput, DEMO_NAMES};
use rasterpipe::rasterizer::{RasterMode, RenderContext};
use rasterpipe::EngineConfig;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "rasterpipe", version, about = "Software rasterizer demo viewer")]
struct Args {
    /// Engine configuration (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo to run: triangle, cube, tanks or field
    #[arg(short, long, default_value = "field")]
    demo: String,

    /// Asset directory holding models/ and scenes/
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,
}

fn engine_config(args: &Args) -> EngineConfig {
    match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    }
}

fn window_conf() -> Conf {
    let config = engine_config(&Args::parse());
    Conf {
        window_title: format!("rasterpipe v{}", VERSION),
        window_width: (config.width as f32 * config.window_scale) as i32,
        window_height: (config.height as f32 * config.window_scale) as i32,
        window_resizable: true,
        ..Default::default()
    }
}

fn poll_input(input: &mut FrameInput) {
    input.forward = is_key_down(KeyCode::Up) || is_key_down(KeyCode::W);
    input.backward = is_key_down(KeyCode::Down) || is_key_down(KeyCode::S);
    input.turn_left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
    input.turn_right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
    input.boost = is_key_down(KeyCode::Space);
    if is_key_pressed(KeyCode::Tab) {
        input.raster_mode = match input.raster_mode {
            RasterMode::Wire => RasterMode::Fill,
            RasterMode::Fill => RasterMode::Wire,
        };
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = engine_config(&args);

    let mut ctx = match RenderContext::new(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("cannot create render context: {}", e);
            return;
        }
    };

    let options = DemoOptions {
        assets: args.assets.clone(),
        render_list_capacity: config.render_list_capacity,
    };
    let Some(mut scene) = demo::create(&args.demo, &options) else {
        log::error!("unknown demo '{}', expected one of {:?}", args.demo, DEMO_NAMES);
        return;
    };
    if let Err(e) = scene.init(&mut ctx) {
        log::error!("{}: {}", scene.name(), e);
        return;
    }

    log::info!("=== rasterpipe v{} ({}) ===", VERSION, scene.name());
    log::info!("arrows/WASD move, space boosts, tab toggles wire/fill, esc quits");

    let mut input = FrameInput::default();
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        poll_input(&mut input);

        let stats = match scene.update(&mut ctx, get_frame_time(), &input) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("{}: {}", scene.name(), e);
                break;
            }
        };

        clear_background(BLACK);

        // Draw framebuffer to screen
        let fb_texture = Texture2D::from_rgba8(
            ctx.buffer_width() as u16,
            ctx.buffer_height() as u16,
            &ctx.to_rgba8(),
        );
        fb_texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &fb_texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        let hud = format!(
            "{} fps  objects {} culled {}  tris {} drawn {}",
            get_fps(),
            stats.objects,
            stats.culled,
            stats.triangles,
            stats.drawn,
        );
        draw_text(&hud, 8.0, 18.0, 16.0, Color::from_rgba(180, 180, 180, 255));

        next_frame().await;
    }

    scene.teardown();
}
