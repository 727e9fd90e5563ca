// What you SEE:
// • A black window. Move the mouse over it and the live camera shows through
//   round holes that follow the pointer.
// • Disappear Mode: holes close again 10 s after they were made.
// • Photo Mode: holes stay open until you switch modes.
// • Click the top-right button (or press M) to switch modes; that also clears
//   every hole. C clears, H toggles the HUD, ESC quits.

use camera_mask::camera::{placeholder_frame, CameraFeed};
use camera_mask::clock::{Clock, MonotonicClock};
use camera_mask::config::AppConfig;
use camera_mask::draw::{draw_text_5x7, Drawer, ModeButton};
use camera_mask::error::Error;
use camera_mask::gamma::GammaLut;
use camera_mask::logging;
use camera_mask::mask::{composite, make_disc_stamp, MaskRaster};
use camera_mask::mode::Mode;
use camera_mask::renderer::MaskTrailRenderer;
use camera_mask::types::{FrameBuffer, MaskSurface};

use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Command-line arguments; each one overrides the matching config file value.
#[derive(Parser, Debug)]
#[command(name = "camera-mask")]
#[command(version, about = "Live camera behind a black mask that the pointer wipes away", long_about = None)]
struct Args {
    /// Configuration file (defaults to <config dir>/camera-mask/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Hole diameter in pixels
    #[arg(long)]
    diameter: Option<f32>,

    /// Seconds before a hole closes in Disappear Mode
    #[arg(long)]
    lag: Option<f64>,

    /// Redraw ticks per second
    #[arg(long)]
    tick_hz: Option<u32>,

    /// Camera device index
    #[arg(long)]
    camera_index: Option<u32>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode { config.mask.initial_mode = mode; }
        if let Some(d) = self.diameter { config.mask.hole_diameter = d; }
        if let Some(lag) = self.lag { config.mask.deletion_lag_secs = lag; }
        if let Some(hz) = self.tick_hz { config.window.tick_hz = hz; }
        if let Some(index) = self.camera_index { config.camera.index = index; }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    logging::setup(args.verbose);

    let (mut config, source) = AppConfig::load_or_default(args.config.as_deref())?;
    match &source {
        Some(path) => info!("Loaded config from {:?}", path),
        None => info!("No config file, using defaults"),
    }
    args.apply(&mut config);
    config.validate()?;

    run(&config)
}

fn run(config: &AppConfig) -> Result<(), Error> {
    /* --- Window + camera ---
       Visual: window opens black; video appears once the camera thread delivers. */
    let (mut w, mut h) = (config.window.width, config.window.height);
    let mut drawer = Drawer::new("Camera Mask", w, h, config.window.tick_hz)?;
    let feed = CameraFeed::spawn(config.camera.clone(), w, h);

    /* --- Mask state ---
       Visual: renderer decides where holes are; raster + LUT turn them into pixels. */
    let clock = MonotonicClock::start();
    let mut renderer = MaskTrailRenderer::new(config.mask.clone(), MaskSurface::window(w, h));
    let stamp = make_disc_stamp(config.mask.hole_radius(), config.mask.edge_softness);
    let mut raster = MaskRaster::new(w, h, stamp);
    let lut = GammaLut::new();

    /* --- Reusable buffers ---
       `video` is the latest camera frame (or a placeholder), `screen` what gets presented. */
    let mut video = placeholder_frame(w, h, "Waiting for camera");
    let mut camera_failed = false;
    let mut screen = FrameBuffer::filled(w, h, 0);

    let toggle_enabled = config.window.mode_toggle_enabled;
    let mut button = ModeButton::for_window(w, h);
    let mut show_hud = config.window.show_hud;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    info!(mode = %renderer.mode(), tick_hz = config.window.tick_hz, "Mask running");

    /* ------------------------------ Tick loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = clock.now_secs();

        /* 1) Window resized: new surface, new buffers, immediate redraw. */
        let (nw, nh) = drawer.size();
        if (nw, nh) != (w, h) && nw > 0 && nh > 0 {
            (w, h) = (nw, nh);
            screen = FrameBuffer::filled(w, h, 0);
            raster.resize(w, h);
            feed.set_target_size(w, h);
            button = ModeButton::for_window(w, h);
            let message = if camera_failed { "NO CAMERA" } else { "Waiting for camera" };
            video = placeholder_frame(w, h, message);
            renderer.on_surface_geometry_changed(MaskSurface::window(w, h), now);
        }

        /* 2) Inputs
           Only real pointer motion feeds the renderer, so a parked pointer
           does not reopen a hole right after a clear or a mode switch. */
        let clicked = drawer.left_clicked();
        let pointer = drawer.mouse_pos();
        let moved = drawer.mouse_moved();
        let mut reset = false;
        if toggle_enabled {
            let on_button = clicked && pointer.is_some_and(|(x, y)| button.contains(x, y));
            if on_button || drawer.m_pressed_once() {
                renderer.toggle_mode(); // visual: every hole closes, label flips
                reset = true;
            }
        }
        if drawer.c_pressed_once() {
            renderer.clear_trail(); // visual: back to solid black until the pointer moves
            reset = true;
        }
        if drawer.h_pressed_once() {
            show_hud = !show_hud;
        }
        renderer.set_touched(drawer.left_mouse_down());
        if let Some((x, y)) = moved.filter(|_| !reset) {
            renderer.record_pointer_move(x, y);
        }

        /* 3) Latest video under the mask. */
        if let Some(frame) = feed.take_latest() {
            if frame.width == w && frame.height == h {
                video = frame;
            }
        } else if feed.has_failed() && !camera_failed {
            camera_failed = true;
            video = placeholder_frame(w, h, "NO CAMERA"); // visual: grey fallback
        }
        screen.pixels.copy_from_slice(&video.pixels);

        /* 4) Mask: opaque everywhere except the holes. */
        let frame = renderer.redraw(now);
        let holes = frame.holes.len();
        raster.update(frame);
        composite(&mut screen, raster.mask(), &lut)?;

        /* 5) Button + HUD on top. */
        if toggle_enabled {
            button.draw(&mut screen, renderer.mode().label());
        }
        if show_hud {
            let hud = format!(
                "{} | TRAIL: {} | HOLES: {} | {}",
                renderer.mode(),
                renderer.trail().len(),
                holes,
                hud_fps_text
            );
            draw_text_5x7(&mut screen, 8, h as i32 - 16, &hud, 0x00_FF_FF_FF);
        }

        /* 6) Present. */
        drawer.present(&screen)?;

        frames_this_second += 1;
        if last_fps_time.elapsed() >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / last_fps_time.elapsed().as_secs_f32();
            debug!(fps, trail = renderer.trail().len(), "tick rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = Instant::now();
        }
    }

    info!("Window closed");
    Ok(())
}
