use std::path::PathBuf;

use clap::{Parser, Subcommand, Args};
use tiny_valley::{
    app::GameLoopError,
    config::{ConfigError, GameConfig}
};

/// # Global Arguments
#[derive(Debug, Parser)]
#[command(version, about = "TinyValley, tap to place buildings on a grid", long_about = None)]
struct Cli {
    /// JSON config file, defaults are used for missing fields
    #[arg(short = 'c', long = "config", value_name = "CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run in a desktop window, left click places a building
    Window,

    /// Run the loop without a window, placing buildings at random cells
    Headless(HeadlessArgs),

    /// Print the cell a coordinate snaps to
    Snap(SnapArgs),
}

#[derive(Debug, Args)]
struct HeadlessArgs {
    /// Simulated surface width
    #[arg(long = "width", default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Simulated surface height
    #[arg(long = "height", default_value_t = 1920, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Number of random taps
    #[arg(short = 't', long = "taps", default_value_t = 20)]
    taps: u32,

    /// Delay between taps, in milliseconds
    #[arg(long = "tap-interval", value_name = "MILLIS", default_value_t = 100)]
    tap_interval_ms: u64,

    /// Stop after this many seconds, runs until ctrl-C when omitted
    #[arg(short = 's', long = "seconds")]
    seconds: Option<u64>,
}

#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
struct SnapArgs {
    x: f32,
    y: f32,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    GameLoop(#[from] GameLoopError),

    #[error("Event loop failed, reason='{0}'")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Could not set ctrl-C handler, reason='{0}'")]
    Ctrlc(#[from] ctrlc::Error),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .format_file(false)
        .format_line_number(true)
        .init();

    let cli_args = Cli::parse();
    log::info!("Got args: '{:?}'.", cli_args);

    if let Err(e) = run(cli_args) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli_args: Cli) -> Result<(), CliError> {
    let config = match &cli_args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    match cli_args.mode {
        Mode::Window => cli_window::run(config),
        Mode::Headless(headless_args) => cli_headless::run(config, &headless_args),
        Mode::Snap(snap_args) => {
            let (gx, gy) = tiny_valley::game::grid_map::GridMap::snap(snap_args.x, snap_args.y);
            println!("({gx}, {gy})");
            Ok(())
        },
    }
}

mod cli_headless {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc
        },
        time::{Duration, Instant}
    };

    use tiny_valley::{
        app::{GameView, TouchEvent},
        config::GameConfig,
        rendering::recorder::RecordingSurface
    };

    use super::{CliError, HeadlessArgs};

    pub fn run(config: GameConfig, args: &HeadlessArgs) -> Result<(), CliError> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_shared = stop.clone();

        ctrlc::set_handler(move || {
            log::info!("Captured ctrl-C, stopping the loop...");
            stop_shared.store(true, Ordering::Release);
        })?;

        let surface = RecordingSurface::new(args.width, args.height);
        let frame_log = surface.log();

        let mut view = GameView::new(config);
        view.surface_created(surface)?;
        view.resume()?;

        let deadline = args.seconds.map(|s| Instant::now() + Duration::from_secs(s));
        let tap_interval = Duration::from_millis(args.tap_interval_ms);
        let mut taps = 0;

        while !stop.load(Ordering::Acquire) && deadline.is_none_or(|d| Instant::now() < d) {
            if taps < args.taps {
                let x = rand::random_range(0.0..args.width as f32);
                let y = rand::random_range(0.0..args.height as f32);
                view.on_touch_event(&TouchEvent::down(x, y));
                taps += 1;
            }
            std::thread::sleep(tap_interval);
        }

        view.pause();
        view.surface_destroyed();

        println!(
            "Placed {} buildings, presented {} frames, skipped {}",
            view.building_count(),
            frame_log.presented_frames(),
            frame_log.skipped_frames()
        );
        Ok(())
    }
}

mod cli_window {
    use std::sync::Arc;

    use tiny_valley::{
        app::{GameView, TouchAction, TouchEvent},
        config::GameConfig,
        game::math::Vector2F,
        rendering::renderer::WgpuSurface,
        APP_NAME
    };

    use winit::{
        application::ApplicationHandler,
        event::{
            ElementState,
            MouseButton,
            WindowEvent
        },
        event_loop::{
            ActiveEventLoop,
            ControlFlow,
            EventLoop
        },
        window::{
            Window,
            WindowId
        }
    };

    use super::CliError;

    struct App {
        config: GameConfig,
        view: Option<GameView<WgpuSurface>>,
        cursor: Vector2F,
        pressed: bool,
    }

    impl App {
        fn touch(&self, action: TouchAction) {
            if let Some(view) = self.view.as_ref() {
                let consumed = view.on_touch_event(&TouchEvent::new(action, self.cursor.x, self.cursor.y));
                log::trace!("{action:?} at {} consumed={consumed}", self.cursor);
            }
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            let view = self.view.get_or_insert_with(|| GameView::new(self.config.clone()));

            if !view.has_surface() {
                let window = match event_loop.create_window(Window::default_attributes().with_title(APP_NAME)) {
                    Ok(window) => Arc::new(window),
                    Err(e) => {
                        log::error!("Could not create window: {e}");
                        event_loop.exit();
                        return;
                    },
                };

                let surface = match pollster::block_on(WgpuSurface::new(window)) {
                    Ok(surface) => surface,
                    Err(e) => {
                        log::error!("Could not create renderer: {e}");
                        event_loop.exit();
                        return;
                    },
                };

                if let Err(e) = view.surface_created(surface) {
                    log::error!("{e}");
                    event_loop.exit();
                    return;
                }
            }

            if let Err(e) = view.resume() {
                log::error!("{e}");
                event_loop.exit();
            }
        }

        fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
            if let Some(view) = self.view.as_mut() {
                view.pause();
            }
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
            match event {
                WindowEvent::CloseRequested => {
                    log::info!("The close button was pressed; stopping");
                    if let Some(view) = self.view.as_mut() {
                        view.pause();
                        view.surface_destroyed();
                    }
                    event_loop.exit();
                },
                WindowEvent::Resized(size) => {
                    // The surface follows the window size on its own
                    if let Some(view) = self.view.as_mut() {
                        view.surface_changed(size.width, size.height);
                    }
                },
                WindowEvent::CursorMoved { position, .. } => {
                    self.cursor = Vector2F::new(position.x as f32, position.y as f32);
                    if self.pressed {
                        self.touch(TouchAction::Move);
                    }
                },
                WindowEvent::CursorLeft { .. } => {
                    if self.pressed {
                        self.pressed = false;
                        self.touch(TouchAction::Cancel);
                    }
                },
                WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                    match state {
                        ElementState::Pressed => {
                            self.pressed = true;
                            self.touch(TouchAction::Down);
                        },
                        ElementState::Released => {
                            self.pressed = false;
                            self.touch(TouchAction::Up);
                        },
                    }
                },
                _ => (),
            }
        }
    }

    pub fn run(config: GameConfig) -> Result<(), CliError> {
        let event_loop = EventLoop::new()?;

        // Frames come from the loop thread, the event loop only waits for input
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App {
            config,
            view: None,
            cursor: Vector2F::zero(),
            pressed: false,
        };

        event_loop.run_app(&mut app)?;
        Ok(())
    }
}
