use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc
    },
    thread::JoinHandle,
    time::{Duration, Instant}
};

use crate::{
    config::{GameConfig, Palette},
    game::{
        grid_map::GridMap,
        town::{lock_town, SharedTown}
    },
    rendering::{Canvas, DrawSurface, FrameGuard}
};

pub const LOOP_THREAD_NAME: &str = "tinyvalley-loop";

#[derive(Debug, thiserror::Error)]
pub enum GameLoopError {
    #[error("Could not spawn loop thread, reason='{0}'")]
    SpawnError(#[from] std::io::Error),

    #[error("Loop thread panicked, reason='{0}'")]
    Panicked(String),
}

/// Caps the time between ticks at `max_delta`, a stall never feeds one huge
/// step into `update`.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(now: Instant, max_delta: Duration) -> Self {
        Self {
            last_tick: now,
            max_delta,
        }
    }

    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        elapsed.min(self.max_delta).as_secs_f32()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered { delta_seconds: f32 },
    Skipped { delta_seconds: f32 },
}

pub struct GameLoop<S> {
    town: SharedTown,
    surface: S,
    clock: FrameClock,
    palette: Palette,
    frame_sleep: Duration,
}

impl<S: DrawSurface> GameLoop<S> {
    pub fn new(town: SharedTown, surface: S, config: &GameConfig) -> Self {
        Self {
            town,
            surface,
            clock: FrameClock::new(Instant::now(), config.max_frame_delta()),
            palette: config.palette,
            frame_sleep: config.frame_sleep(),
        }
    }

    pub fn tick(&mut self, now: Instant) -> FrameOutcome {
        let delta_seconds = self.clock.tick(now);

        lock_town(&self.town).update(delta_seconds);

        if self.render() {
            FrameOutcome::Rendered { delta_seconds }
        } else {
            FrameOutcome::Skipped { delta_seconds }
        }
    }

    fn render(&mut self) -> bool {
        let Some(mut frame) = FrameGuard::acquire(&mut self.surface) else {
            log::trace!("Surface unavailable, frame skipped");
            return false;
        };

        let canvas = frame.canvas();
        let size = canvas.size();
        canvas.clear(self.palette.background);

        for line in GridMap::grid_lines(size.x, size.y) {
            canvas.draw_line(line.from, line.to, self.palette.grid_line_width, self.palette.grid_line);
        }

        lock_town(&self.town).draw(canvas);
        true
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl<S: DrawSurface + Send + 'static> GameLoop<S> {
    /// The thread ticks until the returned handle is stopped, then hands the
    /// surface back.
    pub fn spawn(mut self) -> Result<GameLoopHandle<S>, GameLoopError> {
        let running = Arc::new(AtomicBool::new(true));
        let running_shared = running.clone();

        let thread = std::thread::Builder::new()
            .name(LOOP_THREAD_NAME.to_string())
            .spawn(move || {
                log::debug!("Loop thread started");
                // Restart timing so the time spent paused is not one big delta.
                self.clock = FrameClock::new(Instant::now(), self.clock.max_delta);

                while running_shared.load(Ordering::Acquire) {
                    self.tick(Instant::now());
                    std::thread::sleep(self.frame_sleep);
                }

                log::debug!("Loop thread finished");
                self.into_surface()
            })?;

        Ok(GameLoopHandle {
            running,
            thread,
        })
    }
}

pub struct GameLoopHandle<S> {
    running: Arc<AtomicBool>,
    thread: JoinHandle<S>,
}

impl<S> GameLoopHandle<S> {
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn stop(self) -> Result<S, GameLoopError> {
        self.running.store(false, Ordering::Release);
        self.thread.join().map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown".to_string());
            GameLoopError::Panicked(reason)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{
            building::{Building, BuildingStyle},
            math::{Rect2F, Vector2F}
        },
        rendering::recorder::{DrawCommand, RecordingSurface}
    };

    #[test]
    fn test_clock_clamps_long_stall() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start, Duration::from_millis(50));

        let delta = clock.tick(start + Duration::from_secs(10));
        assert!(delta <= 0.05, "delta={delta}");
        assert_eq!(delta, Duration::from_millis(50).as_secs_f32());
    }

    #[test]
    fn test_clock_passes_short_delta_through() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start, Duration::from_millis(50));

        let delta = clock.tick(start + Duration::from_millis(16));
        assert_eq!(delta, Duration::from_millis(16).as_secs_f32());

        let delta = clock.tick(start + Duration::from_millis(20));
        assert_eq!(delta, Duration::from_millis(4).as_secs_f32());
    }

    #[test]
    fn test_clock_never_goes_negative() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start + Duration::from_secs(1), Duration::from_millis(50));
        assert_eq!(clock.tick(start), 0.0);
    }

    #[test]
    fn test_tick_renders_grid_then_buildings() {
        let config = GameConfig::default();
        let town = crate::game::town::Town::new().into_shared();
        lock_town(&town).push(Building::new(128, 0));

        let surface = RecordingSurface::new(256, 128);
        let log = surface.log();
        let mut game_loop = GameLoop::new(town, surface, &config);

        let outcome = game_loop.tick(Instant::now() + Duration::from_secs(10));
        assert_eq!(outcome, FrameOutcome::Rendered { delta_seconds: config.max_frame_delta().as_secs_f32() });

        let frame = log.last_frame();
        assert_eq!(frame.first(), Some(&DrawCommand::Clear(config.palette.background)));

        // x = 0, 128 and y = 0, then the building
        assert_eq!(frame.len(), 1 + 3 + 1);
        assert_eq!(frame[1], DrawCommand::Line {
            from: Vector2F::new(0.0, 0.0),
            to: Vector2F::new(0.0, 128.0),
            width: config.palette.grid_line_width,
            color: config.palette.grid_line,
        });
        assert_eq!(frame.last(), Some(&DrawCommand::RoundRect {
            rect: Rect2F::new(128.0, 0.0, 128.0, 128.0),
            corner_radius: BuildingStyle::default().corner_radius,
            color: BuildingStyle::default().fill,
        }));
    }

    #[test]
    fn test_tick_skips_unavailable_surface() {
        let town = crate::game::town::Town::new().into_shared();
        let surface = RecordingSurface::new(256, 128);
        surface.availability().set_available(false);
        let log = surface.log();
        let mut game_loop = GameLoop::new(town, surface, &GameConfig::default());

        assert!(matches!(game_loop.tick(Instant::now()), FrameOutcome::Skipped { .. }));
        assert_eq!(log.presented_frames(), 0);
        assert_eq!(log.skipped_frames(), 1);
    }

    #[test]
    fn test_spawned_loop_renders_and_returns_surface() {
        let town = crate::game::town::Town::new().into_shared();
        let surface = RecordingSurface::new(256, 256);
        let log = surface.log();

        let handle = GameLoop::new(town, surface, &GameConfig::default()).spawn().unwrap();
        std::thread::sleep(Duration::from_millis(120));
        assert!(!handle.is_finished());

        let surface = handle.stop().unwrap();
        assert!(!surface.is_acquired());
        assert!(log.presented_frames() > 0);

        let frames_after_stop = log.presented_frames();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(log.presented_frames(), frames_after_stop);
    }
}
