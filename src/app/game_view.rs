use crate::{
    config::GameConfig,
    game::{
        math::Vector2I,
        town::{lock_town, SharedTown, Town}
    },
    rendering::DrawSurface
};

use super::{
    game_loop::{GameLoop, GameLoopError, GameLoopHandle},
    input::TouchEvent
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Running,
    Paused,
    Destroyed,
}

enum SurfaceSlot<S> {
    Absent,
    Idle(S),
    Looping(GameLoopHandle<S>),
}

/// The loop runs only while the view is resumed *and* has a surface. A loop
/// thread that died on its own counts as paused and is reaped by the next
/// `resume` or `pause`.
pub struct GameView<S: DrawSurface + Send + 'static> {
    config: GameConfig,
    town: SharedTown,
    slot: SurfaceSlot<S>,
    resumed: bool,
    state: LifecycleState,
}

impl<S: DrawSurface + Send + 'static> GameView<S> {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            town: Town::new().into_shared(),
            slot: SurfaceSlot::Absent,
            resumed: false,
            state: LifecycleState::Created,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.loop_died() {
            return LifecycleState::Paused;
        }
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(&self.slot, SurfaceSlot::Looping(handle) if !handle.is_finished())
    }

    pub fn has_surface(&self) -> bool {
        !matches!(self.slot, SurfaceSlot::Absent)
    }

    pub fn town(&self) -> SharedTown {
        self.town.clone()
    }

    pub fn building_count(&self) -> usize {
        lock_town(&self.town).len()
    }

    pub fn surface_created(&mut self, surface: S) -> Result<(), GameLoopError> {
        log::info!("Surface created");
        if self.has_surface() {
            log::warn!("Replacing a surface that was never destroyed");
            self.release_surface();
        }

        self.slot = SurfaceSlot::Idle(surface);
        if self.resumed {
            self.start_loop()?;
        }
        Ok(())
    }

    pub fn surface_changed(&mut self, width: u32, height: u32) {
        log::debug!("Surface changed to {width}x{height}");
    }

    pub fn surface_destroyed(&mut self) -> Option<S> {
        log::info!("Surface destroyed");
        let surface = self.release_surface();
        self.state = LifecycleState::Destroyed;
        surface
    }

    pub fn resume(&mut self) -> Result<(), GameLoopError> {
        log::info!("Resume");
        self.resumed = true;
        if self.loop_died() {
            log::warn!("Loop thread exited while resumed, reaping it");
            self.stop_loop();
        }
        self.start_loop()
    }

    /// Blocks until the loop thread exited.
    pub fn pause(&mut self) {
        log::info!("Pause");
        self.resumed = false;
        self.stop_loop();
    }

    pub fn on_touch_event(&self, event: &TouchEvent) -> bool {
        if !event.is_press() {
            return false;
        }

        let position: Vector2I = lock_town(&self.town)
            .place_building(event.position.x, event.position.y, self.config.building);
        log::debug!("Touch at {} placed building at {}", event.position, position);
        true
    }

    fn loop_died(&self) -> bool {
        matches!(&self.slot, SurfaceSlot::Looping(handle) if handle.is_finished())
    }

    fn start_loop(&mut self) -> Result<(), GameLoopError> {
        match std::mem::replace(&mut self.slot, SurfaceSlot::Absent) {
            SurfaceSlot::Idle(surface) => {
                let game_loop = GameLoop::new(self.town.clone(), surface, &self.config);
                let handle = game_loop.spawn().inspect_err(|e| {
                    log::error!("Could not start loop, surface dropped: {e}");
                })?;
                self.slot = SurfaceSlot::Looping(handle);
                self.state = LifecycleState::Running;
                log::info!("Loop started");
            },
            SurfaceSlot::Looping(handle) => {
                log::debug!("Loop already running");
                self.slot = SurfaceSlot::Looping(handle);
            },
            SurfaceSlot::Absent => {
                log::debug!("No surface yet, loop starts once it is created");
            },
        }
        Ok(())
    }

    fn stop_loop(&mut self) {
        match std::mem::replace(&mut self.slot, SurfaceSlot::Absent) {
            SurfaceSlot::Looping(handle) => {
                match handle.stop() {
                    Ok(surface) => {
                        self.slot = SurfaceSlot::Idle(surface);
                        log::info!("Loop stopped");
                    },
                    Err(e) => {
                        log::error!("Loop ended abnormally, surface dropped: {e}");
                    },
                }
                self.state = LifecycleState::Paused;
            },
            other => {
                self.slot = other;
            },
        }
    }

    fn release_surface(&mut self) -> Option<S> {
        self.stop_loop();
        match std::mem::replace(&mut self.slot, SurfaceSlot::Absent) {
            SurfaceSlot::Idle(surface) => Some(surface),
            SurfaceSlot::Absent | SurfaceSlot::Looping(_) => None,
        }
    }
}

impl<S: DrawSurface + Send + 'static> Drop for GameView<S> {
    fn drop(&mut self) {
        self.stop_loop();
    }
}
