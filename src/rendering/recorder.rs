// In-memory surface that records draw calls instead of rasterizing them.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
    Mutex,
    MutexGuard
};

use crate::game::math::{
    Rect2F,
    Vector2F,
    Vector2U
};

use super::{Canvas, Color, DrawSurface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line {
        from: Vector2F,
        to: Vector2F,
        width: f32,
        color: Color,
    },
    RoundRect {
        rect: Rect2F,
        corner_radius: f32,
        color: Color,
    },
}

#[derive(Debug)]
pub struct RecordingCanvas {
    size: Vector2U,
    commands: Vec<DrawCommand>,
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Vector2U {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, from: Vector2F, to: Vector2F, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn fill_round_rect(&mut self, rect: Rect2F, corner_radius: f32, color: Color) {
        self.commands.push(DrawCommand::RoundRect { rect, corner_radius, color });
    }
}

#[derive(Debug, Default)]
struct FrameLogState {
    presented_frames: u64,
    skipped_frames: u64,
    last_frame: Vec<DrawCommand>,
}

#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    state: Arc<Mutex<FrameLogState>>,
}

impl FrameLog {
    fn lock(&self) -> MutexGuard<'_, FrameLogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn presented_frames(&self) -> u64 {
        self.lock().presented_frames
    }

    pub fn skipped_frames(&self) -> u64 {
        self.lock().skipped_frames
    }

    pub fn last_frame(&self) -> Vec<DrawCommand> {
        self.lock().last_frame.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceAvailability(Arc<AtomicBool>);

impl SurfaceAvailability {
    pub fn set_available(&self, available: bool) {
        self.0.store(available, Ordering::Release);
    }

    pub fn is_available(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct RecordingSurface {
    canvas: RecordingCanvas,
    acquired: bool,
    availability: SurfaceAvailability,
    log: FrameLog,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RecordingCanvas {
                size: Vector2U::new(width, height),
                commands: vec![],
            },
            acquired: false,
            availability: SurfaceAvailability(Arc::new(AtomicBool::new(true))),
            log: FrameLog::default(),
        }
    }

    pub fn log(&self) -> FrameLog {
        self.log.clone()
    }

    pub fn availability(&self) -> SurfaceAvailability {
        self.availability.clone()
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl DrawSurface for RecordingSurface {
    type Canvas = RecordingCanvas;

    fn try_acquire(&mut self) -> bool {
        if !self.availability.is_available() {
            self.log.lock().skipped_frames += 1;
            return false;
        }

        self.canvas.commands.clear();
        self.acquired = true;
        true
    }

    fn canvas_mut(&mut self) -> &mut Self::Canvas {
        &mut self.canvas
    }

    fn present(&mut self) {
        if !self.acquired {
            log::warn!("Present called on a surface that was not acquired");
            return;
        }
        self.acquired = false;

        let mut frame_log = self.log.lock();
        frame_log.presented_frames += 1;
        frame_log.last_frame = std::mem::take(&mut self.canvas.commands);
    }
}
