pub mod recorder;
pub mod renderer;

use serde::{
    Deserialize,
    Serialize
};

use crate::game::math::{
    Rect2F,
    Vector2F,
    Vector2U
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "Color::opaque")]
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: u8::MAX }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    fn opaque() -> u8 {
        u8::MAX
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

pub trait Canvas {
    fn size(&self) -> Vector2U;

    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, from: Vector2F, to: Vector2F, width: f32, color: Color);

    fn fill_round_rect(&mut self, rect: Rect2F, corner_radius: f32, color: Color);
}

/// Every successful `try_acquire` must be followed by exactly one
/// `present`. [`FrameGuard`] does the pairing.
pub trait DrawSurface {
    type Canvas: Canvas;

    /// False when no frame can be drawn right now. The caller skips the frame.
    fn try_acquire(&mut self) -> bool;

    fn canvas_mut(&mut self) -> &mut Self::Canvas;

    fn present(&mut self);
}

/// Acquired frame. Presents on drop, also while unwinding from a panic
/// raised by drawing code.
pub struct FrameGuard<'a, S: DrawSurface> {
    surface: &'a mut S,
}

impl<'a, S: DrawSurface> FrameGuard<'a, S> {
    pub fn acquire(surface: &'a mut S) -> Option<Self> {
        if surface.try_acquire() {
            Some(Self { surface })
        } else {
            None
        }
    }

    pub fn canvas(&mut self) -> &mut S::Canvas {
        self.surface.canvas_mut()
    }
}

impl<S: DrawSurface> Drop for FrameGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::recorder::RecordingSurface;

    #[test]
    fn test_color_to_f32() {
        let color = Color::rgb(255, 0, 51);
        assert_eq!(color.to_f32_array(), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn test_color_deserialize_defaults_alpha() {
        let color: Color = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
        assert_eq!(color, Color::rgba(1, 2, 3, 255));
    }

    #[test]
    fn test_frame_guard_presents_on_drop() {
        let mut surface = RecordingSurface::new(64, 64);
        let log = surface.log();
        {
            let mut frame = FrameGuard::acquire(&mut surface).unwrap();
            frame.canvas().clear(Color::rgb(0, 0, 0));
        }
        assert_eq!(log.presented_frames(), 1);
    }

    #[test]
    fn test_frame_guard_presents_when_drawing_panics() {
        let mut surface = RecordingSurface::new(64, 64);
        let log = surface.log();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut frame = FrameGuard::acquire(&mut surface).unwrap();
            frame.canvas().clear(Color::rgb(0, 0, 0));
            panic!("drawing failed");
        }));

        assert!(result.is_err());
        assert_eq!(log.presented_frames(), 1);
        assert!(!surface.is_acquired());
    }

    #[test]
    fn test_frame_guard_skips_unavailable_surface() {
        let mut surface = RecordingSurface::new(64, 64);
        surface.availability().set_available(false);
        let log = surface.log();

        assert!(FrameGuard::acquire(&mut surface).is_none());
        assert_eq!(log.presented_frames(), 0);
    }
}
