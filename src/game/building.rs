use serde::{
    Deserialize,
    Serialize
};

use crate::rendering::{Canvas, Color};

use super::{
    grid_map::{GridMap, CELL_SIZE},
    math::{Rect2F, Rect2I, Vector2I}
};

pub const BUILDING_CORNER_RADIUS: f32 = 24.0;
pub const BUILDING_FILL_COLOR: Color = Color::rgb(76, 175, 80);

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingStyle {
    pub fill: Color,
    pub corner_radius: f32,
}

impl Default for BuildingStyle {
    fn default() -> Self {
        Self {
            fill: BUILDING_FILL_COLOR,
            corner_radius: BUILDING_CORNER_RADIUS,
        }
    }
}

/// Behaviors may restyle a building but never move it off its cell.
pub trait BuildingBehavior: Send + std::fmt::Debug {
    fn update(&mut self, style: &mut BuildingStyle, delta_seconds: f32);
}

#[derive(Debug)]
pub struct Building {
    position: Vector2I,
    style: BuildingStyle,
    behavior: Option<Box<dyn BuildingBehavior>>,
}

impl Building {
    /// `x` and `y` must already be grid aligned.
    pub fn new(x: i32, y: i32) -> Self {
        Self::with_style(x, y, BuildingStyle::default())
    }

    pub fn with_style(x: i32, y: i32, style: BuildingStyle) -> Self {
        debug_assert!(x % CELL_SIZE == 0 && y % CELL_SIZE == 0, "Building at ({x},{y}) is off grid");
        Self {
            position: Vector2I::new(x, y),
            style,
            behavior: None,
        }
    }

    pub fn at_touch(x: f32, y: f32, style: BuildingStyle) -> Self {
        let (gx, gy) = GridMap::snap(x, y);
        Self::with_style(gx, gy, style)
    }

    pub fn with_behavior<B: BuildingBehavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn position(&self) -> Vector2I {
        self.position
    }

    pub fn style(&self) -> &BuildingStyle {
        &self.style
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    pub fn bounds(&self) -> Rect2I {
        Rect2I::new(self.position.x, self.position.y, CELL_SIZE, CELL_SIZE)
    }

    pub fn update(&mut self, delta_seconds: f32) {
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.update(&mut self.style, delta_seconds);
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_round_rect(
            Rect2F::from(self.bounds()),
            self.style.corner_radius,
            self.style.fill
        );
    }
}
