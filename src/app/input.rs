use crate::game::math::Vector2F;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub position: Vector2F,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f32, y: f32) -> Self {
        Self {
            action,
            position: Vector2F::new(x, y),
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(TouchAction::Down, x, y)
    }

    pub fn is_press(&self) -> bool {
        self.action == TouchAction::Down
    }
}
