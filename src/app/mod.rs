pub mod game_loop;
pub mod game_view;
pub mod input;

pub use game_loop::{GameLoop, GameLoopError, GameLoopHandle};
pub use game_view::{GameView, LifecycleState};
pub use input::{TouchAction, TouchEvent};
