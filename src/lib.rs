pub mod app;
pub mod config;
pub mod game;
pub mod rendering;

pub const APP_NAME: &str = "TinyValley";
