use std::{
    path::Path,
    time::Duration
};

use serde::{
    Deserialize,
    Serialize
};

use crate::{
    game::building::BuildingStyle,
    rendering::Color
};

pub const DEFAULT_FRAME_SLEEP: Duration = Duration::from_millis(16);
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(50);
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::rgb(34, 40, 49);
pub const DEFAULT_GRID_LINE_COLOR: Color = Color::rgb(70, 78, 90);
pub const DEFAULT_GRID_LINE_WIDTH: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file, reason='{0}'")]
    IoError(#[from] std::io::Error),

    #[error("Could not parse config, reason='{0}'")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Color,
    pub grid_line: Color,
    pub grid_line_width: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND_COLOR,
            grid_line: DEFAULT_GRID_LINE_COLOR,
            grid_line_width: DEFAULT_GRID_LINE_WIDTH,
        }
    }
}

/// Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Fixed pause after every tick, independent of how long the tick took.
    pub frame_sleep_ms: u64,
    pub max_frame_delta_ms: u64,
    pub palette: Palette,
    pub building: BuildingStyle,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frame_sleep_ms: DEFAULT_FRAME_SLEEP.as_millis() as u64,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA.as_millis() as u64,
            palette: Palette::default(),
            building: BuildingStyle::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded config from '{}'", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn frame_sleep(&self) -> Duration {
        Duration::from_millis(self.frame_sleep_ms)
    }

    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_delta_ms == 0 {
            return Err(ConfigError::InvalidValue("max_frame_delta_ms must be positive".into()));
        }

        if !(self.building.corner_radius >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "building.corner_radius must be non-negative, got {}", self.building.corner_radius
            )));
        }

        if !(self.palette.grid_line_width > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "palette.grid_line_width must be positive, got {}", self.palette.grid_line_width
            )));
        }

        Ok(())
    }
}
