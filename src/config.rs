//! Viewer settings, read from TOML. Every field has a default, so an empty
//! file (or no file) yields a usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest internal render width the viewer will drop to on narrow windows.
pub const MIN_RENDER_WIDTH: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub controls: ControlsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "segcast".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Internal framebuffer height; width follows the window aspect.
    pub internal_height: usize,
    pub clear_color: u32,
    /// Cross sharpen after upscaling.
    pub sharpen: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            internal_height: 240,
            clear_color: 0x000000,
            sharpen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per second.
    pub turn_speed_deg: f32,
    /// Eye offset applied while crouching.
    pub crouch_offset: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            turn_speed_deg: 120.0,
            crouch_offset: -0.15,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded viewer config {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero"));
        }
        if self.render.internal_height == 0 {
            return Err(ConfigError::Invalid("internal height must be non-zero"));
        }
        if self.render.clear_color > 0xFF_FFFF {
            return Err(ConfigError::Invalid("clear color must be 0xRRGGBB"));
        }
        if !(self.controls.move_speed.is_finite() && self.controls.move_speed >= 0.0) {
            return Err(ConfigError::Invalid("move speed must be non-negative"));
        }
        if !(self.controls.turn_speed_deg.is_finite() && self.controls.turn_speed_deg >= 0.0) {
            return Err(ConfigError::Invalid("turn speed must be non-negative"));
        }
        if !self.controls.crouch_offset.is_finite() {
            return Err(ConfigError::Invalid("crouch offset must be finite"));
        }
        Ok(())
    }

    /// Internal render size for a window of `window_w × window_h` pixels:
    /// fixed height, width from the aspect ratio, rounded up to even.
    pub fn internal_size(&self, window_w: usize, window_h: usize) -> (usize, usize) {
        let height = self.render.internal_height;
        let aspect = if window_h > 0 {
            window_w as f32 / window_h as f32
        } else {
            1.0
        };
        let mut width = ((height as f32 * aspect).round() as usize).max(MIN_RENDER_WIDTH);
        if width % 2 != 0 {
            width += 1;
        }
        (width, height)
    }
}
