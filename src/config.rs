//! Configuration for the headless compositor

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Seat configuration
    #[serde(default)]
    pub seat: SeatConfig,

    /// Defaults applied to client surfaces
    #[serde(default)]
    pub surface: SurfaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output refresh rate in Hz; also paces scene commits
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            refresh_hz: default_refresh_hz(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatConfig {
    /// Wayland seat name advertised to clients
    #[serde(default = "default_seat_name")]
    pub name: String,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            name: default_seat_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Width sent in the initial configure when a client commits unsized
    #[serde(default = "default_surface_width")]
    pub default_width: i32,

    /// Height sent in the initial configure when a client commits unsized
    #[serde(default = "default_surface_height")]
    pub default_height: i32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            default_width: default_surface_width(),
            default_height: default_surface_height(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err("Display dimensions must be non-zero".into());
        }

        if self.display.refresh_hz == 0 || self.display.refresh_hz > 240 {
            return Err("Display refresh rate must be between 1 and 240 Hz".into());
        }

        if self.seat.name.is_empty() {
            return Err("Seat name must not be empty".into());
        }

        if self.surface.default_width <= 0 || self.surface.default_height <= 0 {
            return Err("Default surface dimensions must be positive".into());
        }

        Ok(())
    }
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_refresh_hz() -> u32 {
    60
}

fn default_seat_name() -> String {
    "seat0".to_string()
}

fn default_surface_width() -> i32 {
    800
}

fn default_surface_height() -> i32 {
    600
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_dimensions() {
        let mut cfg = Config::default();
        cfg.display.width = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_seat_name() {
        let mut cfg = Config::default();
        cfg.seat.name.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_surface_defaults() {
        let mut cfg = Config::default();
        cfg.surface.default_height = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[display]\nwidth = 1280\n").unwrap();
        assert_eq!(cfg.display.width, 1280);
        assert_eq!(cfg.display.height, 1080);
        assert_eq!(cfg.seat.name, "seat0");
        assert_eq!(cfg.surface.default_width, 800);
    }
}
