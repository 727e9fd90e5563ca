// Startup configuration.
//
// Values come from built-in defaults, then an optional TOML file, then
// command-line flags (applied in `main`). Nothing here changes at runtime.

use crate::error::Error;
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a hole sits relative to the recorded pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoleAnchor {
    /// Hole centered on the pointer.
    #[default]
    Center,
    /// Hole's bounding box starts at the pointer (hole hangs down-right of it).
    Corner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Hole size in surface pixels.
    pub hole_diameter: f32,
    /// Age after which a sample stops being drawn in Disappear Mode.
    pub deletion_lag_secs: f64,
    pub anchor: HoleAnchor,
    /// Physically drop expired samples instead of only hiding them.
    pub prune_expired: bool,
    /// Width of the feathered rim, 0 = hard edge.
    pub edge_softness: f32,
    pub initial_mode: Mode,
    /// Only record pointer motion while the primary button is held.
    pub record_while_pressed_only: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            hole_diameter: 100.0,
            deletion_lag_secs: 10.0,
            anchor: HoleAnchor::Center,
            prune_expired: true,
            edge_softness: 0.0,
            initial_mode: Mode::Disappear,
            record_while_pressed_only: false,
        }
    }
}

impl MaskConfig {
    pub fn hole_radius(&self) -> f32 {
        self.hole_diameter / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    /// Redraw ticks per second.
    pub tick_hz: u32,
    /// Show the mode button (and accept the M key).
    pub mode_toggle_enabled: bool,
    pub show_hud: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            tick_hz: 300,
            mode_toggle_enabled: true,
            show_hud: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    /// Requested capture size; the device may pick something close.
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: 640, height: 480, fps: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mask: MaskConfig,
    pub window: WindowConfig,
    pub camera: CameraConfig,
}

impl AppConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Use `explicit` if given, else the per-user file if it exists, else defaults.
    /// Returns the file that was actually read, if any.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), Error> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match default_path() {
            Some(path) if path.is_file() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let mask = &self.mask;
        if !(mask.hole_diameter > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "hole_diameter must be positive, got {}",
                mask.hole_diameter
            )));
        }
        if !(mask.deletion_lag_secs >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "deletion_lag_secs must not be negative, got {}",
                mask.deletion_lag_secs
            )));
        }
        if !(mask.edge_softness >= 0.0) || mask.edge_softness > mask.hole_radius() {
            return Err(Error::InvalidConfig(format!(
                "edge_softness must be within 0..={}, got {}",
                mask.hole_radius(),
                mask.edge_softness
            )));
        }
        if !(1..=1000).contains(&self.window.tick_hz) {
            return Err(Error::InvalidConfig(format!(
                "tick_hz must be within 1..=1000, got {}",
                self.window.tick_hz
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::InvalidConfig("window size must be non-zero".into()));
        }
        Ok(())
    }
}

/// `<config dir>/camera-mask/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("camera-mask").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mouse_variant() {
        let config = AppConfig::default();
        assert_eq!(config.mask.hole_diameter, 100.0);
        assert_eq!(config.mask.deletion_lag_secs, 10.0);
        assert_eq!(config.window.tick_hz, 300);
        assert!(config.window.mode_toggle_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::parse(
            r#"
            [mask]
            hole_diameter = 150.0
            initial_mode = "photo"
            anchor = "corner"

            [window]
            tick_hz = 60
            mode_toggle_enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.mask.hole_diameter, 150.0);
        assert_eq!(config.mask.initial_mode, Mode::Photo);
        assert_eq!(config.mask.anchor, HoleAnchor::Corner);
        assert_eq!(config.mask.deletion_lag_secs, 10.0);
        assert_eq!(config.window.tick_hz, 60);
        assert!(!config.window.mode_toggle_enabled);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig::default();
        config.mask.hole_diameter = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.mask.deletion_lag_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.mask.edge_softness = 80.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.window.tick_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_mode_fails_to_parse() {
        assert!(AppConfig::parse("[mask]\ninitial_mode = \"video\"").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
