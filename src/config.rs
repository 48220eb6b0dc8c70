//! Effect configuration.
//!
//! Every setting has a default, so an empty JSON object is a valid config.
//! Use the builder methods from code, or [`EffectConfig::load`] to read a
//! JSON file:
//!
//! ```json
//! {
//!     "particle_count": 5000,
//!     "cell_size": 4,
//!     "image_path": "assets/wolf.png",
//!     "text": { "content": "Hello" },
//!     "initial_target": "text"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::DEFAULT_CELL_SIZE;
use crate::mode::Target;
use crate::particle::{
    Dynamics, DEFAULT_COLOR_EASING, DEFAULT_HEADING_EASING, DEFAULT_RESPAWN_ATTEMPTS,
};
use crate::source::TextSource;
use crate::system::DEFAULT_PARTICLE_COUNT;

/// Config file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "lumaflow.json";

/// Window settings for the standalone app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumaflow".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Settings for a [`FlowEffect`](crate::FlowEffect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Edge length of a flow cell in pixels.
    pub cell_size: u32,
    /// Random cell picks tried before a respawn falls back to a random position.
    pub respawn_attempts: u32,
    /// Fraction of the remaining angle a heading covers per tick.
    pub heading_easing: f32,
    /// Fraction of the remaining distance an image color covers per tick.
    pub color_easing: f32,
    /// Source image, loaded once at startup.
    pub image_path: PathBuf,
    /// Text target settings.
    pub text: TextSource,
    /// Target active on startup.
    pub initial_target: Target,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub window: WindowConfig,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            cell_size: DEFAULT_CELL_SIZE,
            respawn_attempts: DEFAULT_RESPAWN_ATTEMPTS,
            heading_easing: DEFAULT_HEADING_EASING,
            color_easing: DEFAULT_COLOR_EASING,
            image_path: PathBuf::from("assets/source.png"),
            text: TextSource::default(),
            initial_target: Target::Image,
            seed: None,
            window: WindowConfig::default(),
        }
    }
}

impl EffectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading config from '{}'", path.display());
            Self::load(path)
        } else {
            log::info!("No '{}' found, using default config", path.display());
            Ok(Self::default())
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be at least 1".into()));
        }
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be at least 1".into()));
        }
        for (name, rate) in [
            ("heading_easing", self.heading_easing),
            ("color_easing", self.color_easing),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in (0, 1], got {}",
                    name, rate
                )));
            }
        }
        if !(self.text.font_size > 0.0) {
            return Err(ConfigError::Invalid("text.font_size must be positive".into()));
        }
        Ok(())
    }

    /// Easing rates and respawn budget for the particle pool.
    pub fn dynamics(&self) -> Dynamics {
        Dynamics {
            heading_easing: self.heading_easing,
            color_easing: self.color_easing,
            respawn_attempts: self.respawn_attempts,
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_respawn_attempts(mut self, attempts: u32) -> Self {
        self.respawn_attempts = attempts;
        self
    }

    pub fn with_heading_easing(mut self, rate: f32) -> Self {
        self.heading_easing = rate;
        self
    }

    pub fn with_color_easing(mut self, rate: f32) -> Self {
        self.color_easing = rate;
        self
    }

    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = path.into();
        self
    }

    pub fn with_text(mut self, text: TextSource) -> Self {
        self.text = text;
        self
    }

    pub fn with_initial_target(mut self, target: Target) -> Self {
        self.initial_target = target;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EffectConfig::default();
        assert_eq!(config.particle_count, 3000);
        assert_eq!(config.cell_size, 5);
        assert_eq!(config.respawn_attempts, 50);
        assert!((config.heading_easing - 0.08).abs() < 1e-6);
        assert!((config.color_easing - 0.1).abs() < 1e-6);
        assert_eq!(config.initial_target, Target::Image);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EffectConfig::from_json("{}").unwrap(), EffectConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = EffectConfig::from_json(
            r#"{ "particle_count": 10, "text": { "content": "Hi" }, "initial_target": "text" }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.text.content, "Hi");
        assert_eq!(config.text.font_size, 350.0);
        assert_eq!(config.initial_target, Target::Text);
        assert_eq!(config.cell_size, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{ "cell_size": 0 }"#,
            r#"{ "particle_count": 0 }"#,
            r#"{ "heading_easing": 0.0 }"#,
            r#"{ "color_easing": 1.5 }"#,
            r#"{ "text": { "font_size": -1.0 } }"#,
        ] {
            let err = EffectConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{} -> {:?}", json, err);
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = EffectConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_builder_chain() {
        let config = EffectConfig::new()
            .with_particle_count(12)
            .with_cell_size(4)
            .with_respawn_attempts(7)
            .with_heading_easing(0.5)
            .with_color_easing(0.25)
            .with_seed(99);

        let dynamics = config.dynamics();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.cell_size, 4);
        assert_eq!(dynamics.respawn_attempts, 7);
        assert_eq!(dynamics.heading_easing, 0.5);
        assert_eq!(dynamics.color_easing, 0.25);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = EffectConfig::load_or_default("definitely/not/here.json").unwrap();
        assert_eq!(config, EffectConfig::default());
    }
}
