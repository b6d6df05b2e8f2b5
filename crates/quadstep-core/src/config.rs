//! Movement configuration.
//!
//! Three knobs tune the simulation:
//!
//! | JSON key | Parameter string | Default | Meaning |
//! |----------|------------------|---------|---------|
//! | `diagonalSpeedFactor` | `Diagonal Speed` | 90 | percent of move speed while moving diagonally |
//! | `useDiagonalSprites` | `Diagonal Charset` | true | draw diagonal sprite rows |
//! | `triggerCooldownFrames` | `Tile Delay` | 30 | ticks before a touch trigger or damage floor can repeat |
//!
//! The strict loaders return a [`ConfigError`]; the lenient ones fall back to
//! defaults and log a warning.
//!
//! # Example
//!
//! ```
//! use quadstep_core::config::MovementConfig;
//!
//! let config = MovementConfig::from_json(r#"{ "triggerCooldownFrames": 12 }"#).unwrap();
//! assert_eq!(config.trigger_cooldown_frames, 12);
//! assert_eq!(config.diagonal_speed_factor, 90);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Parameter string for [`MovementConfig::diagonal_speed_factor`].
pub const PARAM_DIAGONAL_SPEED: &str = "Diagonal Speed";
/// Parameter string for [`MovementConfig::use_diagonal_sprites`].
pub const PARAM_DIAGONAL_CHARSET: &str = "Diagonal Charset";
/// Parameter string for [`MovementConfig::trigger_cooldown_frames`].
pub const PARAM_TILE_DELAY: &str = "Tile Delay";

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON text could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A parameter string held an unusable value.
    #[error("invalid value {value:?} for parameter {key:?}")]
    InvalidParameter {
        /// Parameter name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Tunable movement settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementConfig {
    /// Percent of move speed while diagonal facing is set
    pub diagonal_speed_factor: u32,
    /// Use diagonal sprite rows; cosmetic only
    pub use_diagonal_sprites: bool,
    /// Trigger gate cooldown in ticks
    pub trigger_cooldown_frames: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            diagonal_speed_factor: 90,
            use_diagonal_sprites: true,
            trigger_cooldown_frames: 30,
        }
    }
}

impl MovementConfig {
    /// Parses a JSON object. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or mistyped values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a JSON object, falling back to the defaults on any error.
    #[must_use]
    pub fn from_json_or_default(text: &str) -> Self {
        Self::from_json(text).unwrap_or_else(|err| {
            warn!(error = %err, "using default movement config");
            Self::default()
        })
    }

    /// Reads the plugin parameter strings.
    ///
    /// Unknown keys are ignored and missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for the first value that
    /// does not parse.
    pub fn from_parameters<'a, I>(params: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in params {
            config.apply_parameter(key, value)?;
        }
        Ok(config)
    }

    /// Reads the plugin parameter strings, keeping the default for every
    /// value that does not parse.
    #[must_use]
    pub fn from_parameters_lenient<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in params {
            if let Err(err) = config.apply_parameter(key, value) {
                warn!(error = %err, "keeping default");
            }
        }
        config
    }

    fn apply_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        };
        let trimmed = value.trim();
        match key {
            PARAM_DIAGONAL_SPEED => {
                self.diagonal_speed_factor = trimmed.parse().map_err(|_| invalid())?;
            }
            PARAM_DIAGONAL_CHARSET => {
                self.use_diagonal_sprites = match trimmed.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid()),
                };
            }
            PARAM_TILE_DELAY => {
                self.trigger_cooldown_frames = trimmed.parse().map_err(|_| invalid())?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MovementConfig::default();
        assert_eq!(config.diagonal_speed_factor, 90);
        assert!(config.use_diagonal_sprites);
        assert_eq!(config.trigger_cooldown_frames, 30);
    }

    #[test]
    fn json_roundtrip_uses_camel_case() {
        let config = MovementConfig {
            diagonal_speed_factor: 75,
            use_diagonal_sprites: false,
            trigger_cooldown_frames: 8,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("diagonalSpeedFactor"));
        assert_eq!(MovementConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn bad_json_is_an_error_or_default() {
        assert!(matches!(
            MovementConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
        assert!(MovementConfig::from_json(r#"{ "triggerCooldownFrames": -3 }"#).is_err());
        assert_eq!(
            MovementConfig::from_json_or_default("not json"),
            MovementConfig::default()
        );
    }

    #[test]
    fn parameter_strings() {
        let config = MovementConfig::from_parameters([
            ("Diagonal Speed", "80"),
            ("Diagonal Charset", "FALSE"),
            ("Tile Delay", " 12 "),
            ("Something Else", "ignored"),
        ])
        .unwrap();
        assert_eq!(config.diagonal_speed_factor, 80);
        assert!(!config.use_diagonal_sprites);
        assert_eq!(config.trigger_cooldown_frames, 12);
    }

    #[test]
    fn invalid_parameter_names_key() {
        let err = MovementConfig::from_parameters([("Tile Delay", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { ref key, .. } if key == "Tile Delay"
        ));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn lenient_parameters_keep_good_values() {
        let config = MovementConfig::from_parameters_lenient([
            ("Diagonal Speed", "fast"),
            ("Tile Delay", "10"),
        ]);
        assert_eq!(config.diagonal_speed_factor, 90);
        assert_eq!(config.trigger_cooldown_frames, 10);
    }
}
