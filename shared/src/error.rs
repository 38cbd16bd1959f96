use crate::{LightId, StaticId, SurfaceTag};

/// Everything that can be wrong with a scene or settings before the first tick runs.
///
/// Required collaborators (lights, glass colliders, tracks, tuning values) are checked
/// when they are handed to a constructor, so a bad scene fails at load time instead of
/// halfway through a frame.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Static collider {0} is defined more than once")]
    DuplicateStatic(StaticId),

    #[error("Static collider {id} is invalid: {reason}")]
    InvalidStatic { id: StaticId, reason: String },

    #[error("Static collider {0} does not exist in the scene")]
    UnknownStatic(StaticId),

    #[error("Static collider {id} is tagged {tag:?}, expected Glass")]
    NotGlass { id: StaticId, tag: SurfaceTag },

    #[error("Light {id} is invalid: {reason}")]
    InvalidLight { id: LightId, reason: String },

    #[error("Light {0} is registered more than once")]
    DuplicateLight(LightId),

    #[error("Dolly track is invalid: {0}")]
    InvalidTrack(String),
}

/// Reject non-finite or negative tuning values.
pub(crate) fn ensure_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidSetting {
            name,
            reason: format!("must be a finite, non-negative number (got {value})"),
        });
    }
    Ok(())
}

/// Reject non-finite, zero or negative tuning values.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidSetting {
            name,
            reason: format!("must be a finite, positive number (got {value})"),
        });
    }
    Ok(())
}
