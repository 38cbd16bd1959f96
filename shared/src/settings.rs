//! Tunable settings, loadable from `.ron` or `.toml`.
//!
//! Defaults mirror [`crate::constants`]. Every struct is `serde(default)`, so a settings
//! file only needs the values it overrides. Call [`GameSettings::validate`] (done by
//! [`GameSettings::load_from_file`]) before handing settings to any constructor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, TintPalette,
    constants::*,
    error::{ensure_non_negative, ensure_positive},
};

/// When a climbing player lets go of the wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimbExit {
    /// Both movement axes read exactly zero.
    #[default]
    NoInput,
    /// The forward probe no longer finds a climbable surface.
    NoSurface,
}

/// The two shipped flavors of the player controller.
///
/// They differ in climb exit rule and in whether glass reacts to moonlight; they are
/// kept apart on purpose rather than blended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerVariant {
    /// Let go of walls when input stops; glass is always solid.
    #[default]
    Canonical,
    /// Let go of walls when they end; glass is permeable in moonlight.
    GlassPermeable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub move_speed: f32,
    /// Lerp factor toward this tick's target position, in `(0, 1]`.
    pub smooth_factor: f32,
    pub turn_rate: f32,
    pub climb_speed: f32,
    pub jump_impulse: f32,
    pub mass: f32,
    pub climb_probe_distance: f32,
    pub ground_probe_distance: f32,
    pub moonlight_ground_probe_distance: f32,
    pub moonlight_lift_accel: f32,
    pub moonlight_nudge_impulse: f32,
    pub shadow_gravity_force: f32,
    pub climb_exit: ClimbExit,
    /// Toggle glass colliders with moonlight exposure.
    pub glass_permeability: bool,
    pub tints: TintPalette,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::for_variant(ControllerVariant::Canonical)
    }
}

impl ControllerSettings {
    pub fn for_variant(variant: ControllerVariant) -> Self {
        let (climb_exit, glass_permeability) = match variant {
            ControllerVariant::Canonical => (ClimbExit::NoInput, false),
            ControllerVariant::GlassPermeable => (ClimbExit::NoSurface, true),
        };

        Self {
            move_speed: MOVE_SPEED_MPS,
            smooth_factor: MOVE_SMOOTH_FACTOR,
            turn_rate: TURN_RATE,
            climb_speed: CLIMB_SPEED_MPS,
            jump_impulse: JUMP_IMPULSE,
            mass: PLAYER_MASS_KG,
            climb_probe_distance: CLIMB_PROBE_DISTANCE,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            moonlight_ground_probe_distance: MOONLIGHT_GROUND_PROBE_DISTANCE,
            moonlight_lift_accel: MOONLIGHT_LIFT_ACCEL,
            moonlight_nudge_impulse: MOONLIGHT_NUDGE_IMPULSE,
            shadow_gravity_force: SHADOW_GRAVITY_FORCE,
            climb_exit,
            glass_permeability,
            tints: TintPalette {
                moonlight: MOONLIGHT_TINT,
                artificial: ARTIFICIAL_LIGHT_TINT,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("controller.move_speed", self.move_speed)?;
        ensure_positive("controller.smooth_factor", self.smooth_factor)?;
        if self.smooth_factor > 1.0 {
            return Err(ConfigError::InvalidSetting {
                name: "controller.smooth_factor",
                reason: format!("must be at most 1.0 (got {})", self.smooth_factor),
            });
        }
        ensure_non_negative("controller.turn_rate", self.turn_rate)?;
        ensure_non_negative("controller.climb_speed", self.climb_speed)?;
        ensure_non_negative("controller.jump_impulse", self.jump_impulse)?;
        ensure_positive("controller.mass", self.mass)?;
        ensure_positive("controller.climb_probe_distance", self.climb_probe_distance)?;
        ensure_positive("controller.ground_probe_distance", self.ground_probe_distance)?;
        ensure_positive(
            "controller.moonlight_ground_probe_distance",
            self.moonlight_ground_probe_distance,
        )?;
        ensure_non_negative("controller.moonlight_lift_accel", self.moonlight_lift_accel)?;
        ensure_non_negative(
            "controller.moonlight_nudge_impulse",
            self.moonlight_nudge_impulse,
        )?;
        ensure_non_negative("controller.shadow_gravity_force", self.shadow_gravity_force)?;

        for (name, tint) in [
            ("controller.tints.moonlight", self.tints.moonlight),
            ("controller.tints.artificial", self.tints.artificial),
        ] {
            if !tint.is_valid() {
                return Err(ConfigError::InvalidSetting {
                    name,
                    reason: "color channels must be within 0.0..=1.0".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DollySettings {
    /// Track distance units per second.
    pub speed: f32,
    /// Whether the cart starts out moving forward along the track.
    pub start_forward: bool,
}

impl Default for DollySettings {
    fn default() -> Self {
        Self {
            speed: DOLLY_SPEED,
            start_forward: true,
        }
    }
}

impl DollySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("dolly.speed", self.speed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub fixed_timestep_secs: f32,
    pub max_frame_delta_secs: f32,
    pub gravity_mps2: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fixed_timestep_secs: FIXED_TIMESTEP_SECS,
            max_frame_delta_secs: MAX_FRAME_DELTA_SECS,
            gravity_mps2: GRAVITY_MPS2,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("simulation.fixed_timestep_secs", self.fixed_timestep_secs)?;
        ensure_positive("simulation.max_frame_delta_secs", self.max_frame_delta_secs)?;
        ensure_non_negative("simulation.gravity_mps2", self.gravity_mps2)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub controller: ControllerSettings,
    pub dolly: DollySettings,
    pub simulation: SimulationSettings,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        self.dolly.validate()?;
        self.simulation.validate()
    }

    /// Parse settings text in the given format (`"ron"` or `"toml"`) and validate it.
    pub fn from_str_with_format(contents: &str, format: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = match format {
            "ron" => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings; the format follows the file extension.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if !matches!(format, "ron" | "toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_str_with_format(&contents, format)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty RON, e.g. to seed a settings file.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
