//! Game settings loaded once at startup.
//!
//! The path comes from `MOONLIT_SETTINGS`, falling back to `assets/settings.ron` under the
//! same root Bevy resolves assets from.
//! A missing file means defaults; a file that fails to parse or validate stops the app.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::*;
use shared::{ConfigError, GameSettings};

const SETTINGS_ENV: &str = "MOONLIT_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "assets/settings.ron";

#[derive(Resource, Debug, Clone, Deref)]
pub struct Settings(pub GameSettings);

/// Set when the settings file was present but unusable.
#[derive(Resource, Debug)]
struct SettingsError(String);

pub(super) fn plugin(app: &mut App) {
    let path = std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| asset_root().join(DEFAULT_SETTINGS_FILE));

    let settings = match load(&path) {
        Ok(settings) => settings,
        Err(err) => {
            error!("Invalid settings in {}: {err}", path.display());
            app.insert_resource(SettingsError(err.to_string()));
            GameSettings::default()
        }
    };

    app.insert_resource(Time::<Fixed>::from_seconds(
        settings.simulation.fixed_timestep_secs as f64,
    ));
    app.insert_resource(Time::<Virtual>::from_max_delta(Duration::from_secs_f32(
        settings.simulation.max_frame_delta_secs,
    )));
    app.insert_resource(Settings(settings));
    app.add_systems(PreStartup, exit_on_invalid_settings);
}

fn asset_root() -> PathBuf {
    ["BEVY_ASSET_ROOT", "CARGO_MANIFEST_DIR"]
        .into_iter()
        .find_map(std::env::var_os)
        .map(PathBuf::from)
        .unwrap_or_default()
}

fn load(path: &Path) -> Result<GameSettings, ConfigError> {
    if !path.exists() {
        warn!("No settings file at {}, using defaults", path.display());
        return Ok(GameSettings::default());
    }
    GameSettings::load_from_file(path)
}

fn exit_on_invalid_settings(error: Option<Res<SettingsError>>, mut exit: MessageWriter<AppExit>) {
    if let Some(error) = error {
        error!("Refusing to start: {}", error.0);
        exit.write(AppExit::error());
    }
}
