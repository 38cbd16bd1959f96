// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod dolly;
mod input;
mod level;
mod math;
mod player;
mod settings;
mod toon;
mod world;

use bevy::prelude::*;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

/// Startup work is split into ordered sets: the level has to exist (statics, lights,
/// glass) before the player controller can look it up.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartupSet {
    Level,
    Actors,
}

/// Per-frame work after the fixed player ticks: the threshold drives the cart, then
/// toon props are shaded from the current lights.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Dolly,
    Toon,
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Moonlit".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.configure_sets(Startup, (StartupSet::Level, StartupSet::Actors).chain());
        app.configure_sets(Update, (FrameSet::Dolly, FrameSet::Toon).chain());

        app.add_plugins((
            settings::plugin,
            input::plugin,
            world::plugin,
            player::plugin,
            dolly::plugin,
            camera::plugin,
            toon::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
