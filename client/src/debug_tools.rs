//! Debug/performance tooling for native dev builds.
//!
//! Perf overlay plus gizmos for what the gameplay code sees: rays from the player to
//! every light it classifies against, the ground probe, the dolly threshold and track.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;
use shared::{LightKind, SceneQueries};

use crate::{
    dolly::Dolly,
    math::{to_color, to_vec3},
    player::Player,
    world::SceneWorld,
};

const BLOCKED_RAY_COLOR: Color = Color::srgba(0.4, 0.4, 0.4, 0.5);
const PROBE_COLOR: Color = Color::srgb(0.2, 1.0, 0.4);
const THRESHOLD_COLOR: Color = Color::srgb(1.0, 0.8, 0.2);
const TRACK_COLOR: Color = Color::srgb(0.3, 0.7, 1.0);

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, (draw_light_rays, draw_ground_probe, draw_dolly));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

/// Visible lights get a ray in their set's tint, blocked ones a grey ray.
fn draw_light_rays(mut gizmos: Gizmos, player: Single<&Player>, scene: Option<Res<SceneWorld>>) {
    let Some(scene) = scene else {
        return;
    };
    let controller = &player.controller;
    let from = controller.body().position;
    let tints = &controller.settings().tints;

    for kind in [LightKind::Moonlight, LightKind::Artificial] {
        let tint = match kind {
            LightKind::Moonlight => to_color(tints.moonlight),
            LightKind::Artificial => to_color(tints.artificial),
        };
        for light in controller.lights().lights(kind) {
            let color = if scene.segment_blocked(&from, &light.position) {
                BLOCKED_RAY_COLOR
            } else {
                tint
            };
            gizmos.line(to_vec3(&from), to_vec3(&light.position), color);
        }
    }
}

fn draw_ground_probe(mut gizmos: Gizmos, player: Single<&Player>) {
    let Some(report) = player.last_tick else {
        return;
    };
    let start = to_vec3(&player.controller.body().position);
    let end = start - Vec3::Y * report.ground_probe_length;
    let color = if report.grounded {
        PROBE_COLOR
    } else {
        BLOCKED_RAY_COLOR
    };
    gizmos.line(start, end, color);
}

fn draw_dolly(mut gizmos: Gizmos, dolly: Single<&Dolly>) {
    let (min, max) = dolly.trigger.bounds();
    let (min, max) = (to_vec3(&min), to_vec3(&max));
    gizmos.cuboid(
        Transform::from_translation((min + max) * 0.5).with_scale(max - min),
        THRESHOLD_COLOR,
    );

    let track = dolly.cart.track();
    let samples = 32;
    gizmos.linestrip(
        (0..=samples).map(|i| to_vec3(&track.evaluate(track.length() * i as f32 / samples as f32))),
        TRACK_COLOR,
    );
    gizmos.sphere(
        Isometry3d::from_translation(to_vec3(&dolly.cart.world_position())),
        0.3,
        TRACK_COLOR,
    );
}
