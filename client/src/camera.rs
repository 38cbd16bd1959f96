use crate::{dolly::Dolly, math::to_vec3, player::Player};
use bevy::{
    camera::Exposure, core_pipeline::tonemapping::Tonemapping, prelude::*,
    transform::TransformSystems,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, follow_dolly.before(TransformSystems::Propagate));
}

/// Start out behind the spawn point, looking along +Z.
const CAMERA_START: Vec3 = Vec3::new(0.0, 6.0, -14.0);
const CAMERA_DECAY_RATE: f32 = 6.0;
const LOOK_HEIGHT: f32 = 1.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 9.0 },
        Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(CAMERA_START).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.05, 0.06, 0.12, 1.0),
            directional_light_color: Color::srgba(0.6, 0.62, 0.97, 0.3),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                120.0,
                Color::srgb(0.05, 0.06, 0.12),
                Color::srgb(0.25, 0.26, 0.4),
            ),
        },
    ));
}

/// Ride the dolly cart and keep the player in frame.
fn follow_dolly(
    mut camera: Single<&mut Transform, With<Camera3d>>,
    dolly: Option<Single<&Dolly>>,
    player: Option<Single<&Transform, (With<Player>, Without<Camera3d>)>>,
    time: Res<Time>,
) {
    if let Some(dolly) = dolly {
        let target = to_vec3(&dolly.cart.world_position());
        camera
            .translation
            .smooth_nudge(&target, CAMERA_DECAY_RATE, time.delta_secs());
    }
    if let Some(player) = player {
        let focus = player.translation + Vec3::Y * LOOK_HEIGHT;
        if focus.distance_squared(camera.translation) > f32::EPSILON {
            camera.look_at(focus, Vec3::Y);
        }
    }
}
