use bevy::{ecs::query::QueryFilter, prelude::*};
use leafwing_input_manager::prelude::ActionState;
use shared::{
    CameraBasis, LightRig, LightSource, PlayerBody, PlayerController, Rgba, SurfaceTag,
    TickReport,
};

use crate::{
    StartupSet,
    input::{PendingJump, PlayerAction, take_move_input},
    level,
    math::{to_color, to_point, to_quat, to_vec3, to_vector},
    settings::Settings,
    world::{ArtificialLight, LightIds, Moonlight, SceneWorld},
};

/// Rendered player; its pose trails the simulated body.
#[derive(Component)]
pub struct Player {
    pub controller: PlayerController,
    pub last_tick: Option<TickReport>,
}

/// Fire effect shown while the player stands in artificial light only.
#[derive(Component)]
pub struct Fire;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_player.in_set(StartupSet::Actors));
    // RemovedComponents only holds one frame of removals.
    app.add_systems(PreUpdate, sync_light_rig);
    app.add_systems(FixedUpdate, tick_player);
    app.add_systems(Update, (interpolate, apply_visuals));
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut light_ids: ResMut<LightIds>,
    mut exit: MessageWriter<AppExit>,
    scene: Option<Res<SceneWorld>>,
    settings: Res<Settings>,
    moonlights: Query<(Entity, &Transform, &PointLight), With<Moonlight>>,
    lamps: Query<(Entity, &Transform, &PointLight), With<ArtificialLight>>,
) {
    let Some(scene) = scene else {
        return;
    };

    let moon = light_sources(&moonlights, &mut light_ids);
    let artificial = light_sources(&lamps, &mut light_ids);

    let [r, g, b] = level::PLAYER_COLOR;
    let original_color = Rgba::from_srgb_u8(r, g, b);

    let controller = LightRig::new(moon, artificial).and_then(|rig| {
        PlayerController::new(
            settings.controller.clone(),
            rig,
            scene.ids_with_tag(SurfaceTag::Glass),
            PlayerBody::new(to_point(level::PLAYER_SPAWN)),
            original_color,
            &scene.0,
        )
    });
    let controller = match controller {
        Ok(controller) => controller,
        Err(err) => {
            error!("Cannot spawn player: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    let (radius, half_height) = (controller.body().radius, controller.body().half_height);
    commands
        .spawn((
            Player {
                controller,
                last_tick: None,
            },
            Mesh3d(meshes.add(Mesh::from(Capsule3d {
                radius,
                half_length: half_height - radius,
            }))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: to_color(original_color),
                ..default()
            })),
            Transform::from_translation(level::PLAYER_SPAWN),
        ))
        .with_children(|parent| {
            // Nose, so facing reads at a glance (+Z is forward).
            parent.spawn((
                Mesh3d(meshes.add(Mesh::from(Sphere { radius: 0.12 }))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 1.0, 1.0),
                    ..default()
                })),
                Transform::from_xyz(0.0, 0.4, radius),
            ));
        });

    commands.spawn((
        Fire,
        Mesh3d(meshes.add(Mesh::from(Sphere { radius: 0.35 }))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.45, 0.1),
            emissive: LinearRgba::rgb(8.0, 2.5, 0.4),
            ..default()
        })),
        Transform::from_translation(level::PLAYER_SPAWN),
        Visibility::Hidden,
    ));
}

fn light_sources<F: QueryFilter>(
    query: &Query<(Entity, &Transform, &PointLight), F>,
    light_ids: &mut LightIds,
) -> Vec<LightSource> {
    query
        .iter()
        .map(|(entity, transform, light)| {
            LightSource::new(
                light_ids.get_or_assign(entity),
                to_point(transform.translation),
                light.intensity,
            )
        })
        .collect()
}

/// Keep the light rig in step with lights that move or despawn.
fn sync_light_rig(
    mut player: Single<&mut Player>,
    light_ids: Res<LightIds>,
    moved: Query<
        (Entity, &GlobalTransform),
        (
            Changed<GlobalTransform>,
            Or<(With<Moonlight>, With<ArtificialLight>)>,
        ),
    >,
    mut removed: RemovedComponents<PointLight>,
) {
    let lights = player.controller.lights_mut();
    for (entity, transform) in &moved {
        if let Some(id) = light_ids.get(entity) {
            lights.set_position(id, to_point(transform.translation()));
        }
    }
    for entity in removed.read() {
        let Some(id) = light_ids.get(entity) else {
            continue;
        };
        if let Some(kind) = lights.remove(id) {
            warn!("{kind:?} light {id} removed from the player's light rig");
        }
    }
}

fn tick_player(
    time: Res<Time<Fixed>>,
    settings: Res<Settings>,
    actions: Res<ActionState<PlayerAction>>,
    mut pending_jump: ResMut<PendingJump>,
    camera: Query<&GlobalTransform, With<Camera3d>>,
    scene: Option<ResMut<SceneWorld>>,
    mut player: Single<&mut Player>,
) {
    let Some(mut scene) = scene else {
        return;
    };
    let camera = match camera.single() {
        Ok(camera) => CameraBasis::new(
            to_vector(camera.forward().as_vec3()),
            to_vector(camera.right().as_vec3()),
        ),
        Err(_) => CameraBasis::looking_along_z(),
    };

    let input = take_move_input(&actions, &mut pending_jump);
    let report = player.controller.fixed_tick(
        &mut scene.0,
        &input,
        &camera,
        settings.simulation.gravity_mps2,
        time.delta_secs(),
    );
    player.last_tick = Some(report);
}

fn interpolate(time: Res<Time>, mut player: Query<(&mut Transform, &Player)>) {
    let delta_time = time.delta_secs();
    for (mut transform, player) in &mut player {
        let body = player.controller.body();
        transform
            .translation
            .smooth_nudge(&to_vec3(&body.position), 18.0, delta_time);
        transform.rotation = transform
            .rotation
            .slerp(to_quat(&body.rotation), 1.0 - (-18.0 * 5. * delta_time).exp());
    }
}

fn apply_visuals(
    player: Query<(&Player, &MeshMaterial3d<StandardMaterial>)>,
    mut fire: Query<(&mut Transform, &mut Visibility), With<Fire>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok((player, material)) = player.single() else {
        return;
    };
    let visuals = player.controller.visuals();

    if let Some(material) = materials.get_mut(&material.0) {
        let color = to_color(visuals.color);
        if material.base_color != color {
            material.base_color = color;
        }
    }

    for (mut transform, mut visibility) in &mut fire {
        match visuals.fire_position {
            Some(position) if visuals.fire_active => {
                transform.translation = to_vec3(&position);
                visibility.set_if_neq(Visibility::Inherited);
            }
            _ => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
