use bevy::{platform::collections::HashMap, prelude::*};
use shared::{ColliderShapeDef, LightId, SceneQueryWorld, StaticId, SurfaceTag};

use crate::{StartupSet, level, math::quat_from_array};

/// Scene queries the player controller raycasts against.
#[derive(Resource, Deref, DerefMut)]
pub struct SceneWorld(pub SceneQueryWorld);

/// Glass pane whose collider the player controller toggles.
#[derive(Component, Debug)]
pub struct GlassPane {
    pub id: StaticId,
    pub solid_alpha: f32,
}

#[derive(Component, Debug)]
pub struct Moonlight;

#[derive(Component, Debug)]
pub struct ArtificialLight;

/// Stable light ids for light entities, shared by the player's light rig and the toon
/// light registry.
#[derive(Resource, Debug, Default)]
pub struct LightIds {
    ids: HashMap<Entity, LightId>,
    next: LightId,
}

impl LightIds {
    pub fn get_or_assign(&mut self, entity: Entity) -> LightId {
        *self.ids.entry(entity).or_insert_with(|| {
            self.next += 1;
            self.next
        })
    }

    pub fn get(&self, entity: Entity) -> Option<LightId> {
        self.ids.get(&entity).copied()
    }
}

const GLASS_PERMEABLE_ALPHA: f32 = 0.12;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<LightIds>();
    app.add_systems(Startup, setup.in_set(StartupSet::Level));
    app.add_systems(Update, sync_glass_panes);
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut exit: MessageWriter<AppExit>,
) {
    let pieces = level::statics();

    let scene = match SceneQueryWorld::build(pieces.iter().map(|p| p.def.clone()).collect()) {
        Ok(scene) => scene,
        Err(err) => {
            error!("Level statics are invalid: {err}");
            exit.write(AppExit::error());
            return;
        }
    };

    for piece in &pieces {
        let def = &piece.def;
        let translation = Vec3::from_array(def.translation);
        let rotation = quat_from_array(def.rotation);

        let mesh = match def.shape {
            ColliderShapeDef::Plane {
                offset_along_normal,
            } => meshes.add(
                Plane3d::default()
                    .mesh()
                    .size(80., 80.)
                    .build()
                    .translated_by(Vec3::Y * offset_along_normal),
            ),
            ColliderShapeDef::Cuboid { half_extents } => {
                let [x, y, z] = half_extents;
                meshes.add(Cuboid::new(x * 2.0, y * 2.0, z * 2.0))
            }
            ColliderShapeDef::Sphere { radius } => meshes.add(Sphere::new(radius)),
            ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => meshes.add(Cylinder::new(radius, half_height * 2.0)),
        };

        let glass = def.tag == SurfaceTag::Glass;
        let material = materials.add(StandardMaterial {
            base_color: piece.color,
            perceptual_roughness: if glass { 0.1 } else { 1.0 },
            metallic: 0.0,
            alpha_mode: if glass {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        });

        let mut entity = commands.spawn((
            Transform::from_translation(translation).with_rotation(rotation),
            Mesh3d(mesh),
            MeshMaterial3d(material),
        ));
        if glass {
            entity.insert(GlassPane {
                id: def.id,
                solid_alpha: piece.color.alpha(),
            });
        }
    }

    info!("Level built with {} statics", scene.len());
    commands.insert_resource(SceneWorld(scene));

    for position in level::MOONLIGHTS {
        commands.spawn((
            Moonlight,
            PointLight {
                color: Color::srgb_u8(190, 200, 255),
                intensity: 40_000_000.0,
                range: 120.0,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_translation(position),
        ));
    }

    for position in level::LAMPS {
        commands.spawn((
            ArtificialLight,
            PointLight {
                color: Color::srgb_u8(255, 200, 120),
                intensity: 200_000.0,
                range: 12.0,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_translation(position),
        ));
    }
}

/// Fade glass panes whose colliders are currently disabled.
fn sync_glass_panes(
    scene: Option<Res<SceneWorld>>,
    panes: Query<(&GlassPane, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(scene) = scene else {
        return;
    };
    for (pane, handle) in &panes {
        let Some(solid) = scene.is_enabled(pane.id) else {
            continue;
        };
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        let alpha = if solid { pane.solid_alpha } else { GLASS_PERMEABLE_ALPHA };
        if material.base_color.alpha() != alpha {
            material.base_color.set_alpha(alpha);
        }
    }
}
