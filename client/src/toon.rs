//! Toon-shaded props lit by a single synthetic light direction.
//!
//! Point lights are mirrored into a [`LightRegistry`] as they spawn, move, toggle or
//! despawn; every frame each toon object gets the intensity-weighted direction of the
//! active lights written into its material.

use bevy::{
    prelude::*, render::render_resource::AsBindGroup, shader::ShaderRef,
    transform::TransformSystems,
};
use shared::{LightRegistry, LightSource, ToonShading};

use crate::{
    FrameSet, StartupSet, level,
    math::{to_point, vec_to_vec3},
    world::LightIds,
};

const SHADER_ASSET_PATH: &str = "shaders/toon.wgsl";

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ToonMaterial {
    #[uniform(0)]
    pub base_color: LinearRgba,
    /// Light travel direction in `xyz`, `w` is always 0.
    #[uniform(1)]
    pub light_direction: Vec4,
}

impl Material for ToonMaterial {
    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }
}

#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct ToonLights(pub LightRegistry);

/// Shader parameters last computed for this object.
#[derive(Component, Debug, Default)]
pub struct ToonObject(pub ToonShading);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(MaterialPlugin::<ToonMaterial>::default());
    app.init_resource::<ToonLights>();
    app.add_systems(Startup, spawn_props.in_set(StartupSet::Actors));
    // Shade once before the first frame, then every frame.
    app.add_systems(
        PostStartup,
        (track_lights, refresh_toon)
            .chain()
            .after(TransformSystems::Propagate),
    );
    app.add_systems(
        Update,
        (track_lights, refresh_toon).chain().in_set(FrameSet::Toon),
    );
}

fn spawn_props(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ToonMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(0.75).mesh().uv(48, 24));
    for position in level::TOON_PROPS {
        commands.spawn((
            ToonObject::default(),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(materials.add(ToonMaterial {
                base_color: LinearRgba::rgb(0.85, 0.35, 0.3),
                light_direction: Vec4::ZERO,
            })),
            Transform::from_translation(position),
        ));
    }
}

/// Mirror point light changes into the registry.
fn track_lights(
    mut registry: ResMut<ToonLights>,
    mut light_ids: ResMut<LightIds>,
    changed: Query<
        (Entity, &GlobalTransform, &PointLight, &Visibility),
        Or<(
            Changed<PointLight>,
            Changed<GlobalTransform>,
            Changed<Visibility>,
        )>,
    >,
    mut removed: RemovedComponents<PointLight>,
) {
    for (entity, transform, light, visibility) in &changed {
        let id = light_ids.get_or_assign(entity);
        let source = LightSource::new(id, to_point(transform.translation()), light.intensity);
        if let Err(err) = registry.upsert(source) {
            warn!("Skipping light {entity}: {err}");
            continue;
        }
        registry.set_active(id, *visibility != Visibility::Hidden);
    }

    for entity in removed.read() {
        if let Some(id) = light_ids.get(entity) {
            registry.remove(id);
        }
    }
}

fn refresh_toon(
    registry: Res<ToonLights>,
    mut objects: Query<(&GlobalTransform, &mut ToonObject, &MeshMaterial3d<ToonMaterial>)>,
    mut materials: ResMut<Assets<ToonMaterial>>,
) {
    for (transform, mut object, handle) in &mut objects {
        object.0.refresh(&registry, &to_point(transform.translation()));
        let direction = vec_to_vec3(&object.0.light_direction()).extend(0.0);
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        if material.light_direction != direction {
            material.light_direction = direction;
        }
    }
}
