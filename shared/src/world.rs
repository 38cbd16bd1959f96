//! Rapier-backed scene queries over immutable level geometry.
//!
//! The gameplay core never talks to a physics engine directly. It asks a
//! [`SceneQueries`] implementation three things: "what does this ray hit", "is this
//! segment blocked" and "switch this collider on/off". [`SceneQueryWorld`] answers them
//! from a set of static collider definitions built once at scene load.
//!
//! Conventions
//! - Units are meters, +Y is up.
//! - Every static carries a stable `id` and a [`SurfaceTag`]; both ride along in the
//!   collider's `user_data` so ray hits report them without a side lookup.
//! - Disabled colliders are invisible to every query.
//! - A ray ignores colliders that contain its origin.

use std::collections::HashMap;

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d::{parry::query::PointQuery, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, constants::DIST_EPS};

/// Stable identifier of a static collider.
pub type StaticId = u32;

/// Gameplay tag carried by static geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceTag {
    #[default]
    Untagged,
    /// The player can latch on and climb.
    Climbable,
    /// Solid out of moonlight, permeable inside it.
    Glass,
}

impl SurfaceTag {
    fn to_bits(self) -> u8 {
        match self {
            SurfaceTag::Untagged => 0,
            SurfaceTag::Climbable => 1,
            SurfaceTag::Glass => 2,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => SurfaceTag::Climbable,
            2 => SurfaceTag::Glass,
            _ => SurfaceTag::Untagged,
        }
    }
}

/// Nearest surface found by a ray cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub id: StaticId,
    pub tag: SurfaceTag,
    pub point: Point3<f32>,
    /// Outward surface normal at `point`.
    pub normal: Vector3<f32>,
    /// Distance from the ray origin (meters).
    pub distance: f32,
}

/// Scene services the gameplay core depends on.
pub trait SceneQueries {
    /// Nearest enabled surface along `dir` within `max_distance`.
    ///
    /// `dir` does not need to be normalized; a zero direction never hits.
    fn cast_ray(
        &self,
        origin: &Point3<f32>,
        dir: &Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit>;

    /// True when the straight segment `from -> to` crosses enabled geometry.
    ///
    /// A zero-length segment is never blocked.
    fn segment_blocked(&self, from: &Point3<f32>, to: &Point3<f32>) -> bool {
        let delta = to - from;
        let distance = delta.norm();
        if distance <= DIST_EPS {
            return false;
        }
        self.cast_ray(from, &(delta / distance), distance).is_some()
    }

    /// Tag of a static collider, or `None` if `id` is not part of the scene.
    fn surface_tag(&self, id: StaticId) -> Option<SurfaceTag>;

    /// Enable or disable a static collider. Returns false if `id` is unknown.
    fn set_collider_enabled(&mut self, id: StaticId, enabled: bool) -> bool;
}

/// Canonical, engine-agnostic definition of an immutable world collider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: StaticId,
    /// World-space translation.
    pub translation: [f32; 3],
    /// World-space rotation as a unit quaternion `[i, j, k, w]`.
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    pub shape: ColliderShapeDef,
    #[serde(default)]
    pub tag: SurfaceTag,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// Supported static collider shapes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) whose normal is the pose's local +Y.
    ///
    /// `offset_along_normal` shifts the plane from the pose origin.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: [f32; 3] },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

impl WorldStaticDef {
    pub fn cuboid(id: StaticId, translation: [f32; 3], half_extents: [f32; 3]) -> Self {
        Self {
            id,
            translation,
            rotation: identity_rotation(),
            shape: ColliderShapeDef::Cuboid { half_extents },
            tag: SurfaceTag::Untagged,
        }
    }

    pub fn ground_plane(id: StaticId, height: f32) -> Self {
        Self {
            id,
            translation: [0.0, height, 0.0],
            rotation: identity_rotation(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            tag: SurfaceTag::Untagged,
        }
    }

    pub fn with_tag(mut self, tag: SurfaceTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        let q = rotation.into_inner();
        self.rotation = [q.i, q.j, q.k, q.w];
        self
    }

    pub fn isometry(&self) -> Isometry3<f32> {
        let [i, j, k, w] = self.rotation;
        let rotation =
            UnitQuaternion::new_normalize(nalgebra::Quaternion::new(w, i, j, k));
        Isometry3::from_parts(Translation3::from(Vector3::from(self.translation)), rotation)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidStatic {
            id: self.id,
            reason: reason.to_string(),
        };

        if !self.translation.iter().all(|v| v.is_finite()) {
            return Err(invalid("translation must be finite"));
        }
        let q_norm_sq: f32 = self.rotation.iter().map(|v| v * v).sum();
        if !q_norm_sq.is_finite() || q_norm_sq <= DIST_EPS {
            return Err(invalid("rotation must be a finite, non-zero quaternion"));
        }

        let positive = |v: f32| v.is_finite() && v > 0.0;
        let ok = match &self.shape {
            ColliderShapeDef::Plane {
                offset_along_normal,
            } => offset_along_normal.is_finite(),
            ColliderShapeDef::Cuboid { half_extents } => half_extents.iter().all(|v| positive(*v)),
            ColliderShapeDef::Sphere { radius } => positive(*radius),
            ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => positive(*radius) && positive(*half_height),
        };
        if !ok {
            return Err(invalid("shape dimensions must be finite and positive"));
        }
        Ok(())
    }
}

/// In-memory Rapier structures needed for scene queries against a static world.
///
/// For immutable statics these are built once at scene load and reused; only the
/// per-collider enabled flag changes afterwards.
pub struct SceneQueryWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    handles: HashMap<StaticId, ColliderHandle>,
}

impl SceneQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// The input is sorted by `id` before insertion so identical inputs build identical
    /// sets. Duplicate ids and malformed shapes are rejected.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Result<Self, ConfigError> {
        defs.sort_by_key(|d| d.id);
        if let Some(pair) = defs.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(ConfigError::DuplicateStatic(pair[0].id));
        }

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut handles = HashMap::with_capacity(defs.len());

        for def in &defs {
            def.validate()?;

            let rb = RigidBodyBuilder::fixed().pose(def.isometry()).build();
            let rb_handle = bodies.insert(rb);

            let mut collider = collider_from_def(def);
            collider.user_data = encode_user_data(def.id, def.tag);
            let co_handle = colliders.insert_with_parent(collider, rb_handle, &mut bodies);
            handles.insert(def.id, co_handle);
        }

        // Collision detection only (no dynamics): updates the broad-phase BVH so
        // queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        let hooks = ();
        let events = ();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::info!("Built scene query world with {} statics", handles.len());

        Ok(Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            handles,
        })
    }

    /// Number of static colliders in the scene.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether a collider is currently enabled, or `None` if unknown.
    pub fn is_enabled(&self, id: StaticId) -> Option<bool> {
        let handle = self.handles.get(&id)?;
        self.colliders.get(*handle).map(|co| co.is_enabled())
    }

    /// Ids of every static carrying `tag`, in ascending order.
    pub fn ids_with_tag(&self, tag: SurfaceTag) -> Vec<StaticId> {
        let mut ids: Vec<StaticId> = self
            .handles
            .iter()
            .filter(|(_, handle)| {
                self.colliders
                    .get(**handle)
                    .is_some_and(|co| decode_user_data(co.user_data).1 == tag)
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl SceneQueries for SceneQueryWorld {
    fn cast_ray(
        &self,
        origin: &Point3<f32>,
        dir: &Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let dir = dir.try_normalize(DIST_EPS)?;
        if !(max_distance > 0.0) {
            return None;
        }

        let hittable = |_handle: ColliderHandle, co: &Collider| {
            co.is_enabled() && !co.shape().contains_point(co.position(), origin)
        };
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&hittable));

        let ray = Ray::new(*origin, dir);
        let (handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        let (id, tag) = decode_user_data(self.colliders.get(handle)?.user_data);

        Some(RayHit {
            id,
            tag,
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
            distance: hit.time_of_impact,
        })
    }

    fn surface_tag(&self, id: StaticId) -> Option<SurfaceTag> {
        let handle = self.handles.get(&id)?;
        self.colliders
            .get(*handle)
            .map(|co| decode_user_data(co.user_data).1)
    }

    fn set_collider_enabled(&mut self, id: StaticId, enabled: bool) -> bool {
        let Some(handle) = self.handles.get(&id) else {
            return false;
        };
        let Some(collider) = self.colliders.get_mut(*handle) else {
            return false;
        };
        if collider.is_enabled() != enabled {
            collider.set_enabled(enabled);
        }
        true
    }
}

fn encode_user_data(id: StaticId, tag: SurfaceTag) -> u128 {
    (id as u128) | ((tag.to_bits() as u128) << 32)
}

fn decode_user_data(data: u128) -> (StaticId, SurfaceTag) {
    let id = (data & u32::MAX as u128) as StaticId;
    let tag = SurfaceTag::from_bits(((data >> 32) & 0xff) as u8);
    (id, tag)
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// The collider is attached to a fixed rigid-body carrying the pose, so shapes are built
/// in the body's local frame.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => ColliderBuilder::halfspace(Vector::y_axis())
            .translation(Vector::y() * *offset_along_normal)
            .build(),

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents[0], half_extents[1], half_extents[2]).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius).build(),
    }
}
