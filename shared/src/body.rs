//! Minimal rigid body for the player.
//!
//! Only what the controller needs: force modes, gravity toggle, a kinematic
//! `move_position` target, and collision against static scene geometry. Resolution is a
//! pair of ray probes (walls along the requested move, ground/ceiling along the
//! vertical velocity), not a general contact solver.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::{
    SceneQueries,
    constants::{DIST_EPS, PLAYER_HALF_HEIGHT, PLAYER_MASS_KG, PLAYER_RADIUS},
};

/// How a force passed to [`PlayerBody::add_force`] is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force (N), scaled by `1 / mass` and integrated over the step.
    Force,
    /// Continuous acceleration (m/s^2), mass ignored.
    Acceleration,
    /// Instant impulse (N·s), scaled by `1 / mass`.
    Impulse,
    /// Instant velocity change (m/s), mass ignored.
    VelocityChange,
}

#[derive(Clone, Debug)]
pub struct PlayerBody {
    pub position: Point3<f32>,
    /// Facing; local +Z is forward.
    pub rotation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    pub mass: f32,
    pub use_gravity: bool,
    /// Center-to-feet distance.
    pub half_height: f32,
    pub radius: f32,
    pending_move: Option<Point3<f32>>,
    accumulated_accel: Vector3<f32>,
}

impl PlayerBody {
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            mass: PLAYER_MASS_KG,
            use_gravity: true,
            half_height: PLAYER_HALF_HEIGHT,
            radius: PLAYER_RADIUS,
            pending_move: None,
            accumulated_accel: Vector3::zeros(),
        }
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    pub fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode) {
        let inv_mass = if self.mass > DIST_EPS {
            1.0 / self.mass
        } else {
            0.0
        };
        match mode {
            ForceMode::Force => self.accumulated_accel += force * inv_mass,
            ForceMode::Acceleration => self.accumulated_accel += force,
            ForceMode::Impulse => self.velocity += force * inv_mass,
            ForceMode::VelocityChange => self.velocity += force,
        }
    }

    /// Request a move to `target` during the next [`step`](Self::step).
    ///
    /// The move is swept against the scene, so walls stop it short instead of letting
    /// the body tunnel.
    pub fn move_position(&mut self, target: Point3<f32>) {
        self.pending_move = Some(target);
    }

    /// Pending kinematic target, if any.
    pub fn pending_move(&self) -> Option<Point3<f32>> {
        self.pending_move
    }

    /// Integrate one physics step.
    ///
    /// Order: gravity and accumulated forces into velocity (semi-implicit Euler), the
    /// swept kinematic move, then velocity into position with ground/ceiling clamping.
    pub fn step(&mut self, scene: &impl SceneQueries, gravity_mps2: f32, dt: f32) {
        let dt = dt.max(0.0);

        if self.use_gravity {
            self.velocity.y -= gravity_mps2 * dt;
        }
        self.velocity += self.accumulated_accel * dt;
        self.accumulated_accel = Vector3::zeros();

        let start = match self.pending_move.take() {
            Some(target) => self.sweep_move(scene, target),
            None => self.position,
        };

        let planar = Vector3::new(self.velocity.x, 0.0, self.velocity.z) * dt;
        let after_planar = if planar.norm_squared() > DIST_EPS * DIST_EPS {
            self.position = start;
            self.sweep_move(scene, start + planar)
        } else {
            start
        };

        self.position = self.resolve_vertical(scene, after_planar, self.velocity.y * dt);
    }

    /// Move from the current position toward `target`, stopping `radius` short of the
    /// first surface in the way.
    fn sweep_move(&self, scene: &impl SceneQueries, target: Point3<f32>) -> Point3<f32> {
        let start = self.position;
        let delta = target - start;
        let length = delta.norm();
        if length <= DIST_EPS {
            return start;
        }

        let dir = delta / length;
        match scene.cast_ray(&start, &dir, length + self.radius) {
            Some(hit) => start + dir * (hit.distance - self.radius).clamp(0.0, length),
            None => target,
        }
    }

    /// Apply a vertical displacement, landing on ground or stopping under ceilings.
    fn resolve_vertical(
        &mut self,
        scene: &impl SceneQueries,
        start: Point3<f32>,
        dy: f32,
    ) -> Point3<f32> {
        if dy <= 0.0 {
            // Probe from the start so a fast fall cannot skip through thin ground.
            let reach = self.half_height - dy;
            if let Some(hit) = scene.cast_ray(&start, &-Vector3::y(), reach) {
                let ground_y = start.y - hit.distance;
                let end_y = start.y + dy;
                if end_y - ground_y <= self.half_height {
                    if self.velocity.y < 0.0 {
                        self.velocity.y = 0.0;
                    }
                    return Point3::new(start.x, ground_y + self.half_height, start.z);
                }
            }
        } else if let Some(hit) = scene.cast_ray(&start, &Vector3::y(), self.half_height + dy) {
            let ceiling_y = start.y + hit.distance;
            self.velocity.y = 0.0;
            return Point3::new(start.x, (ceiling_y - self.half_height).min(start.y + dy), start.z);
        }

        Point3::new(start.x, start.y + dy, start.z)
    }
}
