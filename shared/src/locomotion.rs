//! Grounded / climbing movement.
//!
//! Each function here is one step of the player's fixed tick; [`crate::PlayerController`]
//! calls them in order. They read input and scene queries and act on a [`PlayerBody`];
//! none of them keeps state of its own.

use nalgebra::{Point3, Vector3};

use crate::{
    ClimbExit, ControllerSettings, ForceMode, PlayerBody, SceneQueries, SurfaceTag,
    utils::{facing_rotation, lerp_point, normalize_or_zero, slerp_clamped, to_planar_unit},
};

/// Two-axis movement input plus the jump edge for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveInput {
    /// Strafe axis, -1 (left) to 1 (right).
    pub horizontal: f32,
    /// Forward axis, -1 (back) to 1 (forward).
    pub vertical: f32,
    /// Jump was pressed since the last tick consumed it.
    pub jump: bool,
}

impl MoveInput {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
            jump: false,
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Both axes exactly zero.
    pub fn is_idle(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }
}

/// Jump press seen by the frame loop, held until a fixed tick takes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JumpLatch(bool);

impl JumpLatch {
    pub fn press(&mut self) {
        self.0 = true;
    }

    pub fn is_pending(&self) -> bool {
        self.0
    }

    /// Clear the latch, returning whether a jump was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.0)
    }

    /// Tick input for `horizontal`/`vertical` with the latched jump taken out.
    pub fn input(&mut self, horizontal: f32, vertical: f32) -> MoveInput {
        MoveInput {
            horizontal,
            vertical,
            jump: self.take(),
        }
    }
}

/// Camera orientation movement is expressed relative to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
}

impl CameraBasis {
    pub fn new(forward: Vector3<f32>, right: Vector3<f32>) -> Self {
        Self { forward, right }
    }

    /// Forward along +Z with right along -X, i.e. a camera behind a player facing +Z in
    /// a right-handed, Y-up world.
    pub fn looking_along_z() -> Self {
        Self::new(Vector3::z(), -Vector3::x())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocomotionState {
    Grounded,
    /// Attached to a climbable surface with the given outward normal.
    Climbing { normal: Vector3<f32> },
}

impl LocomotionState {
    pub fn is_climbing(&self) -> bool {
        matches!(self, LocomotionState::Climbing { .. })
    }

    /// Climb surface normal; only exists while climbing.
    pub fn climb_normal(&self) -> Option<Vector3<f32>> {
        match self {
            LocomotionState::Climbing { normal } => Some(*normal),
            LocomotionState::Grounded => None,
        }
    }
}

/// Camera-relative planar heading for the input, unit length or zero.
pub fn planar_move_direction(input: &MoveInput, camera: &CameraBasis) -> Vector3<f32> {
    let forward = to_planar_unit(camera.forward);
    let right = to_planar_unit(camera.right);
    normalize_or_zero(forward * input.vertical + right * input.horizontal)
}

/// Smoothed walk toward the input heading, turning to face it.
pub fn grounded_step(
    body: &mut PlayerBody,
    input: &MoveInput,
    camera: &CameraBasis,
    settings: &ControllerSettings,
    dt: f32,
) {
    let dir = planar_move_direction(input, camera);
    let target = body.position + dir * settings.move_speed * dt;
    body.move_position(lerp_point(&body.position, &target, settings.smooth_factor));

    if let Some(target_rotation) = facing_rotation(&dir) {
        body.rotation = slerp_clamped(&body.rotation, &target_rotation, settings.turn_rate * dt);
    }
}

/// Forward probe: the normal of a climbable surface directly ahead, if any.
pub fn probe_climbable(
    scene: &impl SceneQueries,
    body: &PlayerBody,
    settings: &ControllerSettings,
) -> Option<Vector3<f32>> {
    scene
        .cast_ray(&body.position, &body.forward(), settings.climb_probe_distance)
        .filter(|hit| hit.tag == SurfaceTag::Climbable)
        .map(|hit| hit.normal)
}

/// Latch onto a surface: gravity off, residual velocity dropped.
pub fn enter_climb(body: &mut PlayerBody, normal: Vector3<f32>) -> LocomotionState {
    body.use_gravity = false;
    body.velocity = Vector3::zeros();
    log::debug!("Player started climbing (normal {normal:?})");
    LocomotionState::Climbing { normal }
}

/// Let go of the surface and restore gravity.
pub fn exit_climb(body: &mut PlayerBody) -> LocomotionState {
    body.use_gravity = true;
    log::debug!("Player stopped climbing");
    LocomotionState::Grounded
}

/// Movement basis on a surface: (right, up) built from the surface normal and world up.
///
/// Degenerates to zero vectors on horizontal surfaces.
pub fn climb_basis(normal: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let right = normalize_or_zero(Vector3::y().cross(normal));
    let up = normalize_or_zero(normal.cross(&right));
    (right, up)
}

/// Move along the climb surface, then decide whether the player stays attached.
pub fn climb_step(
    body: &mut PlayerBody,
    scene: &impl SceneQueries,
    normal: Vector3<f32>,
    input: &MoveInput,
    settings: &ControllerSettings,
    dt: f32,
) -> LocomotionState {
    let (right, up) = climb_basis(&normal);
    let movement = (right * input.horizontal + up * input.vertical) * settings.climb_speed * dt;
    body.move_position(Point3::from(body.position.coords + movement));

    match settings.climb_exit {
        ClimbExit::NoInput if input.is_idle() => exit_climb(body),
        ClimbExit::NoInput => LocomotionState::Climbing { normal },
        ClimbExit::NoSurface => match probe_climbable(scene, body, settings) {
            Some(normal) => LocomotionState::Climbing { normal },
            None => exit_climb(body),
        },
    }
}

/// Ground contact for jump eligibility; moonlight lengthens the probe.
pub fn probe_ground(
    scene: &impl SceneQueries,
    body: &PlayerBody,
    in_moonlight: bool,
    settings: &ControllerSettings,
) -> bool {
    scene
        .cast_ray(
            &body.position,
            &-Vector3::y(),
            ground_probe_length(in_moonlight, settings),
        )
        .is_some()
}

pub fn ground_probe_length(in_moonlight: bool, settings: &ControllerSettings) -> f32 {
    if in_moonlight {
        settings.moonlight_ground_probe_distance
    } else {
        settings.ground_probe_distance
    }
}

/// Apply the jump impulse if allowed. Returns whether the jump happened.
pub fn try_jump(
    body: &mut PlayerBody,
    input: &MoveInput,
    grounded: bool,
    settings: &ControllerSettings,
) -> bool {
    if !(input.jump && grounded) {
        return false;
    }
    body.add_force(Vector3::new(0.0, settings.jump_impulse, 0.0), ForceMode::Impulse);
    log::debug!("Player jumped from {:?}", body.position);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SceneQueryWorld, WorldStaticDef, constants::FIXED_TIMESTEP_SECS};
    use approx::assert_relative_eq;

    const DT: f32 = FIXED_TIMESTEP_SECS;

    /// Ground plus a climbable wall with its near face at z = 2.
    fn wall_world() -> SceneQueryWorld {
        SceneQueryWorld::build(vec![
            WorldStaticDef::ground_plane(1, 0.0),
            WorldStaticDef::cuboid(2, [0.0, 3.0, 2.5], [3.0, 3.0, 0.5])
                .with_tag(SurfaceTag::Climbable),
            WorldStaticDef::cuboid(3, [10.0, 3.0, 2.5], [3.0, 3.0, 0.5]),
        ])
        .expect("valid world")
    }

    #[test]
    fn move_direction_is_camera_relative_and_normalized() {
        let camera = CameraBasis::new(Vector3::new(0.0, -0.5, 1.0), Vector3::new(-1.0, 0.0, 0.0));
        let dir = planar_move_direction(&MoveInput::new(1.0, 1.0), &camera);
        let expected = Vector3::new(-1.0, 0.0, 1.0).normalize();
        assert_relative_eq!(dir, expected, epsilon = 1.0e-6);

        assert_eq!(
            planar_move_direction(&MoveInput::default(), &camera),
            Vector3::zeros()
        );
    }

    #[test]
    fn grounded_step_lerps_toward_target_and_turns() {
        let settings = ControllerSettings::default();
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 0.0));
        grounded_step(
            &mut body,
            &MoveInput::new(0.0, 1.0),
            &CameraBasis::looking_along_z(),
            &settings,
            DT,
        );

        let expected_z = settings.move_speed * DT * settings.smooth_factor;
        let target = body.pending_move().unwrap();
        assert_relative_eq!(target.z, expected_z, epsilon = 1.0e-6);
        assert_relative_eq!(target.x, 0.0);

        // Already facing +Z, so the rotation stays put.
        assert_relative_eq!(body.forward(), Vector3::z(), epsilon = 1.0e-5);
    }

    #[test]
    fn facing_turns_gradually() {
        let settings = ControllerSettings::default();
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 0.0));
        grounded_step(
            &mut body,
            &MoveInput::new(-1.0, 0.0),
            &CameraBasis::looking_along_z(),
            &settings,
            DT,
        );
        // Heading is +X; after one tick we have turned only part of the way.
        let angle = body.forward().angle(&Vector3::x());
        assert!(angle > 0.1 && angle < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn climbable_wall_within_probe_is_detected() {
        let world = wall_world();
        let settings = ControllerSettings::default();
        let body = PlayerBody::new(Point3::new(0.0, 1.0, 1.2));
        let normal = probe_climbable(&world, &body, &settings).expect("climbable");
        assert_relative_eq!(normal, -Vector3::z(), epsilon = 1.0e-4);
    }

    #[test]
    fn distant_or_untagged_walls_are_not_climbable() {
        let world = wall_world();
        let settings = ControllerSettings::default();

        let far = PlayerBody::new(Point3::new(0.0, 1.0, 0.5));
        assert!(probe_climbable(&world, &far, &settings).is_none());

        let untagged = PlayerBody::new(Point3::new(10.0, 1.0, 1.2));
        assert!(probe_climbable(&world, &untagged, &settings).is_none());
    }

    #[test]
    fn entering_and_leaving_climb_toggles_gravity() {
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 1.2));
        body.velocity = Vector3::new(1.0, 2.0, 3.0);
        let state = enter_climb(&mut body, -Vector3::z());
        assert!(state.is_climbing());
        assert!(!body.use_gravity);
        assert_eq!(body.velocity, Vector3::zeros());

        let state = exit_climb(&mut body);
        assert_eq!(state, LocomotionState::Grounded);
        assert!(body.use_gravity);
        assert!(state.climb_normal().is_none());
    }

    #[test]
    fn climb_basis_points_up_the_wall() {
        let (right, up) = climb_basis(&-Vector3::z());
        assert_relative_eq!(up, Vector3::y(), epsilon = 1.0e-6);
        assert_relative_eq!(right, -Vector3::x(), epsilon = 1.0e-6);
    }

    #[test]
    fn climb_step_moves_up_and_no_input_releases() {
        let world = wall_world();
        let settings = ControllerSettings::default();
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 1.2));
        let mut state = enter_climb(&mut body, -Vector3::z());

        let normal = state.climb_normal().unwrap();
        state = climb_step(&mut body, &world, normal, &MoveInput::new(0.0, 1.0), &settings, DT);
        assert!(state.is_climbing());
        let target = body.pending_move().unwrap();
        assert_relative_eq!(target.y, 1.0 + settings.climb_speed * DT, epsilon = 1.0e-6);

        state = climb_step(&mut body, &world, normal, &MoveInput::default(), &settings, DT);
        assert_eq!(state, LocomotionState::Grounded);
        assert!(body.use_gravity);
    }

    #[test]
    fn surface_exit_rule_ignores_idle_input_while_wall_remains() {
        let world = wall_world();
        let settings = ControllerSettings {
            climb_exit: ClimbExit::NoSurface,
            ..ControllerSettings::default()
        };
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 1.2));
        let normal = -Vector3::z();
        enter_climb(&mut body, normal);

        let state = climb_step(&mut body, &world, normal, &MoveInput::default(), &settings, DT);
        assert!(state.is_climbing());

        // Step back out of probe range: the wall is gone, so the player lets go.
        body.position.z = 0.0;
        let state = climb_step(&mut body, &world, normal, &MoveInput::default(), &settings, DT);
        assert_eq!(state, LocomotionState::Grounded);
        assert!(body.use_gravity);
    }

    #[test]
    fn ground_probe_length_depends_on_moonlight() {
        let world = wall_world();
        let settings = ControllerSettings::default();
        // Hovering 1.2 above the ground: only the longer moonlight probe reaches.
        let body = PlayerBody::new(Point3::new(0.0, 1.2, -3.0));
        assert!(!probe_ground(&world, &body, false, &settings));
        assert!(probe_ground(&world, &body, true, &settings));
        assert_eq!(ground_probe_length(true, &settings), settings.moonlight_ground_probe_distance);
        assert_eq!(ground_probe_length(false, &settings), settings.ground_probe_distance);
    }

    #[test]
    fn jump_requires_ground_and_edge() {
        let settings = ControllerSettings::default();
        let mut body = PlayerBody::new(Point3::new(0.0, 1.0, 0.0));

        assert!(!try_jump(&mut body, &MoveInput::default(), true, &settings));
        assert!(!try_jump(&mut body, &MoveInput::default().with_jump(), false, &settings));
        assert_eq!(body.velocity, Vector3::zeros());

        assert!(try_jump(&mut body, &MoveInput::default().with_jump(), true, &settings));
        assert_relative_eq!(body.velocity.y, settings.jump_impulse / body.mass);
    }

    #[test]
    fn jump_latch_is_cleared_by_the_tick_that_reads_it() {
        let mut latch = JumpLatch::default();
        assert!(!latch.input(0.0, 1.0).jump);

        latch.press();
        latch.press();
        assert!(latch.is_pending());
        let input = latch.input(0.5, -1.0);
        assert_eq!(input, MoveInput::new(0.5, -1.0).with_jump());
        assert!(!latch.is_pending());
        assert!(!latch.take());
    }
}
