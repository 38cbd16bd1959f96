use crate::color::Rgba;

/// Fixed simulation step in seconds (50 Hz).
pub const FIXED_TIMESTEP_SECS: f32 = 0.02;

/// Largest frame delta fed into the fixed-step accumulator.
///
/// A long hitch (debugger pause, window drag) would otherwise queue dozens of physics
/// ticks into a single frame.
pub const MAX_FRAME_DELTA_SECS: f32 = 0.25;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Planar walking speed (meters per second).
pub const MOVE_SPEED_MPS: f32 = 5.0;

/// Fraction of the way toward this tick's target position that is actually applied.
///
/// Convention:
/// - 1.0 = move the full `speed * dt` each tick
/// - small values = heavy smoothing, the player lags behind the input
pub const MOVE_SMOOTH_FACTOR: f32 = 0.125;

/// Facing slerp rate (per second) toward the movement heading.
pub const TURN_RATE: f32 = 5.0;

/// Speed along a climbable surface (meters per second).
pub const CLIMB_SPEED_MPS: f32 = 3.0;

/// Upward impulse applied by a jump (newton-seconds).
pub const JUMP_IMPULSE: f32 = 10.0;

/// Length of the forward probe looking for climbable surfaces (meters).
pub const CLIMB_PROBE_DISTANCE: f32 = 1.0;

/// Downward ground probe length out of moonlight (meters, from the body center).
pub const GROUND_PROBE_DISTANCE: f32 = 1.1;

/// Downward ground probe length while in moonlight (meters).
///
/// Longer than [`GROUND_PROBE_DISTANCE`] because moonlight lifts the player above its
/// normal resting height.
pub const MOONLIGHT_GROUND_PROBE_DISTANCE: f32 = 1.3;

/// Constant upward acceleration while in moonlight (m/s^2).
pub const MOONLIGHT_LIFT_ACCEL: f32 = 1.0;

/// Upward impulse applied every tick the player is in moonlight near the ground.
pub const MOONLIGHT_NUDGE_IMPULSE: f32 = 0.2;

/// Extra downward force applied whenever the player is out of moonlight (newtons).
pub const SHADOW_GRAVITY_FORCE: f32 = 9.81;

/// Player rigid-body mass (kilograms). Re-asserted every tick.
pub const PLAYER_MASS_KG: f32 = 1.0;

/// Distance from the player's center to its feet (meters).
pub const PLAYER_HALF_HEIGHT: f32 = 1.0;

/// Horizontal radius kept between the player's center and walls (meters).
pub const PLAYER_RADIUS: f32 = 0.5;

/// Tint applied while any moonlight source can see the player.
pub const MOONLIGHT_TINT: Rgba = Rgba::from_srgb_u8(158, 159, 248);

/// Tint applied while only artificial light can see the player.
pub const ARTIFICIAL_LIGHT_TINT: Rgba = Rgba::from_srgb_u8(255, 223, 128);

/// Dolly cart speed along its track (track distance units per second).
pub const DOLLY_SPEED: f32 = 5.0;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;
