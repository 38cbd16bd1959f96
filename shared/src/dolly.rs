//! Camera dolly: a cart running along a waypoint track while the player is inside a
//! threshold volume, reversing each time the player leaves.

use nalgebra::Point3;

use crate::{ActorTag, ConfigError, DollySettings, constants::DIST_EPS, trigger::TriggerEvent};

/// Polyline rail the cart runs on, parameterized by distance from the first waypoint.
#[derive(Clone, Debug)]
pub struct DollyTrack {
    waypoints: Vec<Point3<f32>>,
    /// `cumulative[i]` is the arc length from waypoint 0 to waypoint `i`.
    cumulative: Vec<f32>,
    looped: bool,
}

impl DollyTrack {
    /// A looped track gets an implicit closing segment from the last waypoint back to
    /// the first.
    pub fn new(waypoints: Vec<Point3<f32>>, looped: bool) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::InvalidTrack(format!(
                "needs at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        if !waypoints.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(ConfigError::InvalidTrack("waypoints must be finite".into()));
        }

        let mut points = waypoints.clone();
        if looped {
            points.push(waypoints[0]);
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in points.windows(2) {
            total += (pair[1] - pair[0]).norm();
            cumulative.push(total);
        }
        if total <= DIST_EPS {
            return Err(ConfigError::InvalidTrack("track has zero length".into()));
        }

        Ok(Self {
            waypoints: points,
            cumulative,
            looped,
        })
    }

    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Map any distance onto the track: wrapped for looped tracks, clamped otherwise.
    pub fn standardize(&self, distance: f32) -> f32 {
        let length = self.length();
        if self.looped {
            distance.rem_euclid(length)
        } else {
            distance.clamp(0.0, length)
        }
    }

    /// World position at `distance` along the track.
    pub fn evaluate(&self, distance: f32) -> Point3<f32> {
        let d = self.standardize(distance);
        // First segment whose end lies at or beyond `d`.
        let seg = self
            .cumulative
            .iter()
            .skip(1)
            .position(|&end| end >= d)
            .unwrap_or(self.cumulative.len() - 2);

        let start = self.cumulative[seg];
        let span = self.cumulative[seg + 1] - start;
        let t = if span > DIST_EPS { (d - start) / span } else { 0.0 };
        let a = self.waypoints[seg];
        let b = self.waypoints[seg + 1];
        a + (b - a) * t
    }
}

#[derive(Clone, Debug)]
pub struct DollyCart {
    track: DollyTrack,
    /// Distance along the track.
    position: f32,
    speed: f32,
    moving_forward: bool,
    player_in_threshold: bool,
}

impl DollyCart {
    pub fn new(track: DollyTrack, settings: &DollySettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            track,
            position: 0.0,
            speed: settings.speed,
            moving_forward: settings.start_forward,
            player_in_threshold: false,
        })
    }

    /// Advance while the player is present, in the current direction.
    pub fn update(&mut self, dt: f32) {
        if !self.player_in_threshold {
            return;
        }
        let step = self.speed * dt.max(0.0);
        let next = if self.moving_forward {
            self.position + step
        } else {
            self.position - step
        };
        self.position = self.track.standardize(next);
    }

    pub fn reverse_direction(&mut self) {
        self.moving_forward = !self.moving_forward;
    }

    pub fn on_trigger_enter(&mut self, tag: ActorTag) {
        if tag == ActorTag::Player {
            self.player_in_threshold = true;
        }
    }

    /// Leaving clears presence and flips direction exactly once.
    pub fn on_trigger_exit(&mut self, tag: ActorTag) {
        if tag == ActorTag::Player {
            self.player_in_threshold = false;
            self.reverse_direction();
            log::debug!(
                "Player left dolly threshold, cart now moving {}",
                if self.moving_forward { "forward" } else { "backward" }
            );
        }
    }

    pub fn handle(&mut self, event: TriggerEvent) {
        match event {
            TriggerEvent::Enter(tag) => self.on_trigger_enter(tag),
            TriggerEvent::Exit(tag) => self.on_trigger_exit(tag),
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Jump to a track distance (standardized).
    pub fn set_position(&mut self, distance: f32) {
        self.position = self.track.standardize(distance);
    }

    pub fn is_moving_forward(&self) -> bool {
        self.moving_forward
    }

    pub fn player_in_threshold(&self) -> bool {
        self.player_in_threshold
    }

    pub fn track(&self) -> &DollyTrack {
        &self.track
    }

    /// World position of the cart.
    pub fn world_position(&self) -> Point3<f32> {
        self.track.evaluate(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_track() -> DollyTrack {
        DollyTrack::new(
            vec![
                Point3::new(0.0, 5.0, 0.0),
                Point3::new(10.0, 5.0, 0.0),
                Point3::new(10.0, 5.0, 10.0),
            ],
            false,
        )
        .unwrap()
    }

    fn cart() -> DollyCart {
        let mut cart = DollyCart::new(straight_track(), &DollySettings::default()).unwrap();
        cart.set_position(5.0);
        cart
    }

    #[test]
    fn track_length_and_evaluation() {
        let track = straight_track();
        assert_relative_eq!(track.length(), 20.0);
        assert_relative_eq!(track.evaluate(5.0), Point3::new(5.0, 5.0, 0.0));
        assert_relative_eq!(track.evaluate(15.0), Point3::new(10.0, 5.0, 5.0));
        assert_relative_eq!(track.evaluate(-3.0), Point3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(track.evaluate(99.0), Point3::new(10.0, 5.0, 10.0));
    }

    #[test]
    fn looped_track_wraps() {
        let track = DollyTrack::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0)],
            true,
        )
        .unwrap();
        assert_relative_eq!(track.length(), 8.0);
        assert_relative_eq!(track.standardize(9.0), 1.0);
        assert_relative_eq!(track.standardize(-1.0), 7.0);
        assert_relative_eq!(track.evaluate(6.0), Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn degenerate_tracks_are_rejected() {
        assert!(DollyTrack::new(vec![Point3::origin()], false).is_err());
        assert!(DollyTrack::new(vec![Point3::origin(), Point3::origin()], false).is_err());
    }

    #[test]
    fn cart_only_moves_while_player_is_present() {
        let mut cart = cart();
        cart.update(1.0);
        assert_relative_eq!(cart.position(), 5.0);

        cart.on_trigger_enter(ActorTag::Player);
        cart.update(0.5);
        assert_relative_eq!(cart.position(), 5.0 + DollySettings::default().speed * 0.5);
    }

    #[test]
    fn direction_flips_once_per_exit_and_never_on_enter() {
        let mut cart = cart();
        assert!(cart.is_moving_forward());

        cart.on_trigger_enter(ActorTag::Player);
        cart.on_trigger_enter(ActorTag::Player);
        assert!(cart.is_moving_forward());

        cart.on_trigger_exit(ActorTag::Player);
        assert!(!cart.is_moving_forward());
        assert!(!cart.player_in_threshold());

        cart.on_trigger_enter(ActorTag::Player);
        cart.on_trigger_exit(ActorTag::Player);
        assert!(cart.is_moving_forward());
    }

    #[test]
    fn non_player_actors_are_ignored() {
        let mut cart = cart();
        cart.handle(TriggerEvent::Enter(ActorTag::Other));
        assert!(!cart.player_in_threshold());
        cart.handle(TriggerEvent::Exit(ActorTag::Other));
        assert!(cart.is_moving_forward());
    }

    #[test]
    fn enter_then_exit_scenario() {
        let mut cart = cart();
        let speed = DollySettings::default().speed;

        cart.handle(TriggerEvent::Enter(ActorTag::Player));
        cart.update(0.2);
        cart.update(0.2);
        assert_relative_eq!(cart.position(), 5.0 + speed * 0.4, epsilon = 1.0e-5);

        cart.handle(TriggerEvent::Exit(ActorTag::Player));
        assert!(!cart.is_moving_forward());
        let parked = cart.position();
        cart.update(1.0);
        assert_relative_eq!(cart.position(), parked);

        // Re-entering now runs the cart backward.
        cart.handle(TriggerEvent::Enter(ActorTag::Player));
        cart.update(0.2);
        assert_relative_eq!(cart.position(), parked - speed * 0.2, epsilon = 1.0e-5);
    }

    #[test]
    fn open_track_clamps_at_ends() {
        let mut cart = cart();
        cart.on_trigger_enter(ActorTag::Player);
        cart.update(100.0);
        assert_relative_eq!(cart.position(), 20.0);
        assert_relative_eq!(cart.world_position(), Point3::new(10.0, 5.0, 10.0));
    }
}
