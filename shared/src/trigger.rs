//! Trigger volumes with enter/exit edge detection.
//!
//! Hosts without physics trigger callbacks report where tagged actors are each frame;
//! the volume turns that into enter/exit events.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tag of an actor overlapping a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorTag {
    Player,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    Enter(ActorTag),
    Exit(ActorTag),
}

/// Axis-aligned trigger volume tracking whether the player is inside.
#[derive(Clone, Debug)]
pub struct ThresholdTrigger {
    min: Point3<f32>,
    max: Point3<f32>,
    player_inside: bool,
}

impl ThresholdTrigger {
    pub fn new(center: Point3<f32>, half_extents: [f32; 3]) -> Result<Self, ConfigError> {
        if !center.iter().all(|v| v.is_finite())
            || !half_extents.iter().all(|v| v.is_finite() && *v > 0.0)
        {
            return Err(ConfigError::InvalidSetting {
                name: "trigger.volume",
                reason: "center must be finite and half extents positive".into(),
            });
        }
        let h = nalgebra::Vector3::from(half_extents);
        Ok(Self {
            min: center - h,
            max: center + h,
            player_inside: false,
        })
    }

    pub fn contains(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Report an actor's position. Returns an event only when a player crosses the
    /// boundary; other actors never toggle the volume.
    pub fn observe(&mut self, tag: ActorTag, point: &Point3<f32>) -> Option<TriggerEvent> {
        if tag != ActorTag::Player {
            return None;
        }
        let inside = self.contains(point);
        if inside == self.player_inside {
            return None;
        }
        self.player_inside = inside;
        Some(if inside {
            TriggerEvent::Enter(tag)
        } else {
            TriggerEvent::Exit(tag)
        })
    }

    pub fn player_inside(&self) -> bool {
        self.player_inside
    }

    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        (self.min, self.max)
    }
}
