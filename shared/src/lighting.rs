//! Light exposure classification and its gameplay side effects.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, ControllerSettings, ForceMode, PlayerBody, Rgba, SceneQueries,
};

/// Stable identifier of a light source.
pub type LightId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Moonlight,
    Artificial,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub id: LightId,
    pub position: Point3<f32>,
    pub intensity: f32,
}

impl LightSource {
    pub fn new(id: LightId, position: Point3<f32>, intensity: f32) -> Self {
        Self {
            id,
            position,
            intensity,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidLight {
                id: self.id,
                reason: "position must be finite".into(),
            });
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(ConfigError::InvalidLight {
                id: self.id,
                reason: format!("intensity must be finite and non-negative (got {})", self.intensity),
            });
        }
        Ok(())
    }
}

/// The two ordered light lists the player is classified against.
///
/// Built once when the scene loads; list order only affects how early a visibility
/// test can stop, never its answer.
#[derive(Clone, Debug, Default)]
pub struct LightRig {
    moonlight: Vec<LightSource>,
    artificial: Vec<LightSource>,
}

impl LightRig {
    /// Validates every light and rejects ids used more than once across both lists.
    pub fn new(
        moonlight: Vec<LightSource>,
        artificial: Vec<LightSource>,
    ) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for light in moonlight.iter().chain(artificial.iter()) {
            light.validate()?;
            if !seen.insert(light.id) {
                return Err(ConfigError::DuplicateLight(light.id));
            }
        }
        Ok(Self {
            moonlight,
            artificial,
        })
    }

    pub fn moonlight(&self) -> &[LightSource] {
        &self.moonlight
    }

    pub fn artificial(&self) -> &[LightSource] {
        &self.artificial
    }

    pub fn lights(&self, kind: LightKind) -> &[LightSource] {
        match kind {
            LightKind::Moonlight => &self.moonlight,
            LightKind::Artificial => &self.artificial,
        }
    }

    /// Drop a light that left the scene. Returns the kind it belonged to, if found.
    pub fn remove(&mut self, id: LightId) -> Option<LightKind> {
        if let Some(idx) = self.moonlight.iter().position(|l| l.id == id) {
            self.moonlight.remove(idx);
            return Some(LightKind::Moonlight);
        }
        if let Some(idx) = self.artificial.iter().position(|l| l.id == id) {
            self.artificial.remove(idx);
            return Some(LightKind::Artificial);
        }
        None
    }

    /// Move an existing light. Returns false if the id is unknown.
    pub fn set_position(&mut self, id: LightId, position: Point3<f32>) -> bool {
        match self
            .moonlight
            .iter_mut()
            .chain(self.artificial.iter_mut())
            .find(|l| l.id == id)
        {
            Some(light) if position.iter().all(|v| v.is_finite()) => {
                light.position = position;
                true
            }
            _ => false,
        }
    }
}

/// Which light sets can currently see the player. Both may be true, both may be false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Exposure {
    pub in_moonlight: bool,
    pub in_artificial_light: bool,
}

/// Tints used to recolor the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TintPalette {
    pub moonlight: Rgba,
    pub artificial: Rgba,
}

impl Exposure {
    /// Moonlight wins over artificial light, which wins over no light.
    pub fn tint(&self, palette: &TintPalette, original: Rgba) -> Rgba {
        if self.in_moonlight {
            palette.moonlight
        } else if self.in_artificial_light {
            palette.artificial
        } else {
            original
        }
    }

    /// The player catches fire under artificial light unless moonlight also reaches it.
    pub fn fire_active(&self) -> bool {
        self.in_artificial_light && !self.in_moonlight
    }

    /// Glass is solid everywhere except in moonlight.
    pub fn glass_solid(&self) -> bool {
        !self.in_moonlight
    }
}

/// True if any light in `lights` has an unobstructed line to `from`.
///
/// Stops at the first visible light.
pub fn any_light_visible(
    scene: &impl SceneQueries,
    from: &Point3<f32>,
    lights: &[LightSource],
) -> bool {
    lights
        .iter()
        .any(|light| !scene.segment_blocked(from, &light.position))
}

/// Classify exposure from current geometry only; there is no memory of earlier ticks.
pub fn classify_exposure(
    scene: &impl SceneQueries,
    position: &Point3<f32>,
    rig: &LightRig,
) -> Exposure {
    Exposure {
        in_moonlight: any_light_visible(scene, position, rig.moonlight()),
        in_artificial_light: any_light_visible(scene, position, rig.artificial()),
    }
}

/// Moonlight buoys the player up; shadow pulls it down harder than gravity alone.
pub fn apply_light_forces(
    body: &mut PlayerBody,
    scene: &impl SceneQueries,
    exposure: &Exposure,
    settings: &ControllerSettings,
) {
    body.mass = settings.mass;

    if !exposure.in_moonlight {
        body.add_force(
            Vector3::new(0.0, -settings.shadow_gravity_force, 0.0),
            ForceMode::Force,
        );
        return;
    }

    body.add_force(
        Vector3::new(0.0, settings.moonlight_lift_accel, 0.0),
        ForceMode::Acceleration,
    );
    let near_ground = scene
        .cast_ray(
            &body.position,
            &-Vector3::y(),
            settings.moonlight_ground_probe_distance,
        )
        .is_some();
    if near_ground {
        body.add_force(
            Vector3::new(0.0, settings.moonlight_nudge_impulse, 0.0),
            ForceMode::Impulse,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        SceneQueryWorld, WorldStaticDef,
        constants::{ARTIFICIAL_LIGHT_TINT, MOONLIGHT_TINT},
    };
    use approx::assert_relative_eq;

    /// Ground plus one wall between x = 4 and x = 6.
    fn occluded_world() -> SceneQueryWorld {
        SceneQueryWorld::build(vec![
            WorldStaticDef::ground_plane(1, 0.0),
            WorldStaticDef::cuboid(2, [5.0, 5.0, 0.0], [1.0, 5.0, 10.0]),
        ])
        .expect("valid world")
    }

    fn player_pos() -> Point3<f32> {
        Point3::new(0.0, 1.0, 0.0)
    }

    fn open_light(id: LightId) -> LightSource {
        LightSource::new(id, Point3::new(-5.0, 6.0, 0.0), 1.0)
    }

    fn hidden_light(id: LightId) -> LightSource {
        LightSource::new(id, Point3::new(10.0, 3.0, 0.0), 1.0)
    }

    fn palette() -> TintPalette {
        TintPalette {
            moonlight: MOONLIGHT_TINT,
            artificial: ARTIFICIAL_LIGHT_TINT,
        }
    }

    #[test]
    fn any_unobstructed_moonlight_marks_player_lit() {
        let world = occluded_world();
        let rig = LightRig::new(vec![hidden_light(1), open_light(2)], vec![]).unwrap();
        let exposure = classify_exposure(&world, &player_pos(), &rig);
        assert!(exposure.in_moonlight);
        assert!(!exposure.in_artificial_light);
    }

    #[test]
    fn all_obstructed_or_empty_lists_are_dark() {
        let world = occluded_world();
        let rig = LightRig::new(vec![hidden_light(1), hidden_light(2)], vec![]).unwrap();
        assert_eq!(classify_exposure(&world, &player_pos(), &rig), Exposure::default());

        let empty = LightRig::default();
        assert_eq!(classify_exposure(&world, &player_pos(), &empty), Exposure::default());
    }

    #[test]
    fn classification_has_no_memory() {
        let world = occluded_world();
        let rig = LightRig::new(vec![open_light(1)], vec![hidden_light(2), open_light(3)]).unwrap();
        let first = classify_exposure(&world, &player_pos(), &rig);
        for _ in 0..5 {
            assert_eq!(classify_exposure(&world, &player_pos(), &rig), first);
        }

        // Moving into shadow and back yields the same answer as before.
        let shadowed = Point3::new(8.0, 1.0, 0.0);
        let _ = classify_exposure(&world, &shadowed, &rig);
        assert_eq!(classify_exposure(&world, &player_pos(), &rig), first);
    }

    #[test]
    fn list_order_does_not_change_the_answer() {
        let world = occluded_world();
        let a = LightRig::new(vec![hidden_light(1), open_light(2)], vec![]).unwrap();
        let b = LightRig::new(vec![open_light(2), hidden_light(1)], vec![]).unwrap();
        assert_eq!(
            classify_exposure(&world, &player_pos(), &a),
            classify_exposure(&world, &player_pos(), &b)
        );
    }

    #[test]
    fn light_at_player_position_counts_as_visible() {
        let world = occluded_world();
        let lights = [LightSource::new(1, player_pos(), 1.0)];
        assert!(any_light_visible(&world, &player_pos(), &lights));
    }

    #[test]
    fn tint_priority_over_all_combinations() {
        let original = Rgba::from_srgb_u8(10, 20, 30);
        let cases = [
            (false, false, original),
            (false, true, ARTIFICIAL_LIGHT_TINT),
            (true, false, MOONLIGHT_TINT),
            (true, true, MOONLIGHT_TINT),
        ];
        for (moon, artificial, expected) in cases {
            let exposure = Exposure {
                in_moonlight: moon,
                in_artificial_light: artificial,
            };
            assert_eq!(exposure.tint(&palette(), original), expected);
        }
    }

    #[test]
    fn fire_only_in_artificial_light_without_moonlight() {
        for (moon, artificial) in [(false, false), (false, true), (true, false), (true, true)] {
            let exposure = Exposure {
                in_moonlight: moon,
                in_artificial_light: artificial,
            };
            assert_eq!(exposure.fire_active(), artificial && !moon);
            assert_eq!(exposure.glass_solid(), !moon);
        }
    }

    #[test]
    fn shadow_applies_extra_downward_force() {
        let world = SceneQueryWorld::build(vec![]).expect("empty world");
        let settings = ControllerSettings::default();
        let mut body = PlayerBody::new(Point3::new(0.0, 3.0, 0.0));
        body.use_gravity = false;
        body.mass = 7.0;

        apply_light_forces(&mut body, &world, &Exposure::default(), &settings);
        assert_relative_eq!(body.mass, settings.mass);

        body.step(&world, 0.0, 1.0);
        assert_relative_eq!(body.velocity.y, -settings.shadow_gravity_force, epsilon = 1.0e-4);
    }

    #[test]
    fn moonlight_near_ground_lifts_and_nudges() {
        let world = occluded_world();
        let settings = ControllerSettings::default();
        let lit = Exposure {
            in_moonlight: true,
            in_artificial_light: false,
        };

        let mut grounded = PlayerBody::new(Point3::new(0.0, 1.0, 0.0));
        apply_light_forces(&mut grounded, &world, &lit, &settings);
        assert_relative_eq!(grounded.velocity.y, settings.moonlight_nudge_impulse);

        // Far above the ground only the lift acceleration applies.
        let mut airborne = PlayerBody::new(Point3::new(0.0, 5.0, 0.0));
        apply_light_forces(&mut airborne, &world, &lit, &settings);
        assert_relative_eq!(airborne.velocity.y, 0.0);
    }

    #[test]
    fn rig_rejects_bad_lights() {
        let dup = LightRig::new(vec![open_light(1)], vec![hidden_light(1)]);
        assert!(matches!(dup, Err(ConfigError::DuplicateLight(1))));

        let negative = LightRig::new(vec![LightSource::new(4, Point3::origin(), -1.0)], vec![]);
        assert!(matches!(negative, Err(ConfigError::InvalidLight { id: 4, .. })));
    }

    #[test]
    fn removed_lights_stop_contributing() {
        let world = occluded_world();
        let mut rig = LightRig::new(vec![open_light(1)], vec![]).unwrap();
        assert_eq!(rig.remove(1), Some(LightKind::Moonlight));
        assert_eq!(rig.remove(1), None);
        assert!(!classify_exposure(&world, &player_pos(), &rig).in_moonlight);
    }
}
