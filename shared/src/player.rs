//! The player controller: one fixed tick of movement, light reaction and jumping.

use nalgebra::Point3;

use crate::{
    ConfigError, ControllerSettings, Exposure, LightRig, LocomotionState, MoveInput, PlayerBody,
    Rgba, SceneQueries, StaticId, SurfaceTag,
    lighting::{apply_light_forces, classify_exposure},
    locomotion::{
        CameraBasis, climb_step, enter_climb, grounded_step, probe_climbable, probe_ground,
        try_jump,
    },
};

/// Renderer-facing state produced by a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerVisuals {
    pub color: Rgba,
    pub fire_active: bool,
    /// Where the fire effect sits; tracks the player only while the fire is active.
    pub fire_position: Option<Point3<f32>>,
}

/// What happened during one [`PlayerController::fixed_tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub exposure: Exposure,
    pub state: LocomotionState,
    pub grounded: bool,
    pub jumped: bool,
    /// Ground probe length used this tick.
    pub ground_probe_length: f32,
    pub visuals: PlayerVisuals,
}

pub struct PlayerController {
    settings: ControllerSettings,
    lights: LightRig,
    glass: Vec<StaticId>,
    body: PlayerBody,
    state: LocomotionState,
    exposure: Exposure,
    grounded: bool,
    original_color: Rgba,
    visuals: PlayerVisuals,
}

impl PlayerController {
    /// Validate settings and every injected scene reference.
    ///
    /// `glass` must only name statics that exist in `scene` and are tagged
    /// [`SurfaceTag::Glass`].
    pub fn new(
        settings: ControllerSettings,
        lights: LightRig,
        glass: Vec<StaticId>,
        body: PlayerBody,
        original_color: Rgba,
        scene: &impl SceneQueries,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if !original_color.is_valid() {
            return Err(ConfigError::InvalidSetting {
                name: "player.original_color",
                reason: "color channels must be within 0.0..=1.0".into(),
            });
        }
        if !body.position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidSetting {
                name: "player.position",
                reason: "spawn position must be finite".into(),
            });
        }
        for &id in &glass {
            match scene.surface_tag(id) {
                None => return Err(ConfigError::UnknownStatic(id)),
                Some(SurfaceTag::Glass) => {}
                Some(tag) => return Err(ConfigError::NotGlass { id, tag }),
            }
        }

        log::info!(
            "Player controller ready: {} moonlight, {} artificial lights, {} glass colliders, {:?} climb exit",
            lights.moonlight().len(),
            lights.artificial().len(),
            glass.len(),
            settings.climb_exit,
        );

        Ok(Self {
            settings,
            lights,
            glass,
            body,
            state: LocomotionState::Grounded,
            exposure: Exposure::default(),
            grounded: false,
            original_color,
            visuals: PlayerVisuals {
                color: original_color,
                fire_active: false,
                fire_position: None,
            },
        })
    }

    /// Run one fixed tick followed by the body's physics step.
    ///
    /// Order matters: later steps read flags written by earlier ones in the same tick.
    /// 1. movement (walk or climb, including climb entry/exit)
    /// 2. exposure classification and light forces
    /// 3. visuals: color, fire, glass colliders
    /// 4. ground probe
    /// 5. jump
    pub fn fixed_tick(
        &mut self,
        scene: &mut impl SceneQueries,
        input: &MoveInput,
        camera: &CameraBasis,
        gravity_mps2: f32,
        dt: f32,
    ) -> TickReport {
        self.move_player(scene, input, camera, dt);

        let exposure = classify_exposure(scene, &self.body.position, &self.lights);
        if exposure != self.exposure {
            log::debug!("Player exposure changed: {:?} -> {:?}", self.exposure, exposure);
        }
        self.exposure = exposure;
        apply_light_forces(&mut self.body, scene, &exposure, &self.settings);

        self.update_visuals();
        self.update_glass(scene);

        self.grounded = probe_ground(scene, &self.body, exposure.in_moonlight, &self.settings);
        let jumped = try_jump(&mut self.body, input, self.grounded, &self.settings);

        self.body.step(scene, gravity_mps2, dt);

        TickReport {
            exposure,
            state: self.state,
            grounded: self.grounded,
            jumped,
            ground_probe_length: crate::locomotion::ground_probe_length(
                exposure.in_moonlight,
                &self.settings,
            ),
            visuals: self.visuals,
        }
    }

    fn move_player(
        &mut self,
        scene: &impl SceneQueries,
        input: &MoveInput,
        camera: &CameraBasis,
        dt: f32,
    ) {
        match self.state {
            LocomotionState::Climbing { normal } => {
                self.state = climb_step(&mut self.body, scene, normal, input, &self.settings, dt);
            }
            LocomotionState::Grounded => {
                grounded_step(&mut self.body, input, camera, &self.settings, dt);
                if let Some(normal) = probe_climbable(scene, &self.body, &self.settings) {
                    self.state = enter_climb(&mut self.body, normal);
                }
            }
        }
    }

    fn update_visuals(&mut self) {
        let fire_active = self.exposure.fire_active();
        self.visuals = PlayerVisuals {
            color: self.exposure.tint(&self.settings.tints, self.original_color),
            fire_active,
            fire_position: fire_active.then_some(self.body.position),
        };
    }

    fn update_glass(&self, scene: &mut impl SceneQueries) {
        if !self.settings.glass_permeability {
            return;
        }
        let solid = self.exposure.glass_solid();
        for &id in &self.glass {
            scene.set_collider_enabled(id, solid);
        }
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    /// Direct body access for hosts that teleport or respawn the player.
    pub fn body_mut(&mut self) -> &mut PlayerBody {
        &mut self.body
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn visuals(&self) -> PlayerVisuals {
        self.visuals
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Light rig access for hosts whose lights move or despawn.
    pub fn lights_mut(&mut self) -> &mut LightRig {
        &mut self.lights
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Force the player off any surface it is climbing.
    pub fn reset_locomotion(&mut self) {
        if self.state.is_climbing() {
            self.state = crate::locomotion::exit_climb(&mut self.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ControllerVariant, LightSource, SceneQueryWorld, WorldStaticDef,
        constants::{FIXED_TIMESTEP_SECS, GRAVITY_MPS2, MOONLIGHT_TINT},
    };

    const DT: f32 = FIXED_TIMESTEP_SECS;

    fn world() -> SceneQueryWorld {
        SceneQueryWorld::build(vec![
            WorldStaticDef::ground_plane(1, 0.0),
            // Roof over x in [8, 12] shading that strip from the sky.
            WorldStaticDef::cuboid(2, [10.0, 4.0, 0.0], [2.0, 0.2, 20.0]),
            WorldStaticDef::cuboid(3, [-10.0, 1.0, 0.0], [0.1, 1.0, 2.0]).with_tag(SurfaceTag::Glass),
            WorldStaticDef::cuboid(4, [0.0, 3.0, 2.5], [3.0, 3.0, 0.5]).with_tag(SurfaceTag::Climbable),
        ])
        .expect("valid world")
    }

    fn moon() -> LightSource {
        LightSource::new(10, Point3::new(0.0, 30.0, -5.0), 1.0)
    }

    fn lamp() -> LightSource {
        // Under the roof.
        LightSource::new(20, Point3::new(10.0, 3.0, -4.0), 1.0)
    }

    fn controller(
        scene: &SceneQueryWorld,
        variant: ControllerVariant,
        spawn: Point3<f32>,
    ) -> PlayerController {
        PlayerController::new(
            ControllerSettings::for_variant(variant),
            LightRig::new(vec![moon()], vec![lamp()]).unwrap(),
            vec![3],
            PlayerBody::new(spawn),
            Rgba::from_srgb_u8(200, 200, 200),
            scene,
        )
        .expect("valid controller")
    }

    fn tick(
        player: &mut PlayerController,
        scene: &mut SceneQueryWorld,
        input: MoveInput,
    ) -> TickReport {
        player.fixed_tick(scene, &input, &CameraBasis::looking_along_z(), GRAVITY_MPS2, DT)
    }

    #[test]
    fn rejects_unknown_or_mistagged_glass() {
        let scene = world();
        let build = |glass: Vec<StaticId>| {
            PlayerController::new(
                ControllerSettings::default(),
                LightRig::default(),
                glass,
                PlayerBody::new(Point3::new(0.0, 1.0, 0.0)),
                Rgba::WHITE,
                &scene,
            )
        };
        assert!(matches!(build(vec![99]), Err(ConfigError::UnknownStatic(99))));
        assert!(matches!(
            build(vec![2]),
            Err(ConfigError::NotGlass {
                id: 2,
                tag: SurfaceTag::Untagged
            })
        ));
        assert!(build(vec![3]).is_ok());
    }

    #[test]
    fn rejects_invalid_settings() {
        let scene = world();
        let settings = ControllerSettings {
            move_speed: f32::NAN,
            ..ControllerSettings::default()
        };
        let result = PlayerController::new(
            settings,
            LightRig::default(),
            vec![],
            PlayerBody::new(Point3::new(0.0, 1.0, 0.0)),
            Rgba::WHITE,
            &scene,
        );
        assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
    }

    #[test]
    fn under_open_sky_player_is_moonlit() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::Canonical, Point3::new(0.0, 1.0, -5.0));
        let report = tick(&mut player, &mut scene, MoveInput::default());
        assert!(report.exposure.in_moonlight);
        assert_eq!(report.visuals.color, MOONLIGHT_TINT);
        assert!(!report.visuals.fire_active);
        assert_eq!(report.ground_probe_length, player.settings().moonlight_ground_probe_distance);
    }

    #[test]
    fn under_the_roof_next_to_a_lamp_the_player_burns() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::Canonical, Point3::new(10.0, 1.0, -5.0));
        let report = tick(&mut player, &mut scene, MoveInput::default());
        assert!(!report.exposure.in_moonlight);
        assert!(report.exposure.in_artificial_light);
        assert_eq!(report.visuals.color, player.settings().tints.artificial);
        assert!(report.visuals.fire_active);
        assert!(report.visuals.fire_position.is_some());
        assert!(report.grounded);
        assert_eq!(report.ground_probe_length, player.settings().ground_probe_distance);
    }

    #[test]
    fn glass_follows_moonlight_only_in_permeable_variant() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::GlassPermeable, Point3::new(0.0, 1.0, -5.0));
        tick(&mut player, &mut scene, MoveInput::default());
        assert_eq!(scene.is_enabled(3), Some(false));

        // Walk under the roof: out of moonlight, glass turns solid again.
        player.body_mut().position = Point3::new(10.0, 1.0, -5.0);
        tick(&mut player, &mut scene, MoveInput::default());
        assert_eq!(scene.is_enabled(3), Some(true));

        let mut scene = world();
        let mut canonical = controller(&scene, ControllerVariant::Canonical, Point3::new(0.0, 1.0, -5.0));
        tick(&mut canonical, &mut scene, MoveInput::default());
        assert_eq!(scene.is_enabled(3), Some(true));
    }

    #[test]
    fn standing_inside_solid_glass_under_open_sky() {
        let mut scene = world();
        let spawn = Point3::new(-10.0, 1.0, 0.0);
        let mut player = controller(&scene, ControllerVariant::GlassPermeable, spawn);
        assert_eq!(scene.is_enabled(3), Some(true));

        for _ in 0..3 {
            let report = tick(&mut player, &mut scene, MoveInput::default());
            assert!(report.exposure.in_moonlight);
            assert!(report.grounded);
            assert_eq!(scene.is_enabled(3), Some(false));
            assert!(player.body().position.y < 1.1);
            // Re-enable the pane before the next tick.
            scene.set_collider_enabled(3, true);
        }
    }

    #[test]
    fn walking_into_a_climbable_wall_starts_climbing() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::Canonical, Point3::new(0.0, 1.0, 1.2));
        let report = tick(&mut player, &mut scene, MoveInput::new(0.0, 1.0));
        assert!(report.state.is_climbing());
        assert!(!player.body().use_gravity);

        // Releasing the stick lets go under the canonical rule.
        let report = tick(&mut player, &mut scene, MoveInput::default());
        assert_eq!(report.state, LocomotionState::Grounded);
        assert!(player.body().use_gravity);
    }

    #[test]
    fn grounded_jump_launches_the_player() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::Canonical, Point3::new(10.0, 1.0, -5.0));
        let report = tick(&mut player, &mut scene, MoveInput::default().with_jump());
        assert!(report.jumped);
        assert!(player.body().velocity.y > 0.0);
        assert!(player.body().position.y > 1.0);
    }

    #[test]
    fn reset_forces_climbing_off() {
        let mut scene = world();
        let mut player = controller(&scene, ControllerVariant::Canonical, Point3::new(0.0, 1.0, 1.2));
        tick(&mut player, &mut scene, MoveInput::new(0.0, 1.0));
        assert!(player.state().is_climbing());
        player.reset_locomotion();
        assert_eq!(player.state(), LocomotionState::Grounded);
        assert!(player.body().use_gravity);
    }
}
