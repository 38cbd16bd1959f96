//! Frame-driven scene loop: fixed player ticks plus per-frame behaviours.

use nalgebra::Point3;

use crate::{
    ActorTag, ConfigError, DollyCart, JumpLatch, LightRegistry, MoveInput, PlayerController,
    SceneQueries, SceneQueryWorld, SimulationSettings, ThresholdTrigger, ToonShading,
    locomotion::CameraBasis,
    player::TickReport,
    trigger::TriggerEvent,
};

/// A toon-shaded object and its current shader parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToonObject {
    pub position: Point3<f32>,
    pub shading: ToonShading,
}

/// Threshold volume wired to the cart it drives.
#[derive(Clone, Debug)]
pub struct DollyRig {
    pub trigger: ThresholdTrigger,
    pub cart: DollyCart,
}

/// What one call to [`Simulation::advance`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Fixed ticks run this frame, in order.
    pub ticks: Vec<TickReport>,
    pub trigger_event: Option<TriggerEvent>,
}

pub struct Simulation<S = SceneQueryWorld> {
    settings: SimulationSettings,
    scene: S,
    player: PlayerController,
    dolly: Option<DollyRig>,
    lights: LightRegistry,
    toon_objects: Vec<ToonObject>,
    accumulator: f32,
    jump: JumpLatch,
}

impl<S: SceneQueries> Simulation<S> {
    pub fn new(
        settings: SimulationSettings,
        scene: S,
        player: PlayerController,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            scene,
            player,
            dolly: None,
            lights: LightRegistry::new(),
            toon_objects: Vec::new(),
            accumulator: 0.0,
            jump: JumpLatch::default(),
        })
    }

    pub fn with_dolly(mut self, trigger: ThresholdTrigger, cart: DollyCart) -> Self {
        self.dolly = Some(DollyRig { trigger, cart });
        self
    }

    pub fn with_lights(mut self, lights: LightRegistry) -> Self {
        self.lights = lights;
        self
    }

    /// Register a toon-shaded object; returns its index.
    pub fn add_toon_object(&mut self, position: Point3<f32>) -> usize {
        self.toon_objects.push(ToonObject {
            position,
            shading: ToonShading::default(),
        });
        self.toon_objects.len() - 1
    }

    pub fn set_toon_object_position(&mut self, index: usize, position: Point3<f32>) -> bool {
        match self.toon_objects.get_mut(index) {
            Some(object) => {
                object.position = position;
                true
            }
            None => false,
        }
    }

    /// Start-of-scene pass: shade every toon object once before the first frame.
    pub fn start(&mut self) {
        self.refresh_toon();
        log::info!(
            "Simulation started: {} toon objects, {} lights, dolly {}",
            self.toon_objects.len(),
            self.lights.len(),
            if self.dolly.is_some() { "present" } else { "absent" },
        );
    }

    /// Run one rendered frame.
    ///
    /// The frame delta is clamped, then as many fixed player ticks run as the
    /// accumulated time allows. A jump pressed this frame stays latched until a fixed
    /// tick sees it. Per-frame work follows: triggers, dolly cart, toon shading.
    pub fn advance(&mut self, frame_dt: f32, input: &MoveInput, camera: &CameraBasis) -> FrameReport {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.settings.max_frame_delta_secs)
        } else {
            0.0
        };
        if input.jump {
            self.jump.press();
        }
        self.accumulator += frame_dt;

        let step = self.settings.fixed_timestep_secs;
        let mut report = FrameReport::default();
        while self.accumulator >= step {
            self.accumulator -= step;
            let tick_input = self.jump.input(input.horizontal, input.vertical);
            report.ticks.push(self.player.fixed_tick(
                &mut self.scene,
                &tick_input,
                camera,
                self.settings.gravity_mps2,
                step,
            ));
        }

        let player_position = self.player.body().position;
        if let Some(rig) = self.dolly.as_mut() {
            report.trigger_event = rig.trigger.observe(ActorTag::Player, &player_position);
            if let Some(event) = report.trigger_event {
                rig.cart.handle(event);
            }
            rig.cart.update(frame_dt);
        }

        self.refresh_toon();
        report
    }

    fn refresh_toon(&mut self) {
        for object in &mut self.toon_objects {
            object.shading.refresh(&self.lights, &object.position);
        }
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn dolly(&self) -> Option<&DollyRig> {
        self.dolly.as_ref()
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        &mut self.lights
    }

    pub fn toon_objects(&self) -> &[ToonObject] {
        &self.toon_objects
    }

    pub fn jump_pending(&self) -> bool {
        self.jump.is_pending()
    }
}
