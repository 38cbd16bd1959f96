pub mod body;
pub mod color;
pub mod constants;
pub mod dolly;
pub mod error;
pub mod lighting;
pub mod locomotion;
pub mod player;
pub mod settings;
pub mod sim;
pub mod toon;
pub mod trigger;
pub mod utils;
pub mod world;

pub use body::{ForceMode, PlayerBody};
pub use color::Rgba;
pub use constants::{FIXED_TIMESTEP_SECS, GRAVITY_MPS2, MAX_FRAME_DELTA_SECS};
pub use dolly::{DollyCart, DollyTrack};
pub use error::ConfigError;
pub use lighting::{Exposure, LightId, LightKind, LightRig, LightSource, TintPalette};
pub use locomotion::{CameraBasis, JumpLatch, LocomotionState, MoveInput};
pub use player::{PlayerController, PlayerVisuals, TickReport};
pub use settings::{
    ClimbExit, ControllerSettings, ControllerVariant, DollySettings, GameSettings,
    SimulationSettings,
};
pub use sim::{FrameReport, Simulation, ToonObject};
pub use toon::{LightRegistry, ToonShading, dominant_light_direction};
pub use trigger::{ActorTag, ThresholdTrigger, TriggerEvent};
pub use world::{
    ColliderShapeDef, RayHit, SceneQueries, SceneQueryWorld, StaticId, SurfaceTag,
    WorldStaticDef,
};
