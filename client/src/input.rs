use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::{JumpLatch, MoveInput};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    #[actionlike(DualAxis)]
    Move,
    Jump,
}

/// Jump pressed during a rendered frame, held until a fixed tick consumes it.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct PendingJump(pub JumpLatch);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<PlayerAction>::default());

    app.register_type::<PlayerAction>();

    let input_map = InputMap::<PlayerAction>::default()
        .with_dual_axis(PlayerAction::Move, VirtualDPad::wasd())
        .with_dual_axis(PlayerAction::Move, VirtualDPad::arrow_keys())
        .with_dual_axis(PlayerAction::Move, GamepadStick::LEFT)
        .with(PlayerAction::Jump, KeyCode::Space)
        .with(PlayerAction::Jump, GamepadButton::South);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<PlayerAction>::default());

    app.init_resource::<PendingJump>();
    app.add_systems(Update, latch_jump);
}

fn latch_jump(actions: Res<ActionState<PlayerAction>>, mut pending: ResMut<PendingJump>) {
    if actions.just_pressed(&PlayerAction::Jump) {
        pending.press();
    }
}

/// Movement axes for this tick, with the latched jump taken out.
pub fn take_move_input(
    actions: &ActionState<PlayerAction>,
    pending: &mut PendingJump,
) -> MoveInput {
    let axes = actions.clamped_axis_pair(&PlayerAction::Move);
    pending.input(axes.x, axes.y)
}
