use bevy::prelude::*;
use shared::{ActorTag, DollyCart, DollyTrack, ThresholdTrigger};

use crate::{
    FrameSet, StartupSet, level,
    math::{to_point, to_vec3},
    player::Player,
    settings::Settings,
};

/// Camera cart on its track, driven by the threshold volume.
#[derive(Component)]
pub struct Dolly {
    pub trigger: ThresholdTrigger,
    pub cart: DollyCart,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_dolly.in_set(StartupSet::Actors));
    app.add_systems(Update, update_dolly.in_set(FrameSet::Dolly));
}

fn spawn_dolly(mut commands: Commands, settings: Res<Settings>, mut exit: MessageWriter<AppExit>) {
    let track = DollyTrack::new(level::DOLLY_TRACK.iter().map(|p| to_point(*p)).collect(), false);
    let trigger = ThresholdTrigger::new(
        to_point(level::THRESHOLD_CENTER),
        level::THRESHOLD_HALF_EXTENTS,
    );
    let dolly = track
        .and_then(|track| DollyCart::new(track, &settings.dolly))
        .and_then(|cart| trigger.map(|trigger| Dolly { trigger, cart }));

    match dolly {
        Ok(dolly) => {
            info!(
                "Dolly track ready: {:.1}m, starts at {}",
                dolly.cart.track().length(),
                to_vec3(&dolly.cart.world_position())
            );
            commands.spawn(dolly);
        }
        Err(err) => {
            error!("Cannot build dolly: {err}");
            exit.write(AppExit::error());
        }
    }
}

/// Threshold enter/exit first, then move the cart for this frame.
fn update_dolly(
    time: Res<Time>,
    mut dolly: Single<&mut Dolly>,
    player: Option<Single<&Player>>,
) {
    if let Some(player) = player {
        let position = player.controller.body().position;
        if let Some(event) = dolly.trigger.observe(ActorTag::Player, &position) {
            dolly.cart.handle(event);
        }
    }
    dolly.cart.update(time.delta_secs());
}
