use bevy::prelude::*;

use crate::game::config::GameConfig;
use crate::game::unit::{SpawnUnitCommand, Team};

use super::input::PointerInput;
use super::spatial::{surfaces, SpatialProbe};

/// Handle debug spawning via keyboard shortcuts
pub(super) fn handle_debug_spawning(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    pointer: Res<PointerInput>,
    probe: Res<SpatialProbe>,
    mut spawn_events: MessageWriter<SpawnUnitCommand>,
) {
    let team = if keys.just_pressed(config.key_spawn_player_unit) {
        Team::Player
    } else if keys.just_pressed(config.key_spawn_enemy_unit) {
        Team::Enemy
    } else {
        return;
    };

    let Some(hit) = probe.hit_test(pointer.cursor, surfaces::GROUND) else { return };
    info!("Spawning {:?} unit at {:?}", team, hit.point);
    spawn_events.write(SpawnUnitCommand {
        team,
        position: hit.point,
    });
}
