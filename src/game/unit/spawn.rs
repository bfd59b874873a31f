use bevy::prelude::*;

use crate::game::combat::{AttackProfile, CombatState, CombatVisual, DetectionContacts};
use crate::game::control::{surfaces, Surface};
use crate::game::movement::{MovementController, NavAgent};

use super::components::{Health, HealthDisplay, SelectionIndicator, Team, Unit};

/// Units stand on their origin; the body mesh and hit sphere sit this far above it.
pub const UNIT_BODY_HALF_HEIGHT: f32 = 1.0;

/// Command to spawn a new unit
#[derive(Message, Debug, Clone)]
pub struct SpawnUnitCommand {
    pub team: Team,
    pub position: Vec3,
}

/// Validated template every unit is spawned from. Built from
/// [`InitialConfig`](crate::game::config::InitialConfig) at startup.
#[derive(Resource, Debug, Clone)]
pub struct UnitDefaults {
    pub health: Health,
    pub attack: AttackProfile,
    pub stopping_distance: f32,
    pub move_speed: f32,
    pub unit_radius: f32,
}

impl Default for UnitDefaults {
    fn default() -> Self {
        Self {
            health: Health::default(),
            attack: AttackProfile::default(),
            stopping_distance: 0.2,
            move_speed: 5.0,
            unit_radius: 0.6,
        }
    }
}

/// A player-commanded unit: selectable, movable, fights back.
pub fn player_unit(position: Vec3, defaults: &UnitDefaults) -> impl Bundle {
    (
        Unit,
        Team::Player,
        defaults.health,
        HealthDisplay::from(defaults.health),
        SelectionIndicator::default(),
        Surface::new(surfaces::CLICKABLE, defaults.unit_radius).lifted(UNIT_BODY_HALF_HEIGHT),
        Transform::from_translation(position),
        MovementController::default(),
        NavAgent::new(defaults.move_speed, defaults.stopping_distance),
        defaults.attack.clone(),
        CombatState::Idle,
        CombatVisual::default(),
        DetectionContacts::default(),
    )
}

/// A hostile unit: selectable for inspection and attackable, but not commandable.
pub fn enemy_unit(position: Vec3, defaults: &UnitDefaults) -> impl Bundle {
    (
        Unit,
        Team::Enemy,
        defaults.health,
        HealthDisplay::from(defaults.health),
        SelectionIndicator::default(),
        Surface::new(surfaces::CLICKABLE | surfaces::ATTACKABLE, defaults.unit_radius)
            .lifted(UNIT_BODY_HALF_HEIGHT),
        Transform::from_translation(position),
    )
}

pub(super) fn process_spawn_commands(
    mut commands: Commands,
    mut spawns: MessageReader<SpawnUnitCommand>,
    defaults: Res<UnitDefaults>,
) {
    for event in spawns.read() {
        let entity = match event.team {
            Team::Player => commands.spawn(player_unit(event.position, &defaults)).id(),
            Team::Enemy => commands.spawn(enemy_unit(event.position, &defaults)).id(),
        };
        info!("Spawning {:?} unit {:?} at {:?}", event.team, entity, event.position);
    }
}
