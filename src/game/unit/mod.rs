mod components;
mod registry;
mod health;
mod spawn;
mod resources;
mod visuals;

use bevy::prelude::*;
use crate::game::CommandSet;

// Re-export public types
pub use components::{Unit, Team, Health, HealthDisplay, SelectionIndicator};
pub use registry::UnitRegistry;
pub use health::{DamageDealt, UnitDied};
pub use spawn::{SpawnUnitCommand, UnitDefaults, player_unit, enemy_unit, UNIT_BODY_HALF_HEIGHT};
pub use resources::HealthBarSettings;

use registry::{register_spawned_units, forget_removed_units};
use health::{apply_damage, despawn_dead_units};
use spawn::process_spawn_commands;
use resources::setup_unit_resources;
use visuals::{spawn_unit_visuals, apply_combat_materials, update_selection_ring_visibility,
              update_health_bars, toggle_health_bars, setup_order_marker, sync_order_marker};

/// Unit lifetime: spawning, registry membership, damage and death.
pub struct UnitPlugin;

impl Plugin for UnitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UnitRegistry>()
           .init_resource::<UnitDefaults>()
           .add_message::<SpawnUnitCommand>()
           .add_message::<DamageDealt>()
           .add_message::<UnitDied>()
           .add_systems(Update, (
               forget_removed_units,
               process_spawn_commands,
               register_spawned_units,
           ).chain().in_set(CommandSet::Input))
           .add_systems(Update, (
               apply_damage,
               despawn_dead_units,
           ).chain().in_set(CommandSet::Cleanup));
    }
}

/// Renders units: state materials, selection rings, health bars and the order marker.
pub struct UnitVisualsPlugin;

impl Plugin for UnitVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HealthBarSettings>()
           .add_systems(Startup, (setup_unit_resources, setup_order_marker).chain())
           .add_systems(Update, (
               spawn_unit_visuals,
               apply_combat_materials,
               update_selection_ring_visibility,
               update_health_bars,
               toggle_health_bars,
               sync_order_marker,
           ).chain().after(CommandSet::Cleanup));
    }
}
