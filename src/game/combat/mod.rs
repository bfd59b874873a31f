use bevy::prelude::*;
use crate::game::CommandSet;

mod components;
mod state_machine;
mod systems;
mod debug;

pub use components::{EngageRadii, AttackProfile, CombatState, CombatPhase, CombatVisual,
                     DetectionContacts};
pub use state_machine::{CombatContext, CombatStep, NavIntent, yaw_towards};
pub use debug::CombatDebug;

use systems::{acquire_targets, tick_combat_states};
use debug::{toggle_radii_overlay, draw_engage_radii};

/// Target acquisition and the per-unit Idle / Following / Attacking machine.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            acquire_targets,
            tick_combat_states,
        ).chain().in_set(CommandSet::Combat));
    }
}

/// Windowed gizmo overlay for the engage radii.
pub struct CombatDebugPlugin;

impl Plugin for CombatDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatDebug>()
           .add_systems(Update, (toggle_radii_overlay, draw_engage_radii)
               .chain()
               .after(CommandSet::Cleanup));
    }
}
