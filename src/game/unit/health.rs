use bevy::prelude::*;

use crate::game::control::SelectionSet;

use super::components::{Health, HealthDisplay, Team, Unit};
use super::registry::UnitRegistry;

/// One hit landed by `source` on `target`.
#[derive(Message, Debug, Clone, Copy)]
pub struct DamageDealt {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
}

/// Written exactly once per unit, on the tick its health reaches zero.
#[derive(Message, Debug, Clone, Copy)]
pub struct UnitDied {
    pub unit: Entity,
    pub team: Team,
}

/// Apply this tick's hits and push the new values to each health display.
pub(super) fn apply_damage(
    mut hits: MessageReader<DamageDealt>,
    mut q_units: Query<(&mut Health, &mut HealthDisplay), With<Unit>>,
) {
    for hit in hits.read() {
        // Target may already be gone
        let Ok((mut health, mut display)) = q_units.get_mut(hit.target) else { continue };
        let current = health.apply_damage(hit.amount);
        display.update(current, health.max());
        debug!("{:?} hit {:?} for {} ({} / {})",
               hit.source, hit.target, hit.amount, current, health.max());
    }
}

/// Remove units whose health reached zero from the registry and the selection,
/// then despawn them. Runs last so nothing else this tick loses a target mid-update.
pub(super) fn despawn_dead_units(
    mut commands: Commands,
    q_units: Query<(Entity, &Health, &Team), With<Unit>>,
    mut registry: ResMut<UnitRegistry>,
    mut selection: ResMut<SelectionSet>,
    mut deaths: MessageWriter<UnitDied>,
) {
    for (entity, health, team) in q_units.iter() {
        if !health.is_dead() {
            continue;
        }
        registry.unregister(entity);
        selection.forget(entity);
        commands.entity(entity).despawn();
        deaths.write(UnitDied { unit: entity, team: *team });
        info!("Unit {:?} ({:?}) died", entity, team);
    }
}
