use bevy::prelude::*;

use crate::game::control::SelectionSet;

use super::components::Unit;

/// Every live unit, in spawn order. Holds handles only; units leave on death.
///
/// Only [`register_spawned_units`], [`forget_removed_units`] and the death
/// cleanup write to it.
#[derive(Resource, Default, Debug)]
pub struct UnitRegistry {
    units: Vec<Entity>,
}

impl UnitRegistry {
    /// Returns false if the unit was already registered.
    pub fn register(&mut self, unit: Entity) -> bool {
        if self.units.contains(&unit) {
            return false;
        }
        self.units.push(unit);
        true
    }

    /// Returns false if the unit was not registered.
    pub fn unregister(&mut self, unit: Entity) -> bool {
        match self.units.iter().position(|&u| u == unit) {
            Some(index) => {
                self.units.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, unit: Entity) -> bool {
        self.units.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.units.iter().copied()
    }

    /// Copy of the current membership, safe to hold across removals.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.units.clone()
    }
}

pub(super) fn register_spawned_units(
    q_spawned: Query<Entity, Added<Unit>>,
    mut registry: ResMut<UnitRegistry>,
) {
    for entity in q_spawned.iter() {
        if registry.register(entity) {
            debug!("Registered unit {:?}", entity);
        }
    }
}

/// Drops units that were despawned without going through death cleanup.
pub(super) fn forget_removed_units(
    mut removed: RemovedComponents<Unit>,
    mut registry: ResMut<UnitRegistry>,
    mut selection: ResMut<SelectionSet>,
) {
    for entity in removed.read() {
        if registry.unregister(entity) {
            debug!("Unit {:?} removed outside death cleanup", entity);
        }
        selection.forget(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn register_is_idempotent() {
        let e = entities(1);
        let mut registry = UnitRegistry::default();
        assert!(registry.register(e[0]));
        assert!(!registry.register(e[0]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_absent_is_noop() {
        let e = entities(2);
        let mut registry = UnitRegistry::default();
        registry.register(e[0]);
        assert!(!registry.unregister(e[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn keeps_spawn_order_across_removal() {
        let e = entities(4);
        let mut registry = UnitRegistry::default();
        for &unit in &e {
            registry.register(unit);
        }
        registry.unregister(e[1]);
        let order: Vec<_> = registry.iter().collect();
        assert_eq!(order, vec![e[0], e[2], e[3]]);
    }

    #[test]
    fn snapshot_survives_removal_during_iteration() {
        let e = entities(3);
        let mut registry = UnitRegistry::default();
        for &unit in &e {
            registry.register(unit);
        }
        let mut visited = Vec::new();
        for unit in registry.snapshot() {
            visited.push(unit);
            registry.unregister(unit);
        }
        assert_eq!(visited, e);
        assert!(registry.is_empty());
    }
}
