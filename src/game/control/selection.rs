use bevy::prelude::*;

use crate::game::movement::MovementController;
use crate::game::unit::{SelectionIndicator, Unit};

/// Per-unit flags that must track selection membership: the indicator and
/// movement permission.
pub trait SelectionFlags {
    /// Returns false if the unit no longer exists.
    fn set_selected(&mut self, unit: Entity, selected: bool) -> bool;
}

pub type SelectionFlagQuery<'w, 's> = Query<
    'w,
    's,
    (&'static mut SelectionIndicator, Option<&'static mut MovementController>),
    With<Unit>,
>;

impl SelectionFlags for SelectionFlagQuery<'_, '_> {
    fn set_selected(&mut self, unit: Entity, selected: bool) -> bool {
        let Ok((mut indicator, controller)) = self.get_mut(unit) else { return false };
        indicator.visible = selected;
        if let Some(mut controller) = controller {
            controller.enabled = selected;
        }
        true
    }
}

/// Ground ring marking where the last move order landed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OrderMarker {
    pub position: Vec3,
    pub visible: bool,
    /// Bumped on every placement so the one-shot visual replays even at the same spot.
    pub generation: u32,
}

impl OrderMarker {
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.visible = true;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// The one selection authority of a session. Members are kept in insertion
/// order and never duplicated; every membership change goes through
/// [`SelectionFlags`] so indicator and movement permission never drift.
#[derive(Resource, Debug, Default)]
pub struct SelectionSet {
    members: Vec<Entity>,
    marker: OrderMarker,
}

impl SelectionSet {
    /// Replace the selection with `unit`. `None` (click hit nothing) leaves it untouched.
    pub fn select_only(&mut self, unit: Option<Entity>, flags: &mut impl SelectionFlags) {
        let Some(unit) = unit else { return };
        self.clear_all(flags);
        self.insert(unit, flags);
    }

    /// Add `unit` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, unit: Entity, flags: &mut impl SelectionFlags) -> bool {
        if let Some(index) = self.position(unit) {
            self.members.remove(index);
            flags.set_selected(unit, false);
            false
        } else {
            self.insert(unit, flags)
        }
    }

    /// Add `unit` if absent. Never removes.
    pub fn drag_add(&mut self, unit: Entity, flags: &mut impl SelectionFlags) {
        if !self.contains(unit) {
            self.insert(unit, flags);
        }
    }

    pub fn clear_all(&mut self, flags: &mut impl SelectionFlags) {
        for unit in self.members.drain(..) {
            flags.set_selected(unit, false);
        }
        self.marker.hide();
    }

    /// Drop a unit that no longer exists. Its flags are gone with it.
    pub fn forget(&mut self, unit: Entity) -> bool {
        match self.position(unit) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, unit: Entity) -> bool {
        self.members.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn marker(&self) -> &OrderMarker {
        &self.marker
    }

    pub fn place_marker(&mut self, position: Vec3) {
        self.marker.place(position);
    }

    fn position(&self, unit: Entity) -> Option<usize> {
        self.members.iter().position(|&u| u == unit)
    }

    fn insert(&mut self, unit: Entity, flags: &mut impl SelectionFlags) -> bool {
        if !flags.set_selected(unit, true) {
            debug!("Refusing to select missing unit {:?}", unit);
            return false;
        }
        self.members.push(unit);
        true
    }
}
