use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::config::ConfigError;

/// Marks an entity as a unit in the game
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Unit;

/// Which side a unit fights for. `Player` units are the ones the player commands
/// and the only ones that acquire targets on their own.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn is_player(self) -> bool {
        self == Team::Player
    }

    pub fn is_hostile_to(self, other: Team) -> bool {
        self != other
    }
}

/// Health component for units. Always `0 <= current <= max`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Full health at `max`. Rejects non-positive (or NaN) maxima.
    pub fn new(max: f32) -> Result<Self, ConfigError> {
        if !(max > 0.0) {
            return Err(ConfigError::NonPositiveMaxHealth(max));
        }
        Ok(Self { current: max, max })
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtracts `amount` and returns the new value, clamped to `[0, max]`.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        self.current = (self.current - amount).clamp(0.0, self.max);
        self.current
    }
}

impl Default for Health {
    fn default() -> Self {
        Self { current: 100.0, max: 100.0 }
    }
}

/// Sink for the health bar widget. Receives `(current, max)` on every change.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthDisplay {
    pub current: f32,
    pub max: f32,
}

impl HealthDisplay {
    pub fn update(&mut self, current: f32, max: f32) {
        self.current = current;
        self.max = max;
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl From<Health> for HealthDisplay {
    fn from(health: Health) -> Self {
        Self { current: health.current, max: health.max }
    }
}

/// Whether the unit's selection ring is showing. Mirrors selection membership.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectionIndicator {
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_clamped_at_zero() {
        let mut health = Health::new(100.0).unwrap();
        assert_eq!(health.apply_damage(40.0), 60.0);
        assert!(!health.is_dead());
        assert_eq!(health.apply_damage(70.0), 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn healing_never_exceeds_max() {
        let mut health = Health::new(50.0).unwrap();
        health.apply_damage(10.0);
        assert_eq!(health.apply_damage(-100.0), 50.0);
    }

    #[test]
    fn rejects_non_positive_max() {
        assert!(Health::new(0.0).is_err());
        assert!(Health::new(-5.0).is_err());
        assert!(Health::new(f32::NAN).is_err());
    }

    #[test]
    fn teams_are_hostile_to_each_other_only() {
        assert!(Team::Player.is_hostile_to(Team::Enemy));
        assert!(!Team::Enemy.is_hostile_to(Team::Enemy));
    }
}
