use bevy::prelude::*;

use crate::game::config::ConfigError;

/// Combat trigger distances. Always `detect >= disengage >= attack > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngageRadii {
    detect: f32,
    attack: f32,
    disengage: f32,
}

impl EngageRadii {
    pub fn new(detect: f32, attack: f32, disengage: f32) -> Result<Self, ConfigError> {
        if !(attack > 0.0) {
            return Err(ConfigError::NonPositiveAttackRadius(attack));
        }
        if !(disengage >= attack) {
            return Err(ConfigError::DisengageInsideAttack { attack, disengage });
        }
        if !(detect >= disengage) {
            return Err(ConfigError::DetectInsideDisengage { detect, disengage });
        }
        Ok(Self { detect, attack, disengage })
    }

    pub fn detect(&self) -> f32 {
        self.detect
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }

    pub fn disengage(&self) -> f32 {
        self.disengage
    }
}

impl Default for EngageRadii {
    fn default() -> Self {
        Self { detect: 2.0, attack: 1.0, disengage: 1.2 }
    }
}

/// Per-unit combat configuration plus the single target slot shared by
/// detection and explicit attack orders (last write wins).
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AttackProfile {
    /// Weak: cleared on read once the entity is gone.
    pub target: Option<Entity>,
    damage: f32,
    attack_rate: f32,
    radii: EngageRadii,
}

impl AttackProfile {
    pub fn new(damage: f32, attack_rate: f32, radii: EngageRadii) -> Result<Self, ConfigError> {
        if !(damage >= 0.0) {
            return Err(ConfigError::NegativeDamage(damage));
        }
        if !(attack_rate > 0.0) {
            return Err(ConfigError::NonPositiveAttackRate(attack_rate));
        }
        Ok(Self { target: None, damage, attack_rate, radii })
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Hits per second.
    pub fn attack_rate(&self) -> f32 {
        self.attack_rate
    }

    pub fn radii(&self) -> &EngageRadii {
        &self.radii
    }

    pub fn cooldown_secs(&self) -> f32 {
        1.0 / self.attack_rate
    }
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            target: None,
            damage: 10.0,
            attack_rate: 1.0,
            radii: EngageRadii::default(),
        }
    }
}

/// Exactly one active combat state per unit.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub enum CombatState {
    #[default]
    Idle,
    Following,
    /// Seconds until the next hit may land.
    Attacking { cooldown: f32 },
}

impl CombatState {
    pub fn phase(&self) -> CombatPhase {
        match self {
            CombatState::Idle => CombatPhase::Idle,
            CombatState::Following => CombatPhase::Following,
            CombatState::Attacking { .. } => CombatPhase::Attacking,
        }
    }

    pub fn attacking() -> Self {
        CombatState::Attacking { cooldown: 0.0 }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatPhase {
    #[default]
    Idle,
    Following,
    Attacking,
}

/// Visual feedback sink, written once per state entry. `entries` counts
/// every entry so repeated entries into the same phase are observable.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct CombatVisual {
    pub phase: CombatPhase,
    pub entries: u32,
}

impl CombatVisual {
    pub fn enter(&mut self, phase: CombatPhase) {
        self.phase = phase;
        self.entries = self.entries.wrapping_add(1);
    }
}

/// Hostiles inside the detect radius as of last tick, in registry order.
#[derive(Component, Debug, Default, Clone)]
pub struct DetectionContacts {
    pub inside: Vec<Entity>,
}
