use bevy::prelude::*;

use super::components::{AttackProfile, CombatState};

/// What a unit sees this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatContext {
    pub position: Vec3,
    /// Position of a live target, if any.
    pub target: Option<Vec3>,
    pub commanded_to_move: bool,
    pub delta_secs: f32,
}

/// What the state machine asks of navigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavIntent {
    Hold,
    Pursue(Vec3),
    /// Destination set to the unit's own position.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatStep {
    pub state: CombatState,
    pub nav: NavIntent,
    /// World point to yaw towards.
    pub face: Option<Vec3>,
    pub strike: bool,
}

impl CombatStep {
    fn hold(state: CombatState) -> Self {
        Self { state, nav: NavIntent::Hold, face: None, strike: false }
    }
}

fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    (b - a).with_y(0.0).length()
}

impl CombatState {
    /// One tick of the active state. An explicit move order freezes the state
    /// and leaves navigation alone until it clears.
    pub fn tick(self, profile: &AttackProfile, ctx: &CombatContext) -> CombatStep {
        let radii = profile.radii();
        match self {
            CombatState::Idle => match ctx.target {
                Some(_) => CombatStep::hold(CombatState::Following),
                None => CombatStep::hold(CombatState::Idle),
            },

            CombatState::Following => {
                let Some(target) = ctx.target else {
                    return CombatStep::hold(CombatState::Idle);
                };
                if ctx.commanded_to_move {
                    return CombatStep::hold(CombatState::Following);
                }
                if planar_distance(ctx.position, target) < radii.attack() {
                    return CombatStep {
                        state: CombatState::attacking(),
                        nav: NavIntent::Stop,
                        face: Some(target),
                        strike: false,
                    };
                }
                CombatStep {
                    state: CombatState::Following,
                    nav: NavIntent::Pursue(target),
                    face: Some(target),
                    strike: false,
                }
            }

            CombatState::Attacking { cooldown } => {
                let Some(target) = ctx.target else {
                    return CombatStep::hold(CombatState::Following);
                };
                if ctx.commanded_to_move {
                    return CombatStep::hold(self);
                }

                let (strike, cooldown) = if cooldown <= 0.0 {
                    (true, profile.cooldown_secs())
                } else {
                    (false, cooldown - ctx.delta_secs)
                };
                let state = if planar_distance(ctx.position, target) > radii.disengage() {
                    CombatState::Following
                } else {
                    CombatState::Attacking { cooldown }
                };
                CombatStep {
                    state,
                    nav: NavIntent::Pursue(target),
                    face: Some(target),
                    strike,
                }
            }
        }
    }
}

/// Yaw-only rotation looking from `from` towards `to`. `None` when they coincide on the XZ plane.
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<Quat> {
    let flat = (to - from).with_y(0.0);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combat::{CombatPhase, EngageRadii};

    fn profile() -> AttackProfile {
        AttackProfile::new(10.0, 2.0, EngageRadii::new(2.0, 1.0, 1.2).unwrap()).unwrap()
    }

    fn ctx(target_x: Option<f32>) -> CombatContext {
        CombatContext {
            position: Vec3::ZERO,
            target: target_x.map(|x| Vec3::new(x, 0.0, 0.0)),
            commanded_to_move: false,
            delta_secs: 0.1,
        }
    }

    #[test]
    fn idle_follows_once_targeted() {
        let p = profile();
        assert_eq!(CombatState::Idle.tick(&p, &ctx(None)).state, CombatState::Idle);
        assert_eq!(CombatState::Idle.tick(&p, &ctx(Some(5.0))).state, CombatState::Following);
    }

    #[test]
    fn following_pursues_until_in_range() {
        let p = profile();
        let step = CombatState::Following.tick(&p, &ctx(Some(5.0)));
        assert_eq!(step.state, CombatState::Following);
        assert_eq!(step.nav, NavIntent::Pursue(Vec3::new(5.0, 0.0, 0.0)));

        let step = CombatState::Following.tick(&p, &ctx(Some(0.9)));
        assert_eq!(step.state, CombatState::Attacking { cooldown: 0.0 });
        assert_eq!(step.nav, NavIntent::Stop);
    }

    #[test]
    fn following_yields_to_move_order() {
        let p = profile();
        let mut c = ctx(Some(5.0));
        c.commanded_to_move = true;
        let step = CombatState::Following.tick(&p, &c);
        assert_eq!(step.state, CombatState::Following);
        assert_eq!(step.nav, NavIntent::Hold);
        assert_eq!(step.face, None);
    }

    #[test]
    fn first_attack_tick_strikes() {
        let p = profile();
        let step = CombatState::attacking().tick(&p, &ctx(Some(0.5)));
        assert!(step.strike);
        assert_eq!(step.state, CombatState::Attacking { cooldown: 0.5 });

        let step = step.state.tick(&p, &ctx(Some(0.5)));
        assert!(!step.strike);
        let CombatState::Attacking { cooldown } = step.state else { panic!("left Attacking") };
        assert!((cooldown - 0.4).abs() < 1e-5);
    }

    #[test]
    fn attack_rate_paces_strikes() {
        let p = profile();
        let mut state = CombatState::attacking();
        let mut strikes = 0;
        // 2 hits/s over 1s at 0.1s ticks
        for _ in 0..10 {
            let step = state.tick(&p, &ctx(Some(0.5)));
            strikes += step.strike as u32;
            state = step.state;
        }
        assert_eq!(strikes, 2);
    }

    #[test]
    fn disengages_beyond_radius() {
        let p = profile();
        let step = CombatState::attacking().tick(&p, &ctx(Some(1.5)));
        assert_eq!(step.state, CombatState::Following);
    }

    #[test]
    fn lost_target_falls_back_to_idle_in_two_ticks() {
        let p = profile();
        let first = CombatState::Attacking { cooldown: 0.3 }.tick(&p, &ctx(None));
        assert_eq!(first.state.phase(), CombatPhase::Following);
        assert!(!first.strike);
        let second = first.state.tick(&p, &ctx(None));
        assert_eq!(second.state, CombatState::Idle);
    }

    #[test]
    fn yaw_ignores_height() {
        let rotation = yaw_towards(Vec3::ZERO, Vec3::new(0.0, 5.0, -3.0)).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(yaw_towards(Vec3::ZERO, Vec3::Y).is_none());
    }
}
