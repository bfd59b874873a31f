use bevy::ecs::entity::EntityHashMap;
use bevy::prelude::*;

use crate::game::movement::{MovementController, NavAgent};
use crate::game::unit::{DamageDealt, Team, Unit, UnitRegistry};

use super::components::{AttackProfile, CombatState, CombatVisual, DetectionContacts};
use super::state_machine::{yaw_towards, CombatContext, NavIntent};

/// Detection pass. Each player unit diffs the hostiles inside its detect
/// radius against last tick: leaving clears the target if it was the one
/// leaving, entering assigns a target only when the slot is empty.
pub(super) fn acquire_targets(
    registry: Res<UnitRegistry>,
    q_others: Query<(&Transform, &Team), With<Unit>>,
    mut q_detectors: Query<(Entity, &Transform, &Team, &mut AttackProfile, &mut DetectionContacts)>,
) {
    for (entity, transform, team, mut profile, mut contacts) in q_detectors.iter_mut() {
        if !team.is_player() {
            continue;
        }
        let position = transform.translation;
        let detect = profile.radii().detect();

        let inside: Vec<Entity> = registry
            .iter()
            .filter(|&other| other != entity)
            .filter(|&other| {
                q_others.get(other).is_ok_and(|(other_transform, other_team)| {
                    team.is_hostile_to(*other_team)
                        && (other_transform.translation - position).with_y(0.0).length() <= detect
                })
            })
            .collect();

        if inside == contacts.inside {
            continue;
        }

        for &left in contacts.inside.iter().filter(|&u| !inside.contains(u)) {
            if profile.target == Some(left) {
                debug!("{:?} lost {:?} from detection", entity, left);
                profile.target = None;
            }
        }
        for &entered in inside.iter().filter(|&u| !contacts.inside.contains(u)) {
            if profile.target.is_none() {
                debug!("{:?} detected {:?}", entity, entered);
                profile.target = Some(entered);
            }
        }
        contacts.inside = inside;
    }
}

/// Runs every unit's active combat state once and applies the result to
/// facing, navigation, damage and the visual sink.
pub(super) fn tick_combat_states(
    time: Res<Time>,
    mut params: ParamSet<(
        Query<(Entity, &Transform), With<Unit>>,
        Query<(
            Entity,
            &mut Transform,
            &mut NavAgent,
            Option<&MovementController>,
            &mut AttackProfile,
            &mut CombatState,
            &mut CombatVisual,
        )>,
    )>,
    mut damage: MessageWriter<DamageDealt>,
) {
    let positions: EntityHashMap<Vec3> = params
        .p0()
        .iter()
        .map(|(entity, transform)| (entity, transform.translation))
        .collect();
    let delta_secs = time.delta_secs();

    for (entity, mut transform, mut agent, controller, mut profile, mut state, mut visual)
        in params.p1().iter_mut()
    {
        // Weak target: gone entities read as absent
        if let Some(target) = profile.target {
            if !positions.contains_key(&target) {
                debug!("{:?} target {:?} no longer exists", entity, target);
                profile.target = None;
            }
        }

        let position = transform.translation;
        let ctx = CombatContext {
            position,
            target: profile.target.and_then(|t| positions.get(&t).copied()),
            commanded_to_move: controller.is_some_and(|c| c.is_commanded_to_move()),
            delta_secs,
        };
        let step = state.tick(&profile, &ctx);

        if let Some(rotation) = step.face.and_then(|point| yaw_towards(position, point)) {
            transform.rotation = rotation;
        }

        match step.nav {
            NavIntent::Hold => {}
            NavIntent::Pursue(point) => agent.set_destination(point),
            NavIntent::Stop => agent.set_destination(position),
        }

        if step.strike {
            if let Some(target) = profile.target {
                damage.write(DamageDealt {
                    source: entity,
                    target,
                    amount: profile.damage(),
                });
            }
        }

        let phase = step.state.phase();
        if phase != state.phase() {
            debug!("{:?} {:?} -> {:?}", entity, state.phase(), phase);
            visual.enter(phase);
        }
        *state = step.state;
    }
}
