use bevy::prelude::*;
use crate::game::CommandSet;
use crate::game::control::GroundOrder;

mod components;

pub use components::{MovementController, NavAgent};

/// Explicit move orders and the straight-line navigator that serves them.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            issue_move_orders,
            advance_nav_agents,
            settle_move_orders,
        ).chain().in_set(CommandSet::Movement));
    }
}

/// Every enabled (selected) controller takes each ground order.
fn issue_move_orders(
    mut orders: MessageReader<GroundOrder>,
    mut q_movers: Query<(Entity, &mut MovementController, &mut NavAgent)>,
) {
    for order in orders.read() {
        for (entity, mut controller, mut agent) in q_movers.iter_mut() {
            if controller.issue_move_order(order.point, &mut agent) {
                debug!("{:?} moving to {:?}", entity, order.point);
            }
        }
    }
}

/// Straight-line stand-in for a navigation mesh: resolves pending requests and
/// steers each agent across the XZ plane at its speed.
fn advance_nav_agents(
    time: Res<Time>,
    mut q_agents: Query<(&mut Transform, &mut NavAgent)>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut agent) in q_agents.iter_mut() {
        agent.resolve_pending();
        if !agent.has_active_path() {
            continue;
        }
        let Some(destination) = agent.destination() else { continue };

        let offset = (destination - transform.translation).with_y(0.0);
        let distance = offset.length();
        if distance <= agent.stopping_distance {
            agent.report_progress(distance);
            continue;
        }

        let step = (agent.speed * dt).min(distance);
        let heading = offset / distance;
        transform.translation += heading * step;
        transform.rotation = Quat::from_rotation_y(f32::atan2(-heading.x, -heading.z));
        agent.report_progress(distance - step);
    }
}

/// Runs for every controller, selected or not, so a deselected unit's order still clears.
fn settle_move_orders(
    mut q_movers: Query<(Entity, &mut MovementController, &NavAgent)>,
) {
    for (entity, mut controller, agent) in q_movers.iter_mut() {
        if controller.settle(agent) {
            debug!("{:?} finished move order", entity);
        }
    }
}
