use bevy::prelude::*;
use crate::game::combat::{CombatPhase, CombatVisual};
use crate::game::config::GameConfig;
use crate::game::control::SelectionSet;

use super::components::{Unit, Team, SelectionIndicator, HealthDisplay};
use super::resources::{UnitMesh, UnitMaterials, HealthBarSettings};
use super::spawn::UNIT_BODY_HALF_HEIGHT;

/// Marks the child entity that renders the unit body
#[derive(Component)]
pub struct UnitBody;

/// Marks the child entity that renders the selection ring
#[derive(Component)]
pub struct SelectionRing;

/// Marks the child entity that renders the health bar
#[derive(Component)]
pub struct HealthBar;

/// Ground ring shown where the last move order landed. Restarts its pulse
/// every time the marker is placed again.
#[derive(Component)]
pub struct OrderMarkerVisual {
    generation: u32,
    pulse: Timer,
}

const ORDER_MARKER_PULSE_SECS: f32 = 0.4;
/// Keeps the ring clear of the ground plane.
const SELECTION_RING_LIFT: f32 = 0.02;
const HEALTH_BAR_CLEARANCE: f32 = 0.4;

/// Spawns visual representations for newly created units
///
/// Note: Only runs on Added<Unit> - NOT a hot path (only processes new spawns)
pub(super) fn spawn_unit_visuals(
    mut commands: Commands,
    query: Query<(Entity, &Team), Added<Unit>>,
    unit_mesh: Res<UnitMesh>,
    unit_materials: Res<UnitMaterials>,
    settings: Res<HealthBarSettings>,
) {
    for (entity, team) in query.iter() {
        let body = match team {
            Team::Player => unit_materials.idle.clone(),
            Team::Enemy => unit_materials.enemy.clone(),
        };
        commands.entity(entity).insert(Visibility::default()).with_children(|parent| {
            parent.spawn((
                Mesh3d(unit_mesh.unit.clone()),
                MeshMaterial3d(body),
                Transform::from_xyz(0.0, UNIT_BODY_HALF_HEIGHT, 0.0),
                UnitBody,
            ));
            parent.spawn((
                Mesh3d(unit_mesh.ring.clone()),
                MeshMaterial3d(unit_materials.selection_ring.clone()),
                Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2))
                    .with_translation(Vec3::new(0.0, SELECTION_RING_LIFT, 0.0)),
                Visibility::Hidden,
                SelectionRing,
            ));
            parent.spawn((
                Mesh3d(unit_mesh.quad.clone()),
                MeshMaterial3d(unit_materials.health_bar.clone()),
                Transform::from_xyz(0.0, 2.0 * UNIT_BODY_HALF_HEIGHT + HEALTH_BAR_CLEARANCE, 0.0),
                if settings.show { Visibility::Visible } else { Visibility::Hidden },
                HealthBar,
            ));
        });
    }
}

/// Swaps the body material once per combat state entry
pub(super) fn apply_combat_materials(
    q_units: Query<(&CombatVisual, &Children), Changed<CombatVisual>>,
    mut q_bodies: Query<&mut MeshMaterial3d<StandardMaterial>, With<UnitBody>>,
    unit_materials: Res<UnitMaterials>,
) {
    for (visual, children) in q_units.iter() {
        let handle = match visual.phase {
            CombatPhase::Idle => &unit_materials.idle,
            CombatPhase::Following => &unit_materials.following,
            CombatPhase::Attacking => &unit_materials.attacking,
        };
        for child in children.iter() {
            if let Ok(mut material) = q_bodies.get_mut(child) {
                material.0 = handle.clone();
            }
        }
    }
}

/// Shows/hides selection rings based on the unit's indicator flag
pub(super) fn update_selection_ring_visibility(
    q_units: Query<(&SelectionIndicator, &Children), Changed<SelectionIndicator>>,
    mut q_rings: Query<&mut Visibility, With<SelectionRing>>,
) {
    for (indicator, children) in q_units.iter() {
        for child in children.iter() {
            if let Ok(mut vis) = q_rings.get_mut(child) {
                *vis = if indicator.visible { Visibility::Visible } else { Visibility::Hidden };
            }
        }
    }
}

/// Toggles health bar visibility when user presses configured key
pub(super) fn toggle_health_bars(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut settings: ResMut<HealthBarSettings>,
    mut q_bars: Query<&mut Visibility, With<HealthBar>>,
) {
    if keys.just_pressed(config.key_toggle_health_bars) {
        settings.show = !settings.show;
        let vis = if settings.show { Visibility::Visible } else { Visibility::Hidden };
        for mut visibility in q_bars.iter_mut() {
            *visibility = vis;
        }
    }
}

/// Updates health bar visuals from the health display sink
pub(super) fn update_health_bars(
    q_units: Query<(&Children, &HealthDisplay), Changed<HealthDisplay>>,
    mut q_bars: Query<&mut Transform, With<HealthBar>>,
) {
    for (children, display) in q_units.iter() {
        let pct = display.fraction();
        for child in children.iter() {
            if let Ok(mut transform) = q_bars.get_mut(child) {
                // Keep the left edge pinned at -0.5 while the bar shrinks
                transform.scale.x = pct;
                transform.translation.x = -0.5 + (pct * 0.5);
            }
        }
    }
}

pub(super) fn setup_order_marker(
    mut commands: Commands,
    unit_mesh: Res<UnitMesh>,
    unit_materials: Res<UnitMaterials>,
) {
    commands.spawn((
        Mesh3d(unit_mesh.ring.clone()),
        MeshMaterial3d(unit_materials.order_marker.clone()),
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        Visibility::Hidden,
        OrderMarkerVisual {
            generation: 0,
            pulse: Timer::from_seconds(ORDER_MARKER_PULSE_SECS, TimerMode::Once),
        },
    ));
}

/// Moves the order marker and replays its pulse whenever it is placed again
pub(super) fn sync_order_marker(
    selection: Res<SelectionSet>,
    time: Res<Time>,
    mut q_marker: Query<(&mut Transform, &mut Visibility, &mut OrderMarkerVisual)>,
) {
    let Ok((mut transform, mut visibility, mut visual)) = q_marker.single_mut() else { return };
    let marker = selection.marker();

    if marker.generation != visual.generation {
        visual.generation = marker.generation;
        visual.pulse.reset();
        transform.translation = marker.position;
    }

    *visibility = if marker.visible { Visibility::Visible } else { Visibility::Hidden };

    visual.pulse.tick(time.delta());
    let scale = 1.5 - 0.5 * visual.pulse.fraction();
    transform.scale = Vec3::splat(scale);
}
