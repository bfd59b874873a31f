use bevy::prelude::*;

use crate::game::combat::AttackProfile;

use super::input::PointerInput;
use super::selection::{SelectionFlagQuery, SelectionSet};
use super::spatial::{surfaces, SpatialProbe};

/// Order markers sit just above the ground plane to avoid z-fighting.
pub const GROUND_MARKER_HEIGHT: f32 = 0.001;

/// Secondary press on the ground while units are selected. Each selected
/// movement controller consumes it on its own.
#[derive(Message, Debug, Clone, Copy)]
pub struct GroundOrder {
    pub point: Vec3,
}

/// Whether the attack cursor should render this tick, and over what.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct AttackCursor {
    pub visible: bool,
    pub target: Option<Entity>,
}

/// Primary press: click, shift-click and click-on-nothing selection.
pub(super) fn dispatch_primary_click(
    pointer: Res<PointerInput>,
    probe: Res<SpatialProbe>,
    mut selection: ResMut<SelectionSet>,
    mut q_flags: SelectionFlagQuery,
) {
    if !pointer.primary_pressed {
        return;
    }

    let hit = probe
        .hit_test(pointer.cursor, surfaces::CLICKABLE)
        .and_then(|hit| hit.entity);

    match (hit, pointer.modifier_held) {
        (Some(unit), true) => {
            let selected = selection.toggle(unit, &mut q_flags);
            debug!("Toggled {:?} (selected: {})", unit, selected);
        }
        (Some(unit), false) => {
            selection.select_only(Some(unit), &mut q_flags);
            debug!("Selected only {:?}", unit);
        }
        (None, false) => selection.clear_all(&mut q_flags),
        (None, true) => {}
    }
}

/// Secondary press and attack hover. Ground orders go out as [`GroundOrder`];
/// attack orders are written straight into each selected unit's target slot.
pub(super) fn dispatch_orders(
    pointer: Res<PointerInput>,
    probe: Res<SpatialProbe>,
    mut selection: ResMut<SelectionSet>,
    mut cursor: ResMut<AttackCursor>,
    mut q_attackers: Query<&mut AttackProfile>,
    mut ground_orders: MessageWriter<GroundOrder>,
) {
    if selection.is_empty() {
        cursor.set_if_neq(AttackCursor::default());
        return;
    }

    if pointer.secondary_pressed {
        if let Some(hit) = probe.hit_test(pointer.cursor, surfaces::GROUND) {
            let point = Vec3::new(hit.point.x, GROUND_MARKER_HEIGHT, hit.point.z);
            selection.place_marker(point);
            ground_orders.write(GroundOrder { point: hit.point.with_y(0.0) });
            debug!("Ground order at {:?} for {} units", point, selection.len());
        }
    }

    let has_attackers = selection.iter().any(|unit| q_attackers.contains(unit));
    if !has_attackers {
        cursor.set_if_neq(AttackCursor::default());
        return;
    }

    let target = probe
        .hit_test(pointer.cursor, surfaces::ATTACKABLE)
        .and_then(|hit| hit.entity);
    cursor.set_if_neq(AttackCursor { visible: target.is_some(), target });

    let Some(target) = target.filter(|_| pointer.secondary_pressed) else { return };
    for unit in selection.iter().filter(|&unit| unit != target) {
        if let Ok(mut profile) = q_attackers.get_mut(unit) {
            profile.target = Some(target);
        }
    }
    debug!("Attack order on {:?}", target);
}

/// Windowed: red ring under the hovered attack target.
pub(super) fn draw_attack_cursor(
    cursor: Res<AttackCursor>,
    q_transforms: Query<&Transform>,
    mut gizmos: Gizmos,
) {
    let Some(target) = cursor.target.filter(|_| cursor.visible) else { return };
    let Ok(transform) = q_transforms.get(target) else { return };
    gizmos.circle(
        Isometry3d::new(
            transform.translation.with_y(GROUND_MARKER_HEIGHT),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        ),
        0.9,
        Color::srgb(1.0, 0.1, 0.1),
    );
}
