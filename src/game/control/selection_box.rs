use bevy::prelude::*;

use crate::game::config::GameConfig;
use crate::game::unit::{Unit, UnitRegistry};

use super::input::PointerInput;
use super::selection::{SelectionFlagQuery, SelectionSet};
use super::spatial::SpatialProbe;

/// Screen-space drag rectangle, live only between primary press and release.
#[derive(Resource, Debug, Default, Clone)]
pub struct DragRegion {
    start: Option<Vec2>,
    current: Vec2,
    /// Selection kept through the drag when the modifier was held at press.
    preserved: Vec<Entity>,
}

impl DragRegion {
    pub fn begin(&mut self, at: Vec2, preserved: Vec<Entity>) {
        self.start = Some(at);
        self.current = at;
        self.preserved = preserved;
    }

    pub fn extend_to(&mut self, at: Vec2) {
        self.current = at;
    }

    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    /// Normalized rectangle, independent of drag direction.
    pub fn rect(&self) -> Option<Rect> {
        self.start.map(|start| Rect::from_corners(start, self.current))
    }

    pub fn has_extent(&self, threshold: f32) -> bool {
        self.rect().is_some_and(|rect| {
            let size = rect.size();
            size.x > threshold || size.y > threshold
        })
    }

    /// Rectangle worth drawing: `None` until the drag leaves the click threshold.
    pub fn visible_rect(&self, threshold: f32) -> Option<Rect> {
        self.rect().filter(|_| self.has_extent(threshold))
    }

    pub fn finish(&mut self) {
        self.start = None;
        self.preserved.clear();
    }
}

pub(super) fn update_selection_box(
    pointer: Res<PointerInput>,
    config: Res<GameConfig>,
    probe: Res<SpatialProbe>,
    registry: Res<UnitRegistry>,
    q_positions: Query<&Transform, With<Unit>>,
    mut drag: ResMut<DragRegion>,
    mut selection: ResMut<SelectionSet>,
    mut q_flags: SelectionFlagQuery,
) {
    if pointer.primary_pressed {
        let preserved = if pointer.modifier_held {
            selection.members().to_vec()
        } else {
            Vec::new()
        };
        drag.begin(pointer.cursor, preserved);
    }

    if !drag.is_dragging() {
        return;
    }

    if pointer.primary_held || pointer.primary_released {
        drag.extend_to(pointer.cursor);
        if drag.has_extent(config.selection_drag_threshold) {
            rescan(&drag, &probe, &registry, &q_positions, &mut selection, &mut q_flags);
        }
    }

    if pointer.primary_released {
        drag.finish();
    }
}

/// Rebuild the selection from scratch so units leaving a shrinking box drop out.
fn rescan(
    drag: &DragRegion,
    probe: &SpatialProbe,
    registry: &UnitRegistry,
    q_positions: &Query<&Transform, With<Unit>>,
    selection: &mut SelectionSet,
    q_flags: &mut SelectionFlagQuery,
) {
    let Some(rect) = drag.rect() else { return };

    selection.clear_all(q_flags);
    for &unit in &drag.preserved {
        selection.drag_add(unit, q_flags);
    }
    for unit in registry.iter() {
        let Ok(transform) = q_positions.get(unit) else { continue };
        let Some(screen) = probe.world_to_screen(transform.translation) else { continue };
        if rect.contains(screen) {
            selection.drag_add(unit, q_flags);
        }
    }
}

/// Marker component for the selection box UI element
#[derive(Component)]
pub struct SelectionBox;

pub(super) fn setup_selection_box(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BorderColor::from(Color::WHITE),
        BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.1)),
        Visibility::Hidden,
        SelectionBox,
    ));
}

pub(super) fn draw_selection_box(
    drag: Res<DragRegion>,
    config: Res<GameConfig>,
    mut q_selection_box: Query<(&mut Node, &mut Visibility), With<SelectionBox>>,
) {
    let Ok((mut node, mut visibility)) = q_selection_box.single_mut() else { return };
    let Some(rect) = drag.visible_rect(config.selection_drag_threshold) else {
        *visibility = Visibility::Hidden;
        return;
    };

    *visibility = Visibility::Visible;
    node.left = Val::Px(rect.min.x);
    node.top = Val::Px(rect.min.y);
    node.width = Val::Px(rect.width());
    node.height = Val::Px(rect.height());
}
