use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::game::config::GameConfig;

/// Logical pointer state for the current tick. The command layer reads only
/// this; the windowed build fills it from the mouse and keyboard, tests script it.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub primary_pressed: bool,
    pub primary_held: bool,
    pub primary_released: bool,
    pub secondary_pressed: bool,
    pub modifier_held: bool,
    /// Screen coordinates, top-left origin.
    pub cursor: Vec2,
}

pub(super) fn read_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    config: Res<GameConfig>,
    mut pointer: ResMut<PointerInput>,
) {
    pointer.primary_pressed = mouse_button.just_pressed(config.primary_button);
    pointer.primary_held = mouse_button.pressed(config.primary_button);
    pointer.primary_released = mouse_button.just_released(config.primary_button);
    pointer.secondary_pressed = mouse_button.just_pressed(config.secondary_button);
    pointer.modifier_held = keys.any_pressed(config.multi_select_keys.iter().copied());

    // Keep the last known position while the cursor is outside the window
    if let Some(cursor) = q_window.iter().next().and_then(|w| w.cursor_position()) {
        pointer.cursor = cursor;
    }
}
