use bevy::prelude::*;
use crate::game::CommandSet;

mod input;
mod spatial;
mod selection;
mod selection_box;
mod commands;
mod debug;

pub use input::PointerInput;
pub use spatial::{surfaces, Surface, SurfaceHit, SpatialProbe, ScreenProjection,
                  TopDownProjection, CameraProjection};
pub use selection::{SelectionSet, SelectionFlags, SelectionFlagQuery, OrderMarker};
pub use selection_box::DragRegion;
pub use commands::{AttackCursor, GroundOrder, GROUND_MARKER_HEIGHT};

use input::read_pointer_input;
use spatial::{refresh_probe_targets, refresh_camera_projection};
use selection_box::{update_selection_box, setup_selection_box, draw_selection_box};
use commands::{dispatch_primary_click, dispatch_orders, draw_attack_cursor};
use debug::handle_debug_spawning;

/// Selection and order dispatch. Reads [`PointerInput`]; works headless.
pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerInput>()
           .init_resource::<SpatialProbe>()
           .init_resource::<SelectionSet>()
           .init_resource::<DragRegion>()
           .init_resource::<AttackCursor>()
           .add_message::<GroundOrder>()
           .add_systems(Update, refresh_probe_targets.in_set(CommandSet::Input))
           .add_systems(Update, dispatch_primary_click.in_set(CommandSet::Select))
           .add_systems(Update, update_selection_box.in_set(CommandSet::Box))
           .add_systems(Update, dispatch_orders.in_set(CommandSet::Orders));
    }
}

/// Windowed adapters: mouse/keyboard into [`PointerInput`], camera-driven
/// hit testing, the drag-box overlay, the attack cursor and debug spawning.
pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_selection_box)
           .add_systems(Update, read_pointer_input.before(CommandSet::Input))
           .add_systems(Update, (
               refresh_camera_projection.before(refresh_probe_targets),
               handle_debug_spawning.after(refresh_probe_targets),
           ).in_set(CommandSet::Input))
           .add_systems(Update, (
               draw_selection_box,
               draw_attack_cursor,
           ).after(CommandSet::Cleanup));
    }
}
