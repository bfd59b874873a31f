use bevy::prelude::*;

use crate::game::config::GameConfig;

use super::components::AttackProfile;

/// Radii overlay state, toggled at runtime.
#[derive(Resource, Default)]
pub struct CombatDebug {
    pub show_radii: bool,
}

pub(super) fn toggle_radii_overlay(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut debug: ResMut<CombatDebug>,
) {
    if keys.just_pressed(config.key_debug_radii) {
        debug.show_radii = !debug.show_radii;
        let state = if debug.show_radii { "ON" } else { "OFF" };
        info!("Combat radii overlay: {}", state);
    }
}

/// Detect (green), attack (red) and disengage (yellow) rings around every combat unit.
pub(super) fn draw_engage_radii(
    debug: Res<CombatDebug>,
    q_units: Query<(&Transform, &AttackProfile)>,
    mut gizmos: Gizmos,
) {
    if !debug.show_radii {
        return;
    }

    let flat = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
    for (transform, profile) in q_units.iter() {
        let radii = profile.radii();
        let at = Isometry3d::new(transform.translation.with_y(0.05), flat);
        gizmos.circle(at, radii.detect(), Color::srgb(0.0, 1.0, 0.0));
        gizmos.circle(at, radii.attack(), Color::srgb(1.0, 0.0, 0.0));
        gizmos.circle(at, radii.disengage(), Color::srgb(1.0, 1.0, 0.0));
    }
}
