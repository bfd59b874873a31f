use bevy::prelude::*;
use bevy::input::mouse::MouseWheel;

use crate::game::config::GameConfig;

pub struct RtsCameraPlugin;

impl Plugin for RtsCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
           .add_systems(Update, move_camera);
    }
}

#[derive(Component)]
pub struct RtsCamera;

fn spawn_camera(mut commands: Commands) {
    // High up, looking down at the skirmish at an angle
    let translation = Vec3::new(0.0, 18.0, 14.0);
    let look_at = Vec3::ZERO;

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(translation)
            .looking_at(look_at, Vec3::Y),
        RtsCamera,
    ));
}

fn move_camera(
    mut query: Query<&mut Transform, With<RtsCamera>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll_evr: MessageReader<MouseWheel>,
    config: Res<GameConfig>,
    time: Res<Time>,
) {
    let Ok(mut transform) = query.single_mut() else { return };
    let mut velocity = Vec3::ZERO;

    if keys.pressed(config.key_camera_forward) {
        velocity.z -= 1.0;
    }
    if keys.pressed(config.key_camera_backward) {
        velocity.z += 1.0;
    }
    if keys.pressed(config.key_camera_left) {
        velocity.x -= 1.0;
    }
    if keys.pressed(config.key_camera_right) {
        velocity.x += 1.0;
    }

    // Pan in the world XZ plane
    let velocity = velocity.normalize_or_zero() * config.camera_speed * time.delta_secs();
    transform.translation.x += velocity.x;
    transform.translation.z += velocity.z;

    // Zoom along the view direction
    for ev in scroll_evr.read() {
        let forward = transform.forward();
        transform.translation += forward * ev.y * config.camera_zoom_speed * time.delta_secs();
    }
}
