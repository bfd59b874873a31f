use bevy::prelude::*;

/// Settings for health bar display
#[derive(Resource)]
pub struct HealthBarSettings {
    pub show: bool,
}

impl Default for HealthBarSettings {
    fn default() -> Self {
        Self { show: true }
    }
}

/// Shared mesh handles for unit rendering
#[derive(Resource)]
pub struct UnitMesh {
    pub unit: Handle<Mesh>,
    pub ring: Handle<Mesh>,
    pub quad: Handle<Mesh>,
}

/// Shared material handles for unit rendering. Player units swap between the
/// three combat-state materials on every state entry.
#[derive(Resource)]
pub struct UnitMaterials {
    pub idle: Handle<StandardMaterial>,
    pub following: Handle<StandardMaterial>,
    pub attacking: Handle<StandardMaterial>,
    pub enemy: Handle<StandardMaterial>,
    pub selection_ring: Handle<StandardMaterial>,
    pub health_bar: Handle<StandardMaterial>,
    pub order_marker: Handle<StandardMaterial>,
}

fn unlit(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        unlit: true,
        cull_mode: None, // Double sided
        ..default()
    }
}

/// Sets up shared unit rendering resources (meshes and materials)
pub(super) fn setup_unit_resources(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(UnitMesh {
        unit: meshes.add(Capsule3d::default()),
        ring: meshes.add(Annulus::new(0.6, 0.7)),
        quad: meshes.add(Rectangle::new(1.0, 0.15)),
    });

    commands.insert_resource(UnitMaterials {
        idle: materials.add(Color::srgb(0.2, 0.4, 0.9)),
        following: materials.add(Color::srgb(0.9, 0.8, 0.2)),
        attacking: materials.add(Color::srgb(0.9, 0.3, 0.2)),
        enemy: materials.add(Color::srgb(0.5, 0.1, 0.1)),
        selection_ring: materials.add(unlit(Color::srgb(0.2, 1.0, 0.2))),
        health_bar: materials.add(unlit(Color::srgb(0.0, 1.0, 0.0))),
        order_marker: materials.add(unlit(Color::srgb(1.0, 1.0, 1.0))),
    });
}
