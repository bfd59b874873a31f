use bevy::prelude::*;
use rand::{rng, Rng};

mod camera;
pub mod config;
pub mod unit;
pub mod control;
pub mod movement;
pub mod combat;

use camera::RtsCameraPlugin;
use config::{GameConfig, GameConfigPlugin, InitialConfig};
use unit::{SpawnUnitCommand, Team, UnitPlugin, UnitRegistry, UnitVisualsPlugin};
use control::{ControlPlugin, PointerInputPlugin, SelectionSet};
use movement::MovementPlugin;
use combat::{CombatDebugPlugin, CombatPlugin};

/// Per-frame phases of the command layer. Chained in this order every frame:
/// selection must settle before orders are read, and units are only
/// despawned in `Cleanup` after every other phase has seen them.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum CommandSet {
    Input,    // Spawns, registry upkeep, spatial probe refresh
    Select,   // Primary click routing
    Box,      // Drag-box selection
    Orders,   // Secondary click routing and attack hover
    Movement, // Move orders and navigation
    Combat,   // Target acquisition and state machines
    Cleanup,  // Damage, health display, death
}

/// Number of command ticks run so far.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct CommandTick(pub u64);

impl CommandTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Headless core: selection, orders, movement and combat with no window,
/// assets or rendering. Tests drive this plugin directly.
pub struct CommandLayerPlugin;

impl Plugin for CommandLayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandTick>()
           .init_resource::<GameConfig>();

        app.configure_sets(Update, (
            CommandSet::Input,
            CommandSet::Select,
            CommandSet::Box,
            CommandSet::Orders,
            CommandSet::Movement,
            CommandSet::Combat,
            CommandSet::Cleanup,
        ).chain());

        app.add_plugins((
            UnitPlugin,
            ControlPlugin,
            MovementPlugin,
            CombatPlugin,
        ));

        app.add_systems(Update, (
            increment_command_tick.before(CommandSet::Input),
            log_command_status.after(CommandSet::Cleanup),
        ));
    }
}

/// Full game: the headless core plus window input, camera, config files and visuals.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            CommandLayerPlugin,
            GameConfigPlugin,
            RtsCameraPlugin,
            PointerInputPlugin,
            UnitVisualsPlugin,
            CombatDebugPlugin,
        ))
        .add_systems(Startup, setup_game.after(config::load_initial_config));
    }
}

fn increment_command_tick(mut tick: ResMut<CommandTick>) {
    tick.increment();
}

/// Log command layer status periodically
fn log_command_status(
    #[allow(unused_variables)] tick: Res<CommandTick>,
    #[allow(unused_variables)] registry: Res<UnitRegistry>,
    #[allow(unused_variables)] selection: Res<SelectionSet>,
) {
    use crate::profile_log;

    profile_log!(tick, "[COMMAND STATUS] Tick: {} | Units: {} | Selected: {}",
          tick.0, registry.len(), selection.len());
}

fn setup_game(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    initial_config: Option<Res<InitialConfig>>,
    mut spawns: MessageWriter<SpawnUnitCommand>,
) {
    let Some(config) = initial_config else { return };
    info!("Game setup started");

    // Ground Plane
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60.0, 60.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));

    // Light
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            intensity: 10_000_000.0,
            range: 100.0,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 8.0),
    ));

    // Player squad in a loose grid on the left
    let columns = 4;
    for i in 0..config.skirmish_player_units {
        let x = -8.0 - (i % columns) as f32 * 1.5;
        let z = (i / columns) as f32 * 1.5 - 2.0;
        spawns.write(SpawnUnitCommand {
            team: Team::Player,
            position: Vec3::new(x, 0.0, z),
        });
    }

    // Enemies scattered on the right
    let mut rng = rng();
    let spread = config.skirmish_enemy_spread.max(0.0);
    for _ in 0..config.skirmish_enemy_units {
        let x = 8.0 + rng.random_range(-spread..=spread);
        let z = rng.random_range(-spread..=spread);
        spawns.write(SpawnUnitCommand {
            team: Team::Enemy,
            position: Vec3::new(x, 0.0, z),
        });
    }

    info!("Queued {} player and {} enemy units",
          config.skirmish_player_units, config.skirmish_enemy_units);
}
