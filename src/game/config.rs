use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::CommandSet;
use crate::game::combat::{AttackProfile, EngageRadii};
use crate::game::unit::{Health, UnitDefaults};

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. Defines the unit template every
/// spawned unit is built from; a template that breaks the combat radii ordering
/// is a fatal setup error.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    // Unit template
    pub unit_max_health: f32,
    pub unit_damage: f32,
    pub attack_rate: f32,
    pub detect_radius: f32,
    pub attack_radius: f32,
    pub disengage_radius: f32,
    pub stopping_distance: f32,
    pub move_speed: f32,
    pub unit_radius: f32,

    // Demo skirmish layout
    pub skirmish_player_units: usize,
    pub skirmish_enemy_units: usize,
    pub skirmish_enemy_spread: f32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            unit_max_health: 100.0,
            unit_damage: 10.0,
            attack_rate: 1.0,
            detect_radius: 2.0,
            attack_radius: 1.0,
            disengage_radius: 1.2,
            stopping_distance: 0.2,
            move_speed: 5.0,
            unit_radius: 0.6,
            skirmish_player_units: 8,
            skirmish_enemy_units: 6,
            skirmish_enemy_spread: 4.0,
        }
    }
}

impl InitialConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Validates the unit template and converts it into spawn defaults.
    pub fn unit_defaults(&self) -> Result<UnitDefaults, ConfigError> {
        let radii = EngageRadii::new(self.detect_radius, self.attack_radius, self.disengage_radius)?;
        let attack = AttackProfile::new(self.unit_damage, self.attack_rate, radii)?;
        let health = Health::new(self.unit_max_health)?;

        if !(self.move_speed > 0.0) {
            return Err(ConfigError::NonPositiveMoveSpeed(self.move_speed));
        }
        if !(self.stopping_distance >= 0.0) {
            return Err(ConfigError::NegativeStoppingDistance(self.stopping_distance));
        }
        if !(self.unit_radius > 0.0) {
            return Err(ConfigError::NonPositiveUnitRadius(self.unit_radius));
        }

        Ok(UnitDefaults {
            health,
            attack,
            stopping_distance: self.stopping_distance,
            move_speed: self.move_speed,
            unit_radius: self.unit_radius,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("attack radius must be positive, got {0}")]
    NonPositiveAttackRadius(f32),
    #[error("disengage radius {disengage} is smaller than attack radius {attack}")]
    DisengageInsideAttack { attack: f32, disengage: f32 },
    #[error("detect radius {detect} is smaller than disengage radius {disengage}")]
    DetectInsideDisengage { detect: f32, disengage: f32 },
    #[error("attack rate must be positive, got {0}")]
    NonPositiveAttackRate(f32),
    #[error("damage per hit must not be negative, got {0}")]
    NegativeDamage(f32),
    #[error("max health must be positive, got {0}")]
    NonPositiveMaxHealth(f32),
    #[error("move speed must be positive, got {0}")]
    NonPositiveMoveSpeed(f32),
    #[error("stopping distance must not be negative, got {0}")]
    NegativeStoppingDistance(f32),
    #[error("unit radius must be positive, got {0}")]
    NonPositiveUnitRadius(f32),
}

/// Runtime configuration that can be hot-reloaded during gameplay (controls,
/// camera, debug keys). Also lives as a resource so the headless core can read
/// it without the asset pipeline.
#[derive(Resource, Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
#[serde(default)]
pub struct GameConfig {
    // Pointer bindings
    pub primary_button: MouseButton,
    pub secondary_button: MouseButton,
    pub multi_select_keys: Vec<KeyCode>,

    // Camera
    pub key_camera_forward: KeyCode,
    pub key_camera_backward: KeyCode,
    pub key_camera_left: KeyCode,
    pub key_camera_right: KeyCode,
    pub camera_speed: f32,
    pub camera_zoom_speed: f32,

    // Debug
    pub key_spawn_player_unit: KeyCode,
    pub key_spawn_enemy_unit: KeyCode,
    pub key_debug_radii: KeyCode,
    pub key_toggle_health_bars: KeyCode,

    // Selection
    pub selection_drag_threshold: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            primary_button: MouseButton::Left,
            secondary_button: MouseButton::Right,
            multi_select_keys: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            key_camera_forward: KeyCode::KeyW,
            key_camera_backward: KeyCode::KeyS,
            key_camera_left: KeyCode::KeyA,
            key_camera_right: KeyCode::KeyD,
            camera_speed: 20.0,
            camera_zoom_speed: 50.0,
            key_spawn_player_unit: KeyCode::KeyP,
            key_spawn_enemy_unit: KeyCode::KeyE,
            key_debug_radii: KeyCode::F1,
            key_toggle_health_bars: KeyCode::KeyH,
            selection_drag_threshold: 0.0,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, (load_initial_config, setup_runtime_config).chain())
           .add_systems(Update, sync_runtime_config.before(CommandSet::Input));
    }
}

/// Load static initial configuration synchronously at startup.
///
/// A missing or unparsable file falls back to defaults. A file that parses but
/// describes an invalid unit template stops the app.
pub fn load_initial_config(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    let path = Path::new(INITIAL_CONFIG_PATH);
    let config = match InitialConfig::from_file(path) {
        Ok(config) => {
            info!("Loaded initial config from {}", INITIAL_CONFIG_PATH);
            config
        }
        Err(e) => {
            error!("{}", e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    };

    match config.unit_defaults() {
        Ok(defaults) => {
            commands.insert_resource(defaults);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("Invalid unit template in {}: {}", INITIAL_CONFIG_PATH, e);
            exit.write(AppExit::error());
        }
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

/// Copy the runtime config asset into the resource whenever it loads or changes.
fn sync_runtime_config(
    config_handle: Res<GameConfigHandle>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
    mut active: ResMut<GameConfig>,
) {
    for event in events.read() {
        if event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id()) {
            if let Some(config) = game_configs.get(&config_handle.0) {
                info!("Runtime config loaded/updated (controls, camera, debug settings)");
                *active = config.clone();
            }
        }
    }
}
