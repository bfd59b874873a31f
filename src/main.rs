use bevy::prelude::*;

use bevy::window::WindowResolution;

use vanguard::game::config::INITIAL_CONFIG_PATH;
use vanguard::game::GamePlugin;

use bevy::log::LogPlugin;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "vanguard_";
const KEPT_RUNS: usize = 25;

/// Selection and order routing log at info; combat transitions are debug-level
/// and opt in through `RUST_LOG=vanguard::game::combat=debug`.
const DEFAULT_FILTER: &str =
    "wgpu=error,bevy_render=info,bevy_ecs=info,vanguard=info,vanguard::game::combat=info";

fn setup_file_logging() -> PathBuf {
    let log_dir = PathBuf::from(LOG_DIR);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create {LOG_DIR} directory: {e}");
    }

    prune_old_logs(&log_dir);

    let now = chrono::Local::now();
    let log_filename = format!("{LOG_PREFIX}{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename);

    // One file per run
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path
}

fn prune_old_logs(log_dir: &Path) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };

    let runs: Vec<(PathBuf, Option<SystemTime>)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| is_run_log(&e.path()))
        .map(|e| (e.path(), e.metadata().ok().and_then(|m| m.modified().ok())))
        .collect();

    for path in logs_to_prune(runs, KEPT_RUNS) {
        let _ = fs::remove_file(path);
    }
}

fn is_run_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
}

/// Oldest runs beyond `keep`, leaving room for the log this run is about to open.
fn logs_to_prune(mut runs: Vec<(PathBuf, Option<SystemTime>)>, keep: usize) -> Vec<PathBuf> {
    let keep = keep.saturating_sub(1);
    if runs.len() <= keep {
        return Vec::new();
    }
    runs.sort_by_key(|(_, modified)| *modified);
    let excess = runs.len() - keep;
    runs.into_iter().take(excess).map(|(path, _)| path).collect()
}

fn main() {
    let log_file = setup_file_logging();
    info!(
        "Vanguard {} starting: initial config {}, logging to {}",
        env!("CARGO_PKG_VERSION"),
        INITIAL_CONFIG_PATH,
        log_file.display()
    );

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vanguard".into(),
                resolution: WindowResolution::new(1280, 720),
                resizable: true,
                ..default()
            }),
            ..default()
        }).build().disable::<LogPlugin>()) // Subscriber installed above
        .add_plugins(GamePlugin)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run(name: &str, age_secs: u64) -> (PathBuf, Option<SystemTime>) {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 - age_secs);
        (PathBuf::from(LOG_DIR).join(name), Some(modified))
    }

    #[test]
    fn only_run_logs_are_candidates() {
        assert!(is_run_log(Path::new("logs/vanguard_20261019_101500.log")));
        assert!(!is_run_log(Path::new("logs/vanguard_20261019_101500.txt")));
        assert!(!is_run_log(Path::new("logs/other_20261019_101500.log")));
    }

    #[test]
    fn prunes_oldest_runs_first() {
        let runs = vec![run("vanguard_b.log", 20), run("vanguard_a.log", 30), run("vanguard_c.log", 10)];
        let pruned = logs_to_prune(runs, 2);
        assert_eq!(pruned, vec![
            PathBuf::from(LOG_DIR).join("vanguard_a.log"),
            PathBuf::from(LOG_DIR).join("vanguard_b.log"),
        ]);
    }

    #[test]
    fn keeps_everything_under_the_limit() {
        let runs = vec![run("vanguard_a.log", 30)];
        assert!(logs_to_prune(runs, KEPT_RUNS).is_empty());
    }
}
