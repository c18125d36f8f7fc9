use crate::partition::{DEFAULT_CELLSIZE, DEFAULT_NUDGE};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub fov: FovConfig,
    #[serde(default)]
    pub maze: MazeConfig,
    #[serde(default)]
    pub ghosts: GhostsConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ArenaConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct PartitionConfig {
    #[serde(default = "default_partition_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cellsize")]
    pub cellsize: f64,
    #[serde(default = "default_nudge")]
    pub nudge: f64,
    #[serde(default = "default_cache_path")]
    pub cache_path: String,
}

#[derive(Debug, Deserialize)]
pub struct FovConfig {
    /// "fan" for the exact polygon, "sweep" for the ray sweep
    #[serde(default = "default_fov_mode")]
    pub mode: String,
    #[serde(default = "default_angular_step")]
    pub angular_step: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    #[serde(default = "default_seam_epsilon")]
    pub seam_epsilon: f64,
    #[serde(default = "default_history_seconds")]
    pub history_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct MazeConfig {
    #[serde(default = "default_maze_cols")]
    pub cols: i32,
    #[serde(default = "default_maze_rows")]
    pub rows: i32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub random_walls: usize,
}

#[derive(Debug, Deserialize)]
pub struct GhostsConfig {
    #[serde(default = "default_ghost_count")]
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
    #[serde(default)]
    pub show_partition: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_width() -> f64 { 1000.0 }
fn default_height() -> f64 { 600.0 }
fn default_partition_enabled() -> bool { true }
fn default_cellsize() -> f64 { DEFAULT_CELLSIZE }
fn default_nudge() -> f64 { DEFAULT_NUDGE }
fn default_cache_path() -> String { "partition.json".to_string() }
fn default_fov_mode() -> String { "fan".to_string() }
fn default_angular_step() -> f64 { 0.01 }
fn default_max_distance() -> f64 { 2000.0 }
fn default_seam_epsilon() -> f64 { 0.5 }
fn default_history_seconds() -> f64 { 3.0 }
fn default_maze_cols() -> i32 { 10 }
fn default_maze_rows() -> i32 { 6 }
fn default_seed() -> u64 { 1 }
fn default_ghost_count() -> usize { 8 }
fn default_window_title() -> String { "Museum Ghosts - Visibility Demo".to_string() }
fn default_bg_r() -> u8 { 20 }
fn default_bg_g() -> u8 { 20 }
fn default_bg_b() -> u8 { 28 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            enabled: default_partition_enabled(),
            cellsize: default_cellsize(),
            nudge: default_nudge(),
            cache_path: default_cache_path(),
        }
    }
}

impl Default for FovConfig {
    fn default() -> Self {
        Self {
            mode: default_fov_mode(),
            angular_step: default_angular_step(),
            max_distance: default_max_distance(),
            seam_epsilon: default_seam_epsilon(),
            history_seconds: default_history_seconds(),
        }
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cols: default_maze_cols(),
            rows: default_maze_rows(),
            seed: default_seed(),
            random_walls: 0,
        }
    }
}

impl Default for GhostsConfig {
    fn default() -> Self {
        Self {
            count: default_ghost_count(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
            show_partition: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            partition: PartitionConfig::default(),
            fov: FovConfig::default(),
            maze: MazeConfig::default(),
            ghosts: GhostsConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Unknown names fall back to `Info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl FovConfig {
    pub fn use_sweep(&self) -> bool {
        self.mode.eq_ignore_ascii_case("sweep")
    }
}

impl Config {
    /// Load configuration from `path`, or use defaults if it doesn't exist
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {:?}: {}", path, e);
                    log::warn!("Using default configuration");
                    Config::default()
                }
            },
            Err(_) => {
                log::info!("No {:?} found, using default configuration", path);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.arena.width, 1000.0);
        assert_eq!(config.partition.cellsize, 100.0);
        assert!(config.partition.enabled);
        assert_eq!(config.fov.mode, "fan");
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [partition]
            cellsize = 50.0

            [fov]
            mode = "Sweep"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.partition.cellsize, 50.0);
        assert_eq!(config.partition.nudge, 0.01);
        assert_eq!(config.partition.cache_path, "partition.json");
        assert!(config.fov.use_sweep());
        assert_eq!(config.fov.angular_step, 0.01);
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_bad_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from("does/not/exist/config.toml");
        assert_eq!(config.ghosts.count, 8);
        assert_eq!(config.maze.random_walls, 0);
    }
}
