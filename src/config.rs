use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{CanvasError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// editor config
    pub editor: EditorConfig,
    /// store config
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// maximum number of history snapshots, defaults to 100
    pub history_capacity: usize,
    /// node footprint width in model pixels
    pub node_width: f64,
    /// node footprint height in model pixels
    pub node_height: f64,
    /// radius around a port midpoint that counts as a press on the port
    pub port_hit_radius: f64,
    /// snap detector thresholds
    pub snap: SnapConfig,
    /// auto-scroll behaviour while dragging
    pub auto_scroll: AutoScrollConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapConfig {
    /// max distance from a pending branch endpoint, in pixels
    pub endpoint_radius: f64,
    /// max perpendicular distance from a connection segment, in pixels
    pub line_distance: f64,
    /// excluded fraction at each end of a segment, range (0, 0.5)
    pub line_exclusion: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoScrollConfig {
    /// distance from the viewport edge that triggers scrolling
    pub edge_margin: f64,
    /// pan offset applied per tick
    pub step: f64,
    /// tick interval in milliseconds
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
    /// file store config
    pub file: Option<FileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    Mem,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// directory holding one sub-directory per organization
    pub root: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            node_width: 60.0,
            node_height: 60.0,
            port_hit_radius: 10.0,
            snap: SnapConfig::default(),
            auto_scroll: AutoScrollConfig::default(),
        }
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            endpoint_radius: 60.0,
            line_distance: 50.0,
            line_exclusion: 0.20,
        }
    }
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_margin: 40.0,
            step: 12.0,
            interval_ms: 30,
        }
    }
}

impl AutoScrollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| CanvasError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.editor.history_capacity == 0 {
            return Err(CanvasError::Config("history_capacity must be at least 1".into()));
        }
        let exclusion = self.editor.snap.line_exclusion;
        if !(0.0..0.5).contains(&exclusion) {
            return Err(CanvasError::Config(format!("line_exclusion must be in [0, 0.5), got {}", exclusion)));
        }
        if self.editor.node_width <= 0.0 || self.editor.node_height <= 0.0 {
            return Err(CanvasError::Config("node size must be positive".into()));
        }
        if self.store.store_type == StoreType::File && self.store.file.is_none() {
            return Err(CanvasError::Config("[store.file] is required when store_type is file".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Config, StoreType};

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [editor]
        history_capacity = 50

        [editor.snap]
        endpoint_radius = 40.0

        [store]
        store_type = "file"

        [store.file]
        root = "/var/lib/flowcanvas"
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.editor.history_capacity, 50);
        assert_eq!(config.editor.snap.endpoint_radius, 40.0);
        assert_eq!(config.editor.snap.line_distance, 50.0);
        assert_eq!(config.editor.node_width, 60.0);
        assert_eq!(config.store.store_type, StoreType::File);
        assert_eq!(config.store.file.unwrap().root, "/var/lib/flowcanvas");
    }

    #[test]
    fn test_config_empty_uses_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.editor.history_capacity, 100);
        assert_eq!(config.editor.auto_scroll.interval_ms, 30);
        assert_eq!(config.store.store_type, StoreType::Mem);
    }

    #[test]
    fn test_config_rejects_file_store_without_root() {
        let toml_str = r#"
        [store]
        store_type = "file"
        "#;
        assert!(Config::load_from_str(toml_str).is_err());
    }

    #[test]
    fn test_config_rejects_bad_exclusion() {
        let toml_str = r#"
        [editor.snap]
        line_exclusion = 0.6
        "#;
        assert!(Config::load_from_str(toml_str).is_err());
    }
}
