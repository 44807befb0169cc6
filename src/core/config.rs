use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::{constants, PrepError};

/// One raw dataset to walk: `raw_root/<name>/<subset>/**/*.<ext>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub subsets: Vec<String>,
    /// Tried in order; the first extension with any match is used.
    pub extensions: Vec<String>,
}

impl DatasetConfig {
    pub fn new(name: &str, subsets: &[&str], extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subsets: subsets.iter().map(|s| s.to_string()).collect(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub cascade_path: Option<PathBuf>,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub min_face_size: i32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cascade_path: None,
            scale_factor: constants::DEFAULT_SCALE_FACTOR,
            min_neighbors: constants::DEFAULT_MIN_NEIGHBORS,
            min_face_size: constants::DEFAULT_MIN_FACE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub raw_root: PathBuf,
    pub processed_root: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
    pub frame_interval: u32,
    pub jpeg_quality: i32,
    pub log_dir: PathBuf,
    pub datasets: Vec<DatasetConfig>,
    pub detector: DetectorConfig,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            raw_root: PathBuf::from(constants::DEFAULT_RAW_ROOT),
            processed_root: PathBuf::from(constants::DEFAULT_PROCESSED_ROOT),
            target_width: constants::DEFAULT_TARGET_SIZE,
            target_height: constants::DEFAULT_TARGET_SIZE,
            frame_interval: constants::DEFAULT_FRAME_INTERVAL,
            jpeg_quality: constants::DEFAULT_JPEG_QUALITY,
            log_dir: PathBuf::from("."),
            datasets: vec![
                DatasetConfig::new(
                    constants::REPLAY_ATTACK,
                    constants::REPLAY_ATTACK_SUBSETS,
                    constants::REPLAY_ATTACK_EXTENSIONS,
                ),
                DatasetConfig::new(
                    constants::OULU_NPU,
                    constants::OULU_NPU_SUBSETS,
                    constants::OULU_NPU_EXTENSIONS,
                ),
            ],
            detector: DetectorConfig::default(),
        }
    }
}

impl PrepConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PrepConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Keeps only the datasets whose names are listed (case-insensitive).
    pub fn retain_datasets(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.datasets
            .retain(|ds| names.iter().any(|n| n.eq_ignore_ascii_case(&ds.name)));
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(PrepError::Config(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.frame_interval == 0 {
            return Err(PrepError::Config("frame_interval must be > 0".to_string()));
        }
        if !(0..=100).contains(&self.jpeg_quality) {
            return Err(PrepError::Config(format!(
                "jpeg_quality must be between 0 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if self.datasets.is_empty() {
            return Err(PrepError::Config("no datasets configured".to_string()));
        }
        for ds in &self.datasets {
            if ds.subsets.is_empty() {
                return Err(PrepError::Config(format!("dataset {} has no subsets", ds.name)));
            }
            if ds.extensions.is_empty() {
                return Err(PrepError::Config(format!("dataset {} has no video extensions", ds.name)));
            }
        }
        if self.detector.scale_factor <= 1.0 {
            return Err(PrepError::Config(format!(
                "detector.scale_factor must be > 1.0, got {}",
                self.detector.scale_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = PrepConfig::default();
        assert_eq!((config.target_width, config.target_height), (256, 256));
        assert_eq!(config.frame_interval, 5);
        assert_eq!(config.datasets.len(), 2);
        assert_eq!(config.datasets[1].extensions, vec!["avi", "mp4"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PrepConfig =
            serde_json::from_str(r#"{ "frame_interval": 10, "detector": { "min_neighbors": 3 } }"#).unwrap();
        assert_eq!(config.frame_interval, 10);
        assert_eq!(config.detector.min_neighbors, 3);
        assert_eq!(config.detector.scale_factor, constants::DEFAULT_SCALE_FACTOR);
        assert_eq!(config.target_width, 256);
        assert_eq!(config.datasets, PrepConfig::default().datasets);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("spoofprep_config_load");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prep.json");

        let mut original = PrepConfig::default();
        original.raw_root = PathBuf::from("/datasets/raw");
        fs::write(&path, original.to_json().unwrap()).unwrap();

        let loaded = PrepConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PrepConfig::default();
        config.frame_interval = 0;
        assert!(matches!(config.validate(), Err(PrepError::Config(_))));

        let mut config = PrepConfig::default();
        config.target_height = 0;
        assert!(config.validate().is_err());

        let mut config = PrepConfig::default();
        config.jpeg_quality = 101;
        assert!(config.validate().is_err());

        let mut config = PrepConfig::default();
        config.datasets[0].extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retain_datasets_is_case_insensitive() {
        let mut config = PrepConfig::default();
        config.retain_datasets(&["oulu-npu".to_string()]);
        assert_eq!(config.datasets.len(), 1);
        assert_eq!(config.datasets[0].name, "OULU-NPU");

        let mut config = PrepConfig::default();
        config.retain_datasets(&[]);
        assert_eq!(config.datasets.len(), 2);
    }
}
