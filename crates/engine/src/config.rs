use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::geometry::Vec2;

pub const SPATIAL_CONFIG_ENV_VAR: &str = "FARMSTEAD_SPATIAL_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub w: f32,
    pub h: f32,
}

impl CellSize {
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }
}

/// Grid dimensions consumed by the render and collision managers. Fixed at
/// process start.
///
/// Render cells must be at least as large as the largest sprite's screen
/// extent and collision cells at least as large as the largest hitbox, so a
/// one-cell margin (render) or the 3x3 neighbourhood (collision) is enough to
/// find every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialConfig {
    pub render_cell_size: CellSize,
    pub collision_cell_size: CellSize,
    pub viewport_margin_cells: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            render_cell_size: CellSize { w: 192.0, h: 192.0 },
            collision_cell_size: CellSize { w: 128.0, h: 128.0 },
            viewport_margin_cells: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read spatial config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse spatial config at {path} (field `{field}`): {message}")]
    Parse {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("invalid {field} in spatial config: {value} (expected a finite value > 0)")]
    InvalidCellSize { field: &'static str, value: f32 },
}

impl SpatialConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let deserializer = &mut serde_json::Deserializer::from_str(raw);
        let config: SpatialConfig =
            serde_path_to_error::deserialize(deserializer).map_err(|error| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    field: error.path().to_string(),
                    message: error.inner().to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("render_cell_size.w", self.render_cell_size.w),
            ("render_cell_size.h", self.render_cell_size.h),
            ("collision_cell_size.w", self.collision_cell_size.w),
            ("collision_cell_size.h", self.collision_cell_size.h),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidCellSize { field, value });
            }
        }
        Ok(())
    }

    /// Reads the config file named by [`SPATIAL_CONFIG_ENV_VAR`], falling back
    /// to defaults when the variable is unset or the file is unusable.
    pub fn from_env() -> Self {
        match env::var(SPATIAL_CONFIG_ENV_VAR) {
            Ok(value) => {
                let path = PathBuf::from(value);
                match Self::load(&path) {
                    Ok(config) => {
                        info!(path = %path.display(), "spatial_config_loaded");
                        config
                    }
                    Err(error) => {
                        warn!(
                            env_var = SPATIAL_CONFIG_ENV_VAR,
                            error = %error,
                            "invalid spatial config; falling back to defaults"
                        );
                        Self::default()
                    }
                }
            }
            Err(env::VarError::NotPresent) => Self::default(),
            Err(error) => {
                warn!(
                    env_var = SPATIAL_CONFIG_ENV_VAR,
                    error = %error,
                    "unable to read spatial config env var; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("spatial.json");
        fs::write(&path, text).expect("write config");
        path
    }

    #[test]
    fn defaults_are_valid() {
        SpatialConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn load_reads_partial_file_over_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, r#"{ "render_cell_size": { "w": 256.0, "h": 128.0 } }"#);

        let config = SpatialConfig::load(&path).expect("config");
        assert_eq!(config.render_cell_size, CellSize { w: 256.0, h: 128.0 });
        assert_eq!(
            config.collision_cell_size,
            SpatialConfig::default().collision_cell_size
        );
        assert_eq!(config.viewport_margin_cells, 1);
    }

    #[test]
    fn parse_error_reports_field_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, r#"{ "collision_cell_size": { "w": "wide", "h": 64.0 } }"#);

        let error = SpatialConfig::load(&path).expect_err("should fail");
        match error {
            ConfigError::Parse { field, .. } => assert_eq!(field, "collision_cell_size.w"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_cell_size_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, r#"{ "render_cell_size": { "w": 0.0, "h": 64.0 } }"#);

        let error = SpatialConfig::load(&path).expect_err("should fail");
        assert!(matches!(
            error,
            ConfigError::InvalidCellSize {
                field: "render_cell_size.w",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().expect("temp dir");
        let error = SpatialConfig::load(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
