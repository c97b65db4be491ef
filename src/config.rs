use crate::color::{self, Rgb};
use crate::settings::{ClearMode, CursorSettings, ParticleConfig, MAX_BIND_DISTANCE, MAX_PARTICLES};
#[cfg(test)]
use crate::settings::{MAX_RADIUS_LIMIT, MAX_SPEED_LIMIT};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Particle count; None derives it from the canvas width
    pub particles: Option<usize>,
    /// Particle link threshold; None derives it from the count
    pub bind_distance: Option<f32>,
    pub particle: ParticleConfig,
    pub cursor: CursorSettings,
    pub clear_mode: ClearMode,
    /// Canvas background, `#RRGGBB`
    pub background: String,
    /// Target frame rate
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            particles: None,
            bind_distance: None,
            particle: ParticleConfig::default(),
            cursor: CursorSettings::default(),
            clear_mode: ClearMode::default(),
            background: color::BACKGROUND.to_string(),
            fps: 60,
        }
    }
}

impl AppConfig {
    /// Default location: `<config dir>/particle-field/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("particle-field").join("config.json"))
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load an explicit path, else the default path if it exists, else defaults.
    /// Returns the config and the file it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Ok((Self::load_from_file(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        self.particle.validate()?;
        self.cursor.validate()?;
        Rgb::parse_hex(&self.background).context("bad background color")?;
        ensure!((1..=240).contains(&self.fps), "fps must be between 1 and 240, got {}", self.fps);
        if let Some(count) = self.particles {
            ensure!(count <= MAX_PARTICLES, "particles must be at most {}, got {}", MAX_PARTICLES, count);
        }
        if let Some(distance) = self.bind_distance {
            ensure!(
                distance.is_finite() && (0.0..=MAX_BIND_DISTANCE).contains(&distance),
                "bind_distance must be between 0 and {}, got {}",
                MAX_BIND_DISTANCE,
                distance
            );
        }
        Ok(())
    }

    /// Particle count for a surface `width` dots wide: one per 50 dots, at least 15
    pub fn particle_count(&self, width: usize) -> usize {
        self.particles.unwrap_or_else(|| (width / 50).max(15)).min(MAX_PARTICLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig {
            particles: Some(42),
            bind_distance: Some(150.0),
            clear_mode: ClearMode::Trails,
            ..Default::default()
        };

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), config.to_json().unwrap()).unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_radius_and_speed_above_limits_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            r#"{ "particle": { "min_radius": 40, "max_radius": 50, "speed": 40, "max_speed": 45 } }"#,
        )
        .unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).is_err());

        fs::write(temp_file.path(), r#"{ "particle": { "max_speed": 31 } }"#).unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_limit_values_survive_adjustment() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            r#"{ "particle": { "min_radius": 30, "max_radius": 30, "speed": 30, "max_speed": 30 } }"#,
        )
        .unwrap();

        let mut loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        let particle = &mut loaded.particle;
        particle.adjust_max_radius(0.5);
        particle.adjust_max_radius(-0.5);
        assert_eq!(particle.max_radius, MAX_RADIUS_LIMIT);
        particle.adjust_max_speed(1.0);
        particle.adjust_max_speed(-1.0);
        assert_eq!(particle.max_speed, MAX_SPEED_LIMIT);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            r##"{ "particle": { "max_radius": 9.0, "colors": ["#FF6347"] }, "fps": 30 }"##,
        )
        .unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.fps, 30);
        assert_eq!(loaded.particle.max_radius, 9.0);
        assert_eq!(loaded.particle.min_radius, 3.5);
        assert_eq!(loaded.particle.colors, vec!["#FF6347".to_string()]);
        assert_eq!(loaded.cursor, CursorSettings::default());
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "not valid json").unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_semantically_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), r#"{ "background": "grey" }"#).unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).is_err());

        fs::write(temp_file.path(), r#"{ "fps": 0 }"#).unwrap();
        assert!(AppConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/path/config.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_particle_count_from_width() {
        let config = AppConfig::default();
        assert_eq!(config.particle_count(100), 15);
        assert_eq!(config.particle_count(1000), 20);
        assert_eq!(config.particle_count(1_000_000), MAX_PARTICLES);

        let config = AppConfig {
            particles: Some(7),
            ..Default::default()
        };
        assert_eq!(config.particle_count(1000), 7);
    }
}
