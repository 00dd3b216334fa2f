//! Configuration and settings management for Stonepath
//!
//! Provides configuration file handling, defaults and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - General settings (logging)
//! - Units (document unit, output precision)
//! - Curve filler defaults
//! - Rhinestone defaults
//! - Export preferences
//!
//! A [`Config`] is loaded once at startup and passed by reference to whatever
//! needs it.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stonepath_core::LengthUnit;
use stonepath_designer::rhinestone::stones::is_known_size;
use stonepath_designer::{AngleMode, ExportFormat, FillSettings, PatternType, RhinestoneSettings};

const CONFIG_DIR_NAME: &str = "stonepath";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default `tracing` level when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Unit preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    /// Unit assumed for job inputs that do not declare one
    pub default_unit: LengthUnit,
    /// Decimal places for reported lengths
    pub decimal_places: u8,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            default_unit: LengthUnit::Mm,
            decimal_places: 3,
        }
    }
}

/// Curve filler defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveFillerSettings {
    /// Fixed spacing in mm
    pub default_spacing: f64,
    pub angle_mode: AngleMode,
    pub fixed_angle: f64,
    pub collision_detection: bool,
    pub remove_overlaps: bool,
    pub use_element_size: bool,
}

impl Default for CurveFillerSettings {
    fn default() -> Self {
        let fill = FillSettings::default();
        Self {
            default_spacing: fill.spacing_value,
            angle_mode: fill.angle_mode,
            fixed_angle: fill.fixed_angle,
            collision_detection: fill.collision_detection,
            remove_overlaps: fill.remove_overlaps,
            use_element_size: fill.use_element_size,
        }
    }
}

impl CurveFillerSettings {
    /// Fill settings seeded from these defaults
    pub fn fill_settings(&self) -> FillSettings {
        FillSettings {
            spacing_value: self.default_spacing,
            angle_mode: self.angle_mode,
            fixed_angle: self.fixed_angle,
            collision_detection: self.collision_detection,
            remove_overlaps: self.remove_overlaps,
            use_element_size: self.use_element_size,
            ..FillSettings::default()
        }
    }
}

/// Rhinestone defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhinestoneDefaults {
    pub stone_size: String,
    pub pattern: PatternType,
    pub density: f64,
    /// Minimum gap between stones in mm
    pub min_gap: f64,
    pub gap_optimization: bool,
    pub remove_overlaps: bool,
}

impl Default for RhinestoneDefaults {
    fn default() -> Self {
        let stones = RhinestoneSettings::default();
        Self {
            stone_size: stones.stone_size,
            pattern: stones.pattern,
            density: stones.density,
            min_gap: stones.min_gap,
            gap_optimization: stones.gap_optimization,
            remove_overlaps: stones.remove_overlaps,
        }
    }
}

impl RhinestoneDefaults {
    /// Rhinestone settings seeded from these defaults
    pub fn rhinestone_settings(&self) -> RhinestoneSettings {
        RhinestoneSettings {
            stone_size: self.stone_size.clone(),
            pattern: self.pattern,
            density: self.density,
            min_gap: self.min_gap,
            gap_optimization: self.gap_optimization,
            remove_overlaps: self.remove_overlaps,
            ..RhinestoneSettings::default()
        }
    }
}

/// Export preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportSettings {
    pub default_format: ExportFormat,
    /// Directory for relative output paths; the job file's directory when unset
    pub output_dir: Option<PathBuf>,
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralSettings,
    pub units: UnitSettings,
    pub curve_filler: CurveFillerSettings,
    pub rhinestone: RhinestoneDefaults,
    pub export: ExportSettings,
}

enum ConfigFormat {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<ConfigFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location in the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load `path`, or defaults when the file does not exist yet
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.general.log_level.to_ascii_lowercase().as_str()) {
            return Err(SettingsError::invalid(
                "general.log_level",
                format!("unknown level '{}'", self.general.log_level),
            ));
        }

        if self.units.decimal_places > 9 {
            return Err(SettingsError::invalid("units.decimal_places", "must be at most 9"));
        }

        let fill = &self.curve_filler;
        if !(fill.default_spacing.is_finite() && fill.default_spacing > 0.0) {
            return Err(SettingsError::invalid("curve_filler.default_spacing", "must be > 0"));
        }
        if !fill.fixed_angle.is_finite() {
            return Err(SettingsError::invalid("curve_filler.fixed_angle", "must be finite"));
        }

        let stones = &self.rhinestone;
        if !is_known_size(&stones.stone_size) {
            return Err(SettingsError::invalid(
                "rhinestone.stone_size",
                format!("unknown stone size '{}'", stones.stone_size),
            ));
        }
        if !(0.1..=1.0).contains(&stones.density) {
            return Err(SettingsError::invalid("rhinestone.density", "must be within 0.1..=1.0"));
        }
        if !(stones.min_gap.is_finite() && stones.min_gap >= 0.0) {
            return Err(SettingsError::invalid("rhinestone.min_gap", "must be >= 0"));
        }

        Ok(())
    }
}
