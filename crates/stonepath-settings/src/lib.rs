//! Stonepath Settings Crate
//!
//! Handles application configuration: defaults for every placement engine,
//! unit preferences, export preferences and logging level, persisted as
//! JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    Config, CurveFillerSettings, ExportSettings, GeneralSettings, RhinestoneDefaults,
    UnitSettings,
};
pub use error::{SettingsError, SettingsResult};
