//! Shared types for the cabinet configurator asset tools.
//!
//! Holds the pieces both tools agree on: the GLB layout constants, unit
//! conventions used by the configurator (millimetres everywhere), the
//! `cabinet-tools.toml` configuration file and size-capped file reads.

pub mod asset_format;
pub mod config;
pub mod fs;
pub mod units;

pub use asset_format::{AssetFormat, GLB_FORMAT};
pub use config::{
    AdjustConfig, DEFAULT_CONFIG_FILE, FlattenConfig, GeneratorConfig, MeasureConfig, ScaleMode,
    ToolsConfig,
};
pub use units::{Dimensions, Units};
