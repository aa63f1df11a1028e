//! `cabinet-tools.toml` parsing
//!
//! Every section is optional; a missing file means "use the defaults".
//!
//! ```toml
//! [adjust]
//! target_width = 600.0
//! target_height = 700.0
//! target_depth = 500.0
//! scale_mode = "meters-to-mm"
//! center_xz = true
//! floor_y = true
//!
//! [flatten]
//! keep = ["BODY", "DOOR"]
//!
//! [generator]
//! output_dir = "public/js/cabinets"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::units::Dimensions;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "cabinet-tools.toml";

/// Top-level configuration shared by `cabinet-glb` and `cabinet-gen`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub adjust: AdjustConfig,
    #[serde(default)]
    pub flatten: FlattenConfig,
    #[serde(default)]
    pub measure: MeasureConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl ToolsConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used when present and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ToolsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// How `adjust` scales vertex positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Multiply by 1000
    #[default]
    MetersToMm,
    /// Multiply by 10
    CmToMm,
    /// Uniform scale so the model fits inside the target box
    Fit,
    /// Per-axis scale to exactly the target box
    Stretch,
    /// Keep the current size (only re-centre)
    None,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 5] = [
        ScaleMode::MetersToMm,
        ScaleMode::CmToMm,
        ScaleMode::Fit,
        ScaleMode::Stretch,
        ScaleMode::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleMode::MetersToMm => "meters-to-mm",
            ScaleMode::CmToMm => "cm-to-mm",
            ScaleMode::Fit => "fit",
            ScaleMode::Stretch => "stretch",
            ScaleMode::None => "none",
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ScaleMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = ScaleMode::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown scale mode '{}' (expected {})", s, valid.join(" | "))
            })
    }
}

/// `[adjust]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdjustConfig {
    pub target_width: f32,
    pub target_height: f32,
    pub target_depth: f32,
    pub scale_mode: ScaleMode,
    /// Move the bounding box centre to X = 0, Z = 0
    pub center_xz: bool,
    /// Move the lowest vertex to Y = 0
    pub floor_y: bool,
    /// Allowed deviation from the target size in `fit` mode (mm)
    pub tolerance_mm: f32,
}

impl AdjustConfig {
    pub fn target(&self) -> Dimensions {
        Dimensions::new(self.target_width, self.target_height, self.target_depth)
    }
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            target_width: 600.0,
            target_height: 700.0,
            target_depth: 500.0,
            scale_mode: ScaleMode::default(),
            center_xz: true,
            floor_y: true,
            tolerance_mm: 5.0,
        }
    }
}

/// `[flatten]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Node names lifted to the top level; everything else is dropped
    pub keep: Vec<String>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        let keep = [
            "BODY",
            "DOOR",
            "INSULATION",
            "INSULATION_FRAME",
            "PANEL.003",
            "DIN_RAIL_40.001",
            "DIN_RAIL_40.002",
            "DIN_RAIL_40.003",
        ];
        Self {
            keep: keep.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[measure]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    pub expected_width: f32,
    pub expected_height: f32,
    pub expected_depth: f32,
}

impl MeasureConfig {
    pub fn expected(&self) -> Dimensions {
        Dimensions::new(
            self.expected_width,
            self.expected_height,
            self.expected_depth,
        )
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            expected_width: 700.0,
            expected_height: 500.0,
            expected_depth: 240.0,
        }
    }
}

/// `[generator]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Default `basePath` of the generated `assemble()` method
    pub models_base_path: String,
    /// Directory (relative to the project root) receiving `<Class>/<Class>.js`
    pub output_dir: String,
    /// Catalog file relative to the project root
    pub catalog: String,
    /// Scale applied to every loaded component (FreeCAD mm → scene metres)
    pub component_scale: f64,
    /// `mountingType` written to catalog entries
    pub mounting_type: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            models_base_path: "./assets/models/freecad".to_string(),
            output_dir: "public/js/cabinets".to_string(),
            catalog: "public/assets/models/cabinets/catalog.json".to_string(),
            component_scale: 0.001,
            mounting_type: "din_rail".to_string(),
        }
    }
}
