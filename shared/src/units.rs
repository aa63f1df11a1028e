//! Length units and cabinet dimensions.
//!
//! The configurator works in millimetres. Models arrive from Blender and
//! FreeCAD in metres, centimetres or millimetres and the tools guess which
//! from the size of the geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a model's coordinates are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Meters,
    Centimeters,
    Millimeters,
}

impl Units {
    /// Multiplier converting a length in this unit to millimetres
    pub fn to_mm_factor(self) -> f32 {
        match self {
            Units::Meters => 1000.0,
            Units::Centimeters => 10.0,
            Units::Millimeters => 1.0,
        }
    }

    /// Guess units from the bounding box diagonal.
    ///
    /// A cabinet is never smaller than 10 mm or larger than 10 m, so a
    /// diagonal below 10 means metres and below 100 means centimetres.
    pub fn from_diagonal(diagonal: f32) -> Self {
        if diagonal < 10.0 {
            Units::Meters
        } else if diagonal < 100.0 {
            Units::Centimeters
        } else {
            Units::Millimeters
        }
    }

    /// Guess units from the mean edge length of the bounding box.
    ///
    /// Coarser than [`Units::from_diagonal`]: only distinguishes metres
    /// from millimetres.
    pub fn from_average_extent(average: f32) -> Self {
        if average < 1.0 {
            Units::Meters
        } else {
            Units::Millimeters
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Units::Meters => "meters",
            Units::Centimeters => "centimeters",
            Units::Millimeters => "millimeters",
        };
        f.write_str(label)
    }
}

/// Outer cabinet dimensions in millimetres (X = width, Y = height, Z = depth)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.width, self.height, self.depth]
    }

    pub fn diagonal(self) -> f32 {
        (self.width * self.width + self.height * self.height + self.depth * self.depth).sqrt()
    }

    /// Largest of the three dimensions
    pub fn max_extent(self) -> f32 {
        self.width.max(self.height).max(self.depth)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {} mm", self.width, self.height, self.depth)
    }
}
