//! Quick unit check from the declared accessor bounds

use std::fmt;

use anyhow::Result;
use cabinet_shared::Units;
use gltf_json as json;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::model::declared_bounds;

#[derive(Debug, Clone, Serialize)]
pub struct UnitsReport {
    pub bounds: Bounds,
    pub size: [f32; 3],
    pub average_extent: f32,
    pub units: Units,
    /// Size converted to millimetres
    pub size_mm: [f32; 3],
}

/// Union every POSITION accessor's `min`/`max` and guess the unit
pub fn check_units(root: &json::Root) -> Result<UnitsReport> {
    let Some(bounds) = declared_bounds(root) else {
        anyhow::bail!("No POSITION accessor declares min/max");
    };

    let size = bounds.size();
    let average_extent = (size.x + size.y + size.z) / 3.0;
    let units = Units::from_average_extent(average_extent);

    Ok(UnitsReport {
        bounds,
        size: size.to_array(),
        average_extent,
        units,
        size_mm: (size * units.to_mm_factor()).to_array(),
    })
}

impl fmt::Display for UnitsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = (self.bounds.min, self.bounds.max);
        let [x, y, z] = self.size;
        writeln!(f, "Min: [{:.4}, {:.4}, {:.4}]", min.x, min.y, min.z)?;
        writeln!(f, "Max: [{:.4}, {:.4}, {:.4}]", max.x, max.y, max.z)?;
        writeln!(f, "\nSize:")?;
        writeln!(f, "  X (width):  {x:.4}")?;
        writeln!(f, "  Y (height): {y:.4}")?;
        writeln!(f, "  Z (depth):  {z:.4}")?;

        match self.units {
            Units::Meters => {
                let [mx, my, mz] = self.size_mm;
                writeln!(f, "\nUnits: meters (average extent {:.3} m)", self.average_extent)?;
                writeln!(f, "  In millimetres: {mx:.1} x {my:.1} x {mz:.1} mm")
            }
            units => writeln!(
                f,
                "\nUnits: {units} (average extent {:.1} mm)",
                self.average_extent
            ),
        }
    }
}
