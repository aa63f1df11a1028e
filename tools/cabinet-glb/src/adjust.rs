//! Rescale and reposition every vertex so the model lands in millimetres,
//! centred on X/Z and standing on the floor.

use std::fmt;

use anyhow::{Context, Result};
use cabinet_shared::{AdjustConfig, ScaleMode};
use glam::Vec3;
use serde::Serialize;
use tracing::info;

use crate::bounds::Bounds;
use crate::model::Model;

/// Per-axis scale followed by a translation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub scale: Vec3,
    pub offset: Vec3,
}

impl Adjustment {
    pub fn apply(&self, p: [f32; 3]) -> [f32; 3] {
        (Vec3::from(p) * self.scale + self.offset).to_array()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjustReport {
    pub mode: ScaleMode,
    pub vertex_count: usize,
    pub adjustment: Adjustment,
    pub original: Bounds,
    pub scaled: Bounds,
    pub result: Bounds,
    /// Only for `fit`: largest resulting dimension vs. largest target
    pub fit_check: Option<FitCheck>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FitCheck {
    pub largest: f32,
    pub target: f32,
    pub tolerance: f32,
    pub within_tolerance: bool,
}

fn mode_scale(bounds: &Bounds, config: &AdjustConfig) -> Result<Vec3> {
    let target = Vec3::from(config.target().to_array());
    let size = bounds.size();

    let needs_extent = matches!(config.scale_mode, ScaleMode::Fit | ScaleMode::Stretch);
    if needs_extent && size.cmple(Vec3::ZERO).any() {
        anyhow::bail!(
            "Cannot use '{}' scaling: model has zero extent on an axis (size {:?})",
            config.scale_mode,
            size.to_array()
        );
    }

    Ok(match config.scale_mode {
        ScaleMode::MetersToMm => Vec3::splat(1000.0),
        ScaleMode::CmToMm => Vec3::splat(10.0),
        ScaleMode::Fit => Vec3::splat((target / size).min_element()),
        ScaleMode::Stretch => target / size,
        ScaleMode::None => Vec3::ONE,
    })
}

/// Work out scale and offset from the original bounds
pub fn plan_adjustment(bounds: &Bounds, config: &AdjustConfig) -> Result<Adjustment> {
    let scale = mode_scale(bounds, config)?;
    let scaled = Bounds {
        min: bounds.min * scale,
        max: bounds.max * scale,
    };
    let center = scaled.center();

    let mut offset = Vec3::ZERO;
    if config.center_xz {
        offset.x = -center.x;
        offset.z = -center.z;
    }
    if config.floor_y {
        offset.y = -scaled.min.y;
    }
    Ok(Adjustment { scale, offset })
}

/// Adjust the vertices of `model` in place
pub fn adjust_model(model: &mut Model, config: &AdjustConfig) -> Result<AdjustReport> {
    let positions = model.read_positions().context("Failed to read vertices")?;
    let Some(original) = Bounds::from_points(positions.iter().copied()) else {
        anyhow::bail!("Model has no vertices to adjust");
    };
    info!("Read {} vertices", positions.len());

    let adjustment = plan_adjustment(&original, config)?;
    let scaled = Bounds {
        min: original.min * adjustment.scale,
        max: original.max * adjustment.scale,
    };

    let adjusted: Vec<[f32; 3]> = positions.iter().map(|p| adjustment.apply(*p)).collect();
    model
        .write_positions(&adjusted)
        .context("Failed to write vertices")?;

    let result = Bounds::from_points(adjusted.iter().copied()).unwrap_or(scaled);
    let fit_check = (config.scale_mode == ScaleMode::Fit).then(|| {
        let largest = result.size().max_element();
        let target = config.target().max_extent();
        FitCheck {
            largest,
            target,
            tolerance: config.tolerance_mm,
            within_tolerance: (largest - target).abs() < config.tolerance_mm,
        }
    });

    Ok(AdjustReport {
        mode: config.scale_mode,
        vertex_count: positions.len(),
        adjustment,
        original,
        scaled,
        result,
        fit_check,
    })
}

fn fmt_size(f: &mut fmt::Formatter<'_>, label: &str, b: &Bounds, precision: usize) -> fmt::Result {
    let s = b.size();
    let c = b.center();
    writeln!(f, "{label}:")?;
    writeln!(
        f,
        "  Size:   {:.p$} x {:.p$} x {:.p$}",
        s.x,
        s.y,
        s.z,
        p = precision
    )?;
    writeln!(
        f,
        "  Center: ({:.p$}, {:.p$}, {:.p$})",
        c.x,
        c.y,
        c.z,
        p = precision
    )?;
    writeln!(
        f,
        "  Min:    ({:.p$}, {:.p$}, {:.p$})",
        b.min.x,
        b.min.y,
        b.min.z,
        p = precision
    )?;
    writeln!(
        f,
        "  Max:    ({:.p$}, {:.p$}, {:.p$})",
        b.max.x,
        b.max.y,
        b.max.z,
        p = precision
    )
}

impl fmt::Display for AdjustReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices: {}", self.vertex_count)?;
        writeln!(f, "Scale mode: {}", self.mode)?;
        fmt_size(f, "Original", &self.original, 4)?;

        let s = self.adjustment.scale;
        writeln!(f, "Scale: x{:.4} / x{:.4} / x{:.4}", s.x, s.y, s.z)?;
        fmt_size(f, "Scaled", &self.scaled, 2)?;

        let o = self.adjustment.offset;
        writeln!(f, "Offset: ({:.2}, {:.2}, {:.2})", o.x, o.y, o.z)?;
        fmt_size(f, "Final", &self.result, 2)?;

        if let Some(check) = &self.fit_check {
            if check.within_tolerance {
                writeln!(
                    f,
                    "Largest dimension {:.2} mm matches target {:.0} mm (tolerance {} mm)",
                    check.largest, check.target, check.tolerance
                )?;
            } else {
                writeln!(
                    f,
                    "Largest dimension {:.2} mm differs from target {:.0} mm by more than {} mm",
                    check.largest, check.target, check.tolerance
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: [f32; 3], max: [f32; 3]) -> Bounds {
        Bounds {
            min: min.into(),
            max: max.into(),
        }
    }

    fn config(mode: ScaleMode) -> AdjustConfig {
        AdjustConfig {
            scale_mode: mode,
            ..Default::default()
        }
    }

    fn assert_close(a: Vec3, b: [f32; 3]) {
        assert!(
            (a - Vec3::from(b)).abs().max_element() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_meters_to_mm_centres_and_floors() {
        let original = bounds([0.1, 0.2, -0.02], [0.7, 0.9, 0.48]);
        let plan = plan_adjustment(&original, &config(ScaleMode::MetersToMm)).unwrap();
        assert_eq!(plan.scale, Vec3::splat(1000.0));
        assert_close(plan.offset, [-400.0, -200.0, -230.0]);

        let min = plan.apply(original.min.to_array());
        let max = plan.apply(original.max.to_array());
        assert_close(min.into(), [-300.0, 0.0, -250.0]);
        assert_close(max.into(), [300.0, 700.0, 250.0]);
    }

    #[test]
    fn test_cm_to_mm() {
        let original = bounds([0.0; 3], [60.0, 70.0, 50.0]);
        let plan = plan_adjustment(&original, &config(ScaleMode::CmToMm)).unwrap();
        assert_eq!(plan.scale, Vec3::splat(10.0));
    }

    #[test]
    fn test_fit_uses_smallest_ratio() {
        // Target 600 x 700 x 500
        let original = bounds([0.0; 3], [1.0, 1.0, 1.0]);
        let plan = plan_adjustment(&original, &config(ScaleMode::Fit)).unwrap();
        assert_eq!(plan.scale, Vec3::splat(500.0));
    }

    #[test]
    fn test_stretch_per_axis() {
        let original = bounds([0.0; 3], [2.0, 7.0, 5.0]);
        let plan = plan_adjustment(&original, &config(ScaleMode::Stretch)).unwrap();
        assert_close(plan.scale, [300.0, 100.0, 100.0]);
    }

    #[test]
    fn test_zero_extent_rejected_for_fit_and_stretch() {
        let flat = bounds([0.0; 3], [1.0, 0.0, 1.0]);
        assert!(plan_adjustment(&flat, &config(ScaleMode::Fit)).is_err());
        assert!(plan_adjustment(&flat, &config(ScaleMode::Stretch)).is_err());
        assert!(plan_adjustment(&flat, &config(ScaleMode::MetersToMm)).is_ok());
    }

    #[test]
    fn test_no_centering() {
        let original = bounds([1.0, 2.0, 3.0], [2.0, 3.0, 4.0]);
        let cfg = AdjustConfig {
            scale_mode: ScaleMode::None,
            center_xz: false,
            floor_y: false,
            ..Default::default()
        };
        let plan = plan_adjustment(&original, &cfg).unwrap();
        assert_eq!(plan.scale, Vec3::ONE);
        assert_eq!(plan.offset, Vec3::ZERO);
    }
}
