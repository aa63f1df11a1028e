//! Axis aligned bounding boxes

use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box holding every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Option<Self> {
        points
            .into_iter()
            .map(Vec3::from)
            .fold(None, |acc: Option<Self>, p| {
                Some(match acc {
                    Some(bounds) => bounds.including(p),
                    None => Self::point(p),
                })
            })
    }

    pub fn including(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }
}
