//! PBR presets for the cabinet parts and applying them to GLB materials
//!
//! The presets mirror the Principled BSDF values the Blender material
//! scripts set up. Only the factors glTF carries in `pbrMetallicRoughness`
//! are written; IOR is listed for reference when rebuilding the material
//! in Blender.

use std::fmt;

use anyhow::Result;
use gltf_json as json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialPreset {
    pub id: &'static str,
    /// Material name the Blender scripts create
    pub material_name: &'static str,
    pub description: &'static str,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub ior: f32,
}

pub const METAL_RAIL: MaterialPreset = MaterialPreset {
    id: "metal-rail",
    material_name: "MetalRail_Material",
    description: "Galvanised DIN rail steel, slightly brushed",
    base_color: [0.75, 0.75, 0.75, 1.0],
    metallic: 0.95,
    roughness: 0.35,
    ior: 1.45,
};

pub const CABINET_BODY: MaterialPreset = MaterialPreset {
    id: "cabinet-body",
    material_name: "CabinetBody_ABS_Material",
    description: "RAL 7035 light grey ABS plastic, satin finish",
    base_color: [0.85, 0.85, 0.85, 1.0],
    metallic: 0.0,
    roughness: 0.40,
    ior: 1.54,
};

pub const PRESETS: [MaterialPreset; 2] = [METAL_RAIL, CABINET_BODY];

pub fn find_preset(id: &str) -> Result<MaterialPreset> {
    PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .copied()
        .ok_or_else(|| {
            let known: Vec<&str> = PRESETS.iter().map(|p| p.id).collect();
            anyhow::anyhow!("Unknown preset '{}' (expected {})", id, known.join(" | "))
        })
}

/// Exact name, or prefix match when the target ends with `*`
fn matches_target(name: &str, target: &str) -> bool {
    match target.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == target,
    }
}

impl MaterialPreset {
    fn apply_to(&self, material: &mut json::Material) {
        let pbr = &mut material.pbr_metallic_roughness;
        pbr.base_color_factor = json::material::PbrBaseColorFactor(self.base_color);
        pbr.metallic_factor = json::material::StrengthFactor(self.metallic);
        pbr.roughness_factor = json::material::StrengthFactor(self.roughness);
    }
}

/// Set the preset's factors on every material matching one of `targets`.
///
/// Returns the names of the updated materials; no match is an error.
pub fn apply_preset(
    root: &mut json::Root,
    preset: &MaterialPreset,
    targets: &[String],
) -> Result<Vec<String>> {
    let mut updated = Vec::new();
    for material in &mut root.materials {
        let Some(name) = material.name.clone() else {
            continue;
        };
        if targets.iter().any(|t| matches_target(&name, t)) {
            preset.apply_to(material);
            updated.push(name);
        }
    }

    if updated.is_empty() {
        anyhow::bail!("No material matches {}", targets.join(", "));
    }
    Ok(updated)
}

impl fmt::Display for MaterialPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.base_color;
        writeln!(f, "{} ({})", self.id, self.material_name)?;
        writeln!(f, "  {}", self.description)?;
        writeln!(f, "  Base color: ({r:.2}, {g:.2}, {b:.2})")?;
        writeln!(f, "  Metallic:   {:.2}", self.metallic)?;
        writeln!(f, "  Roughness:  {:.2}", self.roughness)?;
        writeln!(f, "  IOR:        {:.2}", self.ior)
    }
}
