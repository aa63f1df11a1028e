//! Integration tests for the GLB commands.
//!
//! Each test:
//! 1. Generates the cabinet GLB programmatically
//! 2. Runs a command through the cabinet-glb library
//! 3. Reloads the written file and checks the result

use std::path::{Path, PathBuf};

use cabinet_glb::{Model, adjust, export, flatten, inspect, materials, measure, units};
use cabinet_shared::{AdjustConfig, FlattenConfig, MeasureConfig, ScaleMode, Units};
use glb_builder::shapes::{CABINET_SIZE, cabinet_glb};
use tempfile::tempdir;

fn write_cabinet(dir: &Path, scale: f32) -> PathBuf {
    let path = dir.join("cabinet.glb");
    std::fs::write(&path, cabinet_glb(scale)).expect("Failed to write GLB");
    path
}

fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < 0.01,
        "{what}: expected {expected}, got {actual}"
    );
}

#[test]
fn test_inspect_cabinet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let model = Model::load(&write_cabinet(dir.path(), 1.0)).expect("Failed to load GLB");

    let report = inspect::inspect(&model).unwrap();
    assert_eq!(report.container.version, 2);
    assert_eq!(report.counts.nodes, 6);
    assert_eq!(report.counts.meshes, 3);
    assert_eq!(report.counts.materials, 3);
    assert_eq!(report.generator.as_deref(), Some("glb-builder"));

    let kinds: Vec<&str> = report.nodes.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds, ["Mesh #0", "Group", "Mesh #1", "Mesh #2", "Empty", "Group"]);
    assert!(report.names.contains(&"Node: DIN_RAIL_40.001".to_string()));
    assert!(report.names.contains(&"Mesh: DOOR".to_string()));

    assert_eq!(report.hierarchy[0], "Scene");
    assert!(report.hierarchy[1].trim_start().starts_with("Cabinet [Group]"));
    assert!(
        report
            .hierarchy
            .iter()
            .any(|l| l.trim_start() == "BODY_mesh [Mesh #0] (8 vertices)")
    );

    let geometry = report.geometry.as_ref().expect("Missing geometry");
    assert_eq!(geometry.vertex_count, 24);
    assert_eq!(geometry.units, Units::Meters);
    assert_close(geometry.size_mm[0], CABINET_SIZE[0] * 1000.0, "width");
    assert!(!geometry.on_floor);

    // Text and JSON renderings both work
    assert!(report.to_string().contains("Recommendations:"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["counts"]["meshes"], 3);
}

#[test]
fn test_measure_first_mesh() {
    let dir = tempdir().expect("Failed to create temp dir");
    let model = Model::load(&write_cabinet(dir.path(), 1.0)).unwrap();

    let report = measure::measure(
        &model.root,
        model.container,
        MeasureConfig::default().expected(),
    );
    assert_eq!(report.mesh_name.as_deref(), Some("BODY"));
    let extent = report.accessor.unwrap().extent.unwrap();
    assert!(extent.looks_like_meters);
    assert_close(extent.size[1], CABINET_SIZE[1], "height");
    // Model is the expected 700 x 500 x 240 cabinet in metres
    assert!((extent.scale_factor - 1000.0).abs() < 1.0);
}

#[test]
fn test_units_of_millimetre_model() {
    let dir = tempdir().expect("Failed to create temp dir");
    let model = Model::load(&write_cabinet(dir.path(), 1000.0)).unwrap();

    let report = units::check_units(&model.root).unwrap();
    assert_eq!(report.units, Units::Millimeters);
    assert_close(report.size_mm[2], 240.0, "depth");
}

#[test]
fn test_adjust_meters_to_mm() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_cabinet(dir.path(), 1.0);
    let output = dir.path().join("cabinet_adjusted.glb");

    let mut model = Model::load(&input).unwrap();
    let report = adjust::adjust_model(&mut model, &AdjustConfig::default()).unwrap();
    assert_eq!(report.vertex_count, 24);
    assert!(report.fit_check.is_none());
    model.save(&output).unwrap();

    let adjusted = Model::load(&output).expect("Adjusted GLB must reload");
    let bounds = adjusted.declared_bounds().unwrap();
    assert_close(bounds.size().x, 700.0, "width");
    assert_close(bounds.size().y, 500.0, "height");
    assert_close(bounds.size().z, 240.0, "depth");
    assert_close(bounds.min.y, 0.0, "floor");
    assert_close(bounds.center().x, 0.0, "center x");
    assert_close(bounds.center().z, 0.0, "center z");

    // Structure is untouched
    assert_eq!(adjusted.root.nodes.len(), 6);

    // Third party reader agrees
    let (document, _buffers, _) = gltf::import(&output).expect("Failed to import GLB");
    assert_eq!(document.meshes().count(), 3);

    // And the inspection heuristics now pass
    let geometry = inspect::inspect(&adjusted).unwrap().geometry.unwrap();
    assert_eq!(geometry.units, Units::Millimeters);
    assert!(geometry.centered_xz);
    assert!(geometry.on_floor);
}

#[test]
fn test_adjust_fit_reports_tolerance() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut model = Model::load(&write_cabinet(dir.path(), 1.0)).unwrap();

    let config = AdjustConfig {
        scale_mode: ScaleMode::Fit,
        ..Default::default()
    };
    let report = adjust::adjust_model(&mut model, &config).unwrap();
    let check = report.fit_check.expect("fit mode reports a check");
    // 600/0.7 is the tightest ratio, so width lands exactly on 600
    assert_close(report.result.size().x, 600.0, "width");
    assert_close(check.target, 700.0, "largest target");
    assert!(!check.within_tolerance);
}

#[test]
fn test_flatten_default_parts() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_cabinet(dir.path(), 1.0);
    let output = dir.path().join("cabinet_flat.glb");

    let mut model = Model::load(&input).unwrap();
    let before = model.read_positions().unwrap();
    let report = flatten::flatten(&mut model.root, &FlattenConfig::default().keep);
    model.save(&output).unwrap();

    assert_eq!(report.nodes_before, 6);
    assert_eq!(report.nodes_after, 3);

    let flat = Model::load(&output).expect("Flattened GLB must reload");
    let names: Vec<&str> = flat
        .root
        .nodes
        .iter()
        .filter_map(|n| n.name.as_deref())
        .collect();
    assert_eq!(names, ["BODY", "DOOR", "DIN_RAIL_40.001"]);
    assert!(flat.root.nodes.iter().all(|n| n.children.is_none()));
    assert_eq!(flat.root.nodes[0].mesh.map(|m| m.value()), Some(0));
    assert_eq!(flat.root.nodes[1].translation, Some([0.0, 0.0, 0.001]));

    let scene: Vec<usize> = flat.root.scenes[0]
        .nodes
        .iter()
        .map(|n| n.value())
        .collect();
    assert_eq!(scene, [0, 1, 2]);

    // Binary data copied unchanged
    assert_eq!(flat.read_positions().unwrap(), before);
}

#[test]
fn test_materials_apply_preset() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_cabinet(dir.path(), 1.0);
    let output = dir.path().join("cabinet_materials.glb");

    let mut model = Model::load(&input).unwrap();
    let updated = materials::apply_preset(
        &mut model.root,
        &materials::METAL_RAIL,
        &["Metal*".to_string()],
    )
    .unwrap();
    assert_eq!(updated, ["MetalRail"]);
    model.save(&output).unwrap();

    let (document, _, _) = gltf::import(&output).expect("Failed to import GLB");
    let rail = document
        .materials()
        .find(|m| m.name() == Some("MetalRail"))
        .unwrap();
    let pbr = rail.pbr_metallic_roughness();
    assert_eq!(pbr.metallic_factor(), 0.95);
    assert_eq!(pbr.roughness_factor(), 0.35);

    let body = document
        .materials()
        .find(|m| m.name() == Some("CabinetBody"))
        .unwrap();
    assert_eq!(body.pbr_metallic_roughness().metallic_factor(), 1.0);
}

#[test]
fn test_export_json_world_space() {
    let dir = tempdir().expect("Failed to create temp dir");
    let model = Model::load(&write_cabinet(dir.path(), 1.0)).unwrap();

    let options = export::ExportOptions {
        precision: Some(3),
        ..Default::default()
    };
    let geometry = export::export_geometry(&model, options).unwrap();
    let names: Vec<&str> = geometry.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["BODY_mesh", "DOOR", "DIN_RAIL_40.001"]);
    assert_eq!(geometry.total_vertices(), 24);
    assert_eq!(geometry.total_triangles(), 36);

    // Door translation is baked into its vertices
    let door = &geometry.objects[1];
    let max_z = door
        .geometry
        .vertices
        .iter()
        .map(|v| v[2])
        .fold(f32::MIN, f32::max);
    assert_close(max_z, 0.221, "door front");
    assert_eq!(door.opacity, Some(0.4));

    let path = dir.path().join("cabinet.json");
    std::fs::write(&path, export::to_json(&geometry, false).unwrap()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["objects"].as_array().unwrap().len(), 3);
    assert_eq!(value["metadata"]["precision"], 3);
}
