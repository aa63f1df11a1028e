//! End-to-end generation into a temporary project tree

use std::path::Path;

use cabinet_gen::catalog::Catalog;
use cabinet_gen::{GenerateOptions, class_output_path, generate};
use cabinet_shared::GeneratorConfig;
use serde_json::json;
use tempfile::tempdir;

const SOURCE: &str = "public/assets/models/freecad/TS_700_500_250";

fn write_schema(dir: &Path, name: &str, schema: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_string(&schema).unwrap()).unwrap();
}

fn project(root: &Path) {
    let source = root.join(SOURCE);
    std::fs::create_dir_all(&source).unwrap();
    write_schema(
        &source,
        "body_700_500_250.json",
        json!({ "vertices": [0.35, 0.5, 0.125, -0.35, 0.0, -0.125] }),
    );
    write_schema(
        &source,
        "door_700_500_250.json",
        json!({ "objects": [{ "geometry": { "vertices": [[0.35, 0.5, 0.25]] } }] }),
    );
    // Broken component is skipped
    std::fs::write(source.join("broken.json"), "{ not json").unwrap();
    std::fs::write(source.join("notes.txt"), "ignored").unwrap();
}

fn options(root: &Path) -> GenerateOptions {
    GenerateOptions {
        source: SOURCE.into(),
        project_root: root.to_path_buf(),
        class_name: None,
        update_catalog: true,
        dry_run: false,
    }
}

#[test]
fn test_generate_class_and_catalog() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let config = GeneratorConfig::default();

    let generated = generate(&options(dir.path()), &config).unwrap();
    assert_eq!(generated.class_name, "TS_700_500_250");
    let names: Vec<&str> = generated
        .components
        .iter()
        .map(|c| c.var_name.as_str())
        .collect();
    assert_eq!(names, ["body_700_500_250", "broken", "door_700_500_250"]);
    assert_eq!(generated.dimensions.width, 350);
    assert_eq!(generated.dimensions.height, 500);
    assert_eq!(generated.dimensions.depth, 250);

    let output = dir
        .path()
        .join("public/js/cabinets/TS_700_500_250/TS_700_500_250.js");
    assert_eq!(generated.output, output);
    let code = std::fs::read_to_string(&output).unwrap();
    assert!(code.contains("export class TS_700_500_250 {"));
    assert!(code.contains("`${basePath}/TS_700_500_250/door_700_500_250.json`"));
    assert!(code.contains("this.components['door_700_500_250'] = await this.loader.load("));

    let catalog = Catalog::load(&dir.path().join(config.catalog)).unwrap();
    assert_eq!(catalog.ids().collect::<Vec<_>>(), ["TS_700_500_250"]);
    assert_eq!(catalog.cabinets[0]["dimensions"]["width"], 350);
}

#[test]
fn test_regenerate_replaces_catalog_entry() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let config = GeneratorConfig::default();

    generate(&options(dir.path()), &config).unwrap();
    generate(&options(dir.path()), &config).unwrap();

    let catalog = Catalog::load(&dir.path().join(config.catalog)).unwrap();
    assert_eq!(catalog.cabinets.len(), 1);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let config = GeneratorConfig::default();
    let options = GenerateOptions {
        dry_run: true,
        class_name: Some("Compact".to_string()),
        ..options(dir.path())
    };

    let generated = generate(&options, &config).unwrap();
    assert!(generated.code.contains("export class Compact {"));
    assert!(generated.catalog.is_none());
    assert!(!class_output_path(dir.path(), &config, "Compact").exists());
    assert!(!dir.path().join(&config.catalog).exists());
}

#[test]
fn test_no_catalog() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let config = GeneratorConfig::default();
    let options = GenerateOptions {
        update_catalog: false,
        ..options(dir.path())
    };

    let generated = generate(&options, &config).unwrap();
    assert!(generated.output.exists());
    assert!(!dir.path().join(&config.catalog).exists());
}

#[test]
fn test_empty_or_missing_folder_is_error() {
    let dir = tempdir().unwrap();
    let config = GeneratorConfig::default();
    assert!(generate(&options(dir.path()), &config).is_err());

    std::fs::create_dir_all(dir.path().join(SOURCE)).unwrap();
    let err = generate(&options(dir.path()), &config).unwrap_err();
    assert!(err.to_string().contains("No JSON component files"));
}

#[test]
fn test_invalid_class_name_is_error() {
    let dir = tempdir().unwrap();
    project(dir.path());
    let options = GenerateOptions {
        class_name: Some("700-cabinet".to_string()),
        ..options(dir.path())
    };
    assert!(generate(&options, &GeneratorConfig::default()).is_err());
}
