//! Cabinet class generator library
//!
//! Turns a folder of FreeCAD component schemas into a JavaScript cabinet
//! class for the configurator and registers it in the cabinet catalog.

pub mod catalog;
pub mod generator;
pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::Result;
use cabinet_shared::GeneratorConfig;
use cabinet_shared::fs::write_creating_dirs;
use tracing::{debug, info};

use catalog::{CatalogEntry, update_catalog};
use generator::{ClassGenerator, is_js_identifier};
use schema::{CabinetDimensions, Component, analyze_components, calculate_dimensions};

/// What to generate and where
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Component folder, relative to `project_root` unless absolute
    pub source: PathBuf,
    pub project_root: PathBuf,
    /// Defaults to the folder name
    pub class_name: Option<String>,
    pub update_catalog: bool,
    /// Render only, write nothing
    pub dry_run: bool,
}

/// Result of one generation run
#[derive(Debug)]
pub struct Generated {
    pub class_name: String,
    pub components: Vec<Component>,
    pub dimensions: CabinetDimensions,
    pub code: String,
    /// Class file, written unless dry-run
    pub output: PathBuf,
    /// Catalog that was updated
    pub catalog: Option<PathBuf>,
}

/// `<root>/<output_dir>/<Class>/<Class>.js`
pub fn class_output_path(
    project_root: &Path,
    config: &GeneratorConfig,
    class_name: &str,
) -> PathBuf {
    project_root
        .join(&config.output_dir)
        .join(class_name)
        .join(format!("{}.js", class_name))
}

/// Generate the class for one cabinet folder
pub fn generate(options: &GenerateOptions, config: &GeneratorConfig) -> Result<Generated> {
    let source = options.project_root.join(&options.source);
    if !source.is_dir() {
        anyhow::bail!("Folder '{}' not found", source.display());
    }

    let folder_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Cannot take a class name from {}", source.display()))?
        .to_string();
    let class_name = options.class_name.clone().unwrap_or_else(|| folder_name.clone());
    if !is_js_identifier(&class_name) {
        anyhow::bail!(
            "'{}' is not a valid JavaScript class name (use --class-name)",
            class_name
        );
    }

    info!("Analyzing folder: {}", source.display());
    let components = analyze_components(&source)?;
    if components.is_empty() {
        anyhow::bail!("No JSON component files in {}", source.display());
    }
    info!("Found {} components", components.len());
    for component in &components {
        debug!(
            "  {} -> this.components['{}']",
            component.filename, component.var_name
        );
    }

    let dimensions = calculate_dimensions(&source, &components);
    info!("Cabinet dimensions: {} mm", dimensions);

    let code = ClassGenerator::new()?.render(
        &class_name,
        &folder_name,
        &components,
        dimensions,
        config,
    )?;

    let output = class_output_path(&options.project_root, config, &class_name);
    let mut catalog = None;
    if !options.dry_run {
        write_creating_dirs(&output, &code)?;
        info!("Generated class: {}", output.display());

        if options.update_catalog {
            let path = options.project_root.join(&config.catalog);
            let entry = CatalogEntry::new(&class_name, dimensions, &config.mounting_type);
            update_catalog(&path, &entry)?;
            info!("Updated catalog: {}", path.display());
            catalog = Some(path);
        }
    }

    Ok(Generated {
        class_name,
        components,
        dimensions,
        code,
        output,
        catalog,
    })
}
