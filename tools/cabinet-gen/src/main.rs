//! cabinet-gen CLI

use std::path::PathBuf;

use anyhow::Result;
use cabinet_gen::{GenerateOptions, generate};
use cabinet_shared::ToolsConfig;
use clap::Parser;

#[derive(Parser)]
#[command(name = "cabinet-gen")]
#[command(about = "Generate a cabinet JavaScript class from FreeCAD component schemas")]
#[command(version)]
struct Cli {
    /// Folder of component JSON schemas (relative to the project root)
    #[arg(long)]
    source: PathBuf,

    /// Project root (default: current directory)
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Leave catalog.json untouched
    #[arg(long)]
    no_catalog: bool,

    /// Class name (default: the folder name)
    #[arg(long)]
    class_name: Option<String>,

    /// Print the class instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Config file (defaults to ./cabinet-tools.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ToolsConfig::load(cli.config.as_deref())?;
    let options = GenerateOptions {
        source: cli.source,
        project_root: cli.project_root,
        class_name: cli.class_name,
        update_catalog: !cli.no_catalog,
        dry_run: cli.dry_run,
    };

    let generated = generate(&options, &config.generator)?;

    if options.dry_run {
        print!("{}", generated.code);
        return Ok(());
    }

    println!("✓ Class: {}", generated.output.display());
    if let Some(catalog) = &generated.catalog {
        println!("✓ Catalog: {}", catalog.display());
    }
    println!(
        "\nUsage:\n   await cabinetManager.addCabinetById('{}');",
        generated.class_name
    );

    Ok(())
}
