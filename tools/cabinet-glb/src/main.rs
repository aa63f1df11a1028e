//! cabinet-glb - GLB tooling for the cabinet configurator
//!
//! Inspects GLB exports from Blender/FreeCAD and rewrites them into the
//! shape the configurator expects (millimetres, origin at the bottom centre,
//! flat node list).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cabinet_shared::fs::write_creating_dirs;
use cabinet_shared::{GLB_FORMAT, ScaleMode, ToolsConfig};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use cabinet_glb::{
    Model, Validation, adjust, export, flatten, inspect, materials, measure, units,
};

#[derive(Parser)]
#[command(name = "cabinet-glb")]
#[command(about = "GLB inspection and adjustment for cabinet models")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./cabinet-tools.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full report: structure, materials, bounding box, recommendations
    Inspect(InspectArgs),

    /// Size of the first mesh from its accessor bounds
    Measure {
        /// Input GLB file
        input: PathBuf,
    },

    /// Guess the model's length unit from accessor bounds
    Units {
        /// Input GLB file
        input: PathBuf,
    },

    /// Scale, centre and floor every vertex
    Adjust(AdjustArgs),

    /// Lift the named parts to the top level and drop everything else
    Flatten(FlattenArgs),

    /// List or apply PBR material presets
    Materials {
        #[command(subcommand)]
        command: MaterialsCommand,
    },

    /// Export triangle geometry as Three.js BufferGeometry JSON
    ExportJson(ExportArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// Input GLB file
    input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AdjustArgs {
    /// Input GLB file
    input: PathBuf,

    /// Output GLB file (default: <input>_adjusted.glb)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scale mode: meters-to-mm, cm-to-mm, fit, stretch, none
    #[arg(long)]
    mode: Option<ScaleMode>,

    /// Target width in mm (fit/stretch)
    #[arg(long)]
    width: Option<f32>,

    /// Target height in mm (fit/stretch)
    #[arg(long)]
    height: Option<f32>,

    /// Target depth in mm (fit/stretch)
    #[arg(long)]
    depth: Option<f32>,

    /// Leave X/Z where they are
    #[arg(long)]
    no_center: bool,

    /// Leave Y where it is
    #[arg(long)]
    no_floor: bool,
}

#[derive(Args)]
struct FlattenArgs {
    /// Input GLB file
    input: PathBuf,

    /// Output GLB file (default: <input>_flat.glb)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Node name to keep (repeatable, replaces the configured list)
    #[arg(short, long = "keep")]
    keep: Vec<String>,

    /// Keep every node that owns a mesh
    #[arg(long, conflicts_with = "keep")]
    all_meshes: bool,
}

#[derive(Subcommand)]
enum MaterialsCommand {
    /// Show the available presets
    List,

    /// Apply a preset to matching materials
    Apply {
        /// Input GLB file
        input: PathBuf,

        /// Preset id (metal-rail, cabinet-body)
        #[arg(short, long)]
        preset: String,

        /// Material name to update; a trailing '*' matches a prefix
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,

        /// Output GLB file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Input GLB file
    input: PathBuf,

    /// Output JSON file (default: <input>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Round coordinates to this many decimals
    #[arg(long)]
    precision: Option<u32>,

    /// Write JSON without whitespace
    #[arg(long)]
    compact: bool,

    /// Add outline edges (boundaries and creases) to every object
    #[arg(long)]
    edges: bool,

    /// Crease angle in degrees for --edges (default: 30)
    #[arg(long, value_name = "DEG", requires = "edges")]
    edge_angle: Option<f32>,
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

    match cli.command {
        Commands::Inspect(args) => {
            let model = Model::load(&args.input)?;
            let report = inspect::inspect(&model)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("File: {}", args.input.display());
                print!("{report}");
            }
        }

        Commands::Measure { input } => {
            // Missing accessor bounds are part of the report
            let model = Model::load_with(&input, Validation::None)?;
            let report = measure::measure(&model.root, model.container, config.measure.expected());
            print!("{report}");
        }

        Commands::Units { input } => {
            let model = Model::load_with(&input, Validation::None)?;
            let report = units::check_units(&model.root)
                .with_context(|| format!("Cannot determine units of {}", input.display()))?;
            println!("Model: {}", input.display());
            print!("{report}");
        }

        Commands::Adjust(args) => {
            let mut adjust_config = config.adjust.clone();
            if let Some(mode) = args.mode {
                adjust_config.scale_mode = mode;
            }
            if let Some(width) = args.width {
                adjust_config.target_width = width;
            }
            if let Some(height) = args.height {
                adjust_config.target_height = height;
            }
            if let Some(depth) = args.depth {
                adjust_config.target_depth = depth;
            }
            adjust_config.center_xz &= !args.no_center;
            adjust_config.floor_y &= !args.no_floor;

            let output = args.output.unwrap_or_else(|| {
                GLB_FORMAT.sibling_path(&args.input, GLB_FORMAT.adjusted_suffix)
            });
            info!("Converting {:?} -> {:?}", args.input, output);
            info!(
                "Target {}, mode {}",
                adjust_config.target(),
                adjust_config.scale_mode
            );

            let mut model = Model::load(&args.input)?;
            let report = adjust::adjust_model(&mut model, &adjust_config)?;
            print!("{report}");
            model.save(&output)?;
            info!("Done!");
        }

        Commands::Flatten(args) => {
            let keep = if args.all_meshes {
                Vec::new()
            } else if args.keep.is_empty() {
                config.flatten.keep.clone()
            } else {
                args.keep
            };

            let output = args
                .output
                .unwrap_or_else(|| GLB_FORMAT.sibling_path(&args.input, GLB_FORMAT.flat_suffix));
            info!("Converting {:?} -> {:?}", args.input, output);

            let mut model = Model::load(&args.input)?;
            let report = flatten::flatten(&mut model.root, &keep);
            print!("{report}");
            model.save(&output)?;
            info!("Done!");
        }

        Commands::Materials { command } => match command {
            MaterialsCommand::List => {
                for preset in materials::PRESETS {
                    print!("{preset}");
                }
            }
            MaterialsCommand::Apply {
                input,
                preset,
                targets,
                output,
            } => {
                let preset = materials::find_preset(&preset)?;
                let output = output.unwrap_or_else(|| input.clone());
                info!("Converting {:?} -> {:?}", input, output);

                let mut model = Model::load(&input)?;
                let updated = materials::apply_preset(&mut model.root, &preset, &targets)?;
                for name in &updated {
                    println!("✓ {} -> {}", name, preset.id);
                }
                model.save(&output)?;
                info!("Done!");
            }
        },

        Commands::ExportJson(args) => {
            let output = args.output.unwrap_or_else(|| json_sibling(&args.input));
            info!("Converting {:?} -> {:?}", args.input, output);

            let options = export::ExportOptions {
                precision: args.precision,
                edge_angle: args
                    .edges
                    .then(|| args.edge_angle.unwrap_or(export::DEFAULT_EDGE_ANGLE)),
            };
            let model = Model::load(&args.input)?;
            let geometry = export::export_geometry(&model, options)?;
            write_creating_dirs(&output, export::to_json(&geometry, args.compact)?)?;
            println!(
                "✓ {} objects, {} vertices, {} triangles",
                geometry.objects.len(),
                geometry.total_vertices(),
                geometry.total_triangles()
            );
            info!("Done!");
        }
    }

    Ok(())
}

fn json_sibling(input: &Path) -> PathBuf {
    input.with_extension("json")
}
