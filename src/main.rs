//! SchemaFlow Split CLI
//!
//! Saves scaffolded migrations with either a single model snapshot or a
//! split snapshot (orchestrator + one unit per entity), and previews splits
//! without touching the filesystem.

use anyhow::Context;
use clap::{Parser, Subcommand};
use schemaflow_split::codegen::FluentCodeEmitter;
use schemaflow_split::scaffold::resolve_output_dir;
use schemaflow_split::snapshot::placement_for;
use schemaflow_split::{
    DefaultMigrationsWriter, ModelSnapshotGenerator, SaveReport, ScaffoldedMigration,
    SchemaModel, Settings, SnapshotScaffolder, SnapshotSplitter, SPLIT_SNAPSHOT_OPTION,
};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// SchemaFlow snapshot splitting
#[derive(Parser, Debug)]
#[command(name = "schemaflow-split")]
#[command(version, about = "Merge-friendly model snapshots for migrations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a scaffolded migration and its model snapshot
    Save {
        /// Schema model (JSON)
        #[arg(long)]
        model: PathBuf,

        /// Scaffolded migration (JSON)
        #[arg(long)]
        migration: PathBuf,

        /// Project directory output paths are resolved against
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Migrations directory (defaults to <project-dir>/Migrations)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Report paths without writing
        #[arg(long)]
        dry_run: bool,

        /// Force split snapshots on, overriding SCHEMAFLOW_SPLIT_SNAPSHOT
        #[arg(long)]
        split: bool,
    },

    /// Show the artifacts a split would produce
    Preview {
        /// Schema model (JSON)
        #[arg(long)]
        model: PathBuf,

        /// Type path of the context the snapshot belongs to
        #[arg(long)]
        context: String,

        /// Orchestrator (snapshot) name
        #[arg(long)]
        name: String,

        /// Namespace hint for generated units
        #[arg(long, default_value = "")]
        namespace: String,

        /// Migrations directory used to show placements
        #[arg(long, default_value = "Migrations")]
        output_dir: PathBuf,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let emitter = match &settings.snapshot.runtime_path {
        Some(path) => FluentCodeEmitter::new().with_runtime_path(path.clone()),
        None => FluentCodeEmitter::new(),
    };

    match cli.command {
        Command::Save {
            model,
            migration,
            project_dir,
            output_dir,
            dry_run,
            split,
        } => {
            let model: SchemaModel = read_json(&model)?;
            let mut migration: ScaffoldedMigration = read_json(&migration)?;

            if migration.snapshot_code.is_empty() {
                migration.snapshot_code = ModelSnapshotGenerator::new(&emitter).generate(
                    &migration.snapshot_namespace,
                    &migration.context_type,
                    &migration.snapshot_name,
                    &model,
                )?;
            }

            let mut options = settings.context_options();
            if split {
                options.set(SPLIT_SNAPSHOT_OPTION, true);
            }

            let files = SnapshotScaffolder::new(DefaultMigrationsWriter::new(), &emitter, &model, &options)
                .with_pruning(settings.snapshot.prune_stale_units)
                .save(&project_dir, &migration, output_dir.as_deref(), dry_run)?;

            let report = SaveReport::new(files, dry_run);
            info!(
                "✅ {} {} files ({} pruned)",
                if dry_run { "Would write" } else { "Wrote" },
                report.files_written,
                report.files_pruned
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Preview {
            model,
            context,
            name,
            namespace,
            output_dir,
        } => {
            let model: SchemaModel = read_json(&model)?;
            let extension = settings.snapshot.source_extension.as_str();
            let result = SnapshotSplitter::new(&emitter)
                .with_extension(extension)
                .split(&namespace, &context, &name, &model)?;

            let directory = resolve_output_dir(Path::new("."), Some(output_dir.as_path()));
            for artifact in &result {
                println!(
                    "{:<12} {:<40} {}",
                    format!("{:?}", artifact.role),
                    artifact.identifier,
                    placement_for(artifact, &directory, extension).display()
                );
            }
            println!("{} artifacts, checksum {}", result.len(), result.checksum());
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,schemaflow_split=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}
