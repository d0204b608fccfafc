//! SchemaFlow Split - merge-friendly model snapshots
//!
//! Every migration step rewrites the model snapshot. With one snapshot file,
//! any two contributors changing any part of the schema conflict on it. This
//! crate splits the snapshot into a small orchestrator plus one unit per
//! entity, and plugs into migration scaffolding as an opt-in replacement for
//! the single-file writer:
//! - `model`: the resolved schema model handed over by the host
//! - `codegen`: the code emitter capability and the monolithic generator
//! - `snapshot`: identifier policy, unit emitters, split coordinator, placement
//! - `scaffold`: the host writer and the split-aware scaffolder
//! - `config`: environment settings and per-context options

pub mod codegen;
pub mod config;
pub mod error;
pub mod model;
pub mod scaffold;
pub mod snapshot;

pub use codegen::{CodeEmitter, FluentCodeEmitter, IndentedWriter, ModelSnapshotGenerator};
pub use config::{ContextOptions, Settings, SPLIT_SNAPSHOT_OPTION};
pub use error::{SnapshotError, SnapshotResult};
pub use model::{EntityDescriptor, SchemaModel, SequenceDescriptor};
pub use scaffold::{
    DefaultMigrationsWriter, MigrationFiles, MigrationsWriter, SaveReport, ScaffoldedMigration,
    SnapshotScaffolder, SplitMode,
};
pub use snapshot::{Artifact, ArtifactRole, SnapshotSplitter, SplitResult};
