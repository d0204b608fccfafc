//! Snapshot Splitting Module
//!
//! Decomposes one model snapshot into a small orchestrator plus one unit per
//! entity, so contributors touching different entities stop rewriting the
//! same file. This module provides:
//! - Identifier policy (stable, filesystem-safe unit names)
//! - Entity and orchestrator unit emitters
//! - The split coordinator (model -> ordered artifacts)
//! - Placement policy (artifact -> path)

pub mod artifact;
pub mod entity;
pub mod identifier;
pub mod orchestrator;
pub mod placement;
pub mod split;

pub use artifact::{Artifact, ArtifactRole, SplitResult};
pub use entity::EntityUnitEmitter;
pub use identifier::{identifier_for, mangled_module_name, module_name_for, IDENTIFIER_SUFFIX};
pub use orchestrator::OrchestratorEmitter;
pub use placement::{placement_for, snapshots_directory, SNAPSHOTS_DIRECTORY};
pub use split::SnapshotSplitter;
