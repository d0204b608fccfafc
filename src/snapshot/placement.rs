//! Artifact Placement Policy
//!
//! The orchestrator stays where tooling expects the single snapshot file;
//! entity units go one level down in `Snapshots/`.

use super::artifact::{Artifact, ArtifactRole};
use std::path::{Path, PathBuf};

/// Subdirectory holding entity units
pub const SNAPSHOTS_DIRECTORY: &str = "Snapshots";

/// Target path of an artifact inside `migration_directory`
pub fn placement_for(artifact: &Artifact, migration_directory: &Path, extension: &str) -> PathBuf {
    let file_name = format!("{}.{}", artifact.identifier, extension);
    match artifact.role {
        ArtifactRole::Orchestrator => migration_directory.join(file_name),
        ArtifactRole::EntityUnit => snapshots_directory(migration_directory).join(file_name),
    }
}

pub fn snapshots_directory(migration_directory: &Path) -> PathBuf {
    migration_directory.join(SNAPSHOTS_DIRECTORY)
}
