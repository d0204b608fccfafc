//! Migration scaffolding
//!
//! Saving a scaffolded migration to disk. The host writer produces one
//! snapshot file; the snapshot scaffolder swaps that file for a split
//! snapshot when the context opts in.

mod scaffolder;
mod writer;

pub use scaffolder::{SnapshotScaffolder, SplitMode};
pub use writer::{resolve_output_dir, write_file, DefaultMigrationsWriter, DEFAULT_OUTPUT_DIR};

use crate::error::{invalid_argument, SnapshotResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// A migration produced by the scaffolding pipeline, not yet on disk
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldedMigration {
    #[validate(length(min = 1, message = "Migration id is required"))]
    pub migration_id: String,
    #[serde(default)]
    pub migration_code: String,
    #[serde(default)]
    pub metadata_code: String,
    #[validate(length(min = 1, message = "Snapshot name is required"))]
    pub snapshot_name: String,
    #[serde(default)]
    pub snapshot_code: String,
    /// Namespace hint for generated snapshot units
    #[serde(default)]
    pub snapshot_namespace: String,
    /// Type path of the context the snapshot belongs to
    #[serde(default)]
    pub context_type: String,
    #[validate(length(min = 1, message = "File extension is required"))]
    #[serde(default = "default_extension")]
    pub file_extension: String,
}

fn default_extension() -> String {
    "rs".to_string()
}

impl ScaffoldedMigration {
    /// Copy with surrounding whitespace stripped from every name, validated.
    /// File names, the snapshot type and unit placement all use these.
    pub fn normalized(&self) -> SnapshotResult<Self> {
        let migration = Self {
            migration_id: self.migration_id.trim().to_string(),
            snapshot_name: self.snapshot_name.trim().to_string(),
            snapshot_namespace: self.snapshot_namespace.trim().to_string(),
            context_type: self.context_type.trim().to_string(),
            file_extension: self.file_extension.trim().trim_start_matches('.').to_string(),
            ..self.clone()
        };
        migration
            .validate()
            .map_err(|e| invalid_argument(e.to_string()))?;
        Ok(migration)
    }
}

/// Files a save produced (or would produce under dry-run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFiles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_file: Option<PathBuf>,
    /// The model snapshot; the orchestrator when split
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshot_units: Vec<PathBuf>,
    /// Stale entity units removed (or that would be removed)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pruned: Vec<PathBuf>,
}

impl MigrationFiles {
    /// Every written path, in write order
    pub fn all_files(&self) -> Vec<&Path> {
        self.migration_file
            .iter()
            .chain(self.metadata_file.iter())
            .chain(self.snapshot_file.iter())
            .chain(self.snapshot_units.iter())
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Summary printed by the CLI after a save
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub dry_run: bool,
    pub files_written: usize,
    pub files_pruned: usize,
    pub files: MigrationFiles,
}

impl SaveReport {
    pub fn new(files: MigrationFiles, dry_run: bool) -> Self {
        Self {
            dry_run,
            files_written: files.all_files().len(),
            files_pruned: files.pruned.len(),
            files,
        }
    }
}

/// The host's migration file writer
pub trait MigrationsWriter {
    /// Save migration, metadata and the single snapshot file
    fn save(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles>;

    /// Save only the migration and metadata files
    fn save_migration(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_deserializes_with_defaults() {
        let json = r#"{
            "migrationId": "20260101120000_Init",
            "snapshotName": "ShopContextModelSnapshot",
            "contextType": "crate::data::ShopContext"
        }"#;
        let migration: ScaffoldedMigration = serde_json::from_str(json).unwrap();

        assert_eq!(migration.file_extension, "rs");
        assert!(migration.snapshot_namespace.is_empty());
        assert!(migration.validate().is_ok());
    }

    #[test]
    fn test_normalized_trims_names() {
        let migration = ScaffoldedMigration {
            migration_id: " 20260101120000_Init ".to_string(),
            migration_code: String::new(),
            metadata_code: String::new(),
            snapshot_name: " ShopContextModelSnapshot\n".to_string(),
            snapshot_code: String::new(),
            snapshot_namespace: String::new(),
            context_type: " ShopContext ".to_string(),
            file_extension: ".rs".to_string(),
        };

        let normalized = migration.normalized().unwrap();
        assert_eq!(normalized.migration_id, "20260101120000_Init");
        assert_eq!(normalized.snapshot_name, "ShopContextModelSnapshot");
        assert_eq!(normalized.context_type, "ShopContext");
        assert_eq!(normalized.file_extension, "rs");
    }

    #[test]
    fn test_blank_snapshot_name_rejected_after_trim() {
        let json = r#"{"migrationId": "1_Init", "snapshotName": "   "}"#;
        let migration: ScaffoldedMigration = serde_json::from_str(json).unwrap();
        assert!(migration.normalized().is_err());
    }

    #[test]
    fn test_all_files_in_write_order() {
        let files = MigrationFiles {
            migration_file: Some(PathBuf::from("m/1_Init.rs")),
            metadata_file: Some(PathBuf::from("m/1_Init_designer.rs")),
            snapshot_file: Some(PathBuf::from("m/Snap.rs")),
            snapshot_units: vec![PathBuf::from("m/Snapshots/UserSnapshot.rs")],
            pruned: vec![PathBuf::from("m/Snapshots/GoneSnapshot.rs")],
        };

        let report = SaveReport::new(files.clone(), false);
        assert_eq!(files.all_files().len(), 4);
        assert_eq!(report.files_written, 4);
        assert_eq!(report.files_pruned, 1);
    }
}
