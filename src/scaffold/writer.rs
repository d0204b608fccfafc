//! Default migrations writer
//!
//! Writes the migration, its metadata and one monolithic snapshot file.
//! This is the behavior a context gets when split snapshots are off.

use super::{MigrationFiles, MigrationsWriter, ScaffoldedMigration};
use crate::error::{write_failure, SnapshotResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output directory used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "Migrations";

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMigrationsWriter;

impl DefaultMigrationsWriter {
    pub fn new() -> Self {
        Self
    }
}

impl MigrationsWriter for DefaultMigrationsWriter {
    fn save(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles> {
        let migration = &migration.normalized()?;
        let mut files = self.save_migration(project_dir, migration, output_dir, dry_run)?;

        let directory = resolve_output_dir(project_dir, output_dir);
        let snapshot_file = directory.join(format!(
            "{}.{}",
            migration.snapshot_name, migration.file_extension
        ));
        write_file(&snapshot_file, &migration.snapshot_code, dry_run)?;
        files.snapshot_file = Some(snapshot_file);

        Ok(files)
    }

    fn save_migration(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles> {
        let migration = &migration.normalized()?;

        let directory = resolve_output_dir(project_dir, output_dir);
        let migration_file = directory.join(format!(
            "{}.{}",
            migration.migration_id, migration.file_extension
        ));
        let metadata_file = directory.join(format!(
            "{}_designer.{}",
            migration.migration_id, migration.file_extension
        ));

        write_file(&migration_file, &migration.migration_code, dry_run)?;
        write_file(&metadata_file, &migration.metadata_code, dry_run)?;

        Ok(MigrationFiles {
            migration_file: Some(migration_file),
            metadata_file: Some(metadata_file),
            ..Default::default()
        })
    }
}

/// Resolve the migrations directory against the project directory
pub fn resolve_output_dir(project_dir: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => project_dir.join(dir),
        None => project_dir.join(DEFAULT_OUTPUT_DIR),
    }
}

/// Write `content` to `path`, creating parent directories. Under dry-run
/// nothing touches the filesystem.
pub fn write_file(path: &Path, content: &str, dry_run: bool) -> SnapshotResult<()> {
    if dry_run {
        debug!("Dry run: would write {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failure(parent, e))?;
    }
    fs::write(path, content).map_err(|e| write_failure(path, e))?;

    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
