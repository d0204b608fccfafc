//! Snapshot scaffolder
//!
//! Drop-in replacement for the host writer's `save`. With split mode off it
//! delegates wholesale; with split mode on it writes the migration files the
//! host would, then the orchestrator and one unit per entity in place of the
//! single snapshot file.

use super::writer::{resolve_output_dir, write_file};
use super::{MigrationFiles, MigrationsWriter, ScaffoldedMigration};
use crate::codegen::CodeEmitter;
use crate::config::ContextOptions;
use crate::error::{write_failure, SnapshotResult};
use crate::model::SchemaModel;
use crate::snapshot::{
    placement_for, snapshots_directory, ArtifactRole, SnapshotSplitter, SNAPSHOTS_DIRECTORY,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Whether a save produces one snapshot file or a split snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Disabled,
    Enabled,
}

/// Saves migrations for one model, splitting the snapshot when enabled
pub struct SnapshotScaffolder<'a, W: MigrationsWriter> {
    writer: W,
    emitter: &'a dyn CodeEmitter,
    model: &'a SchemaModel,
    options: &'a ContextOptions,
    prune_stale_units: bool,
}

impl<'a, W: MigrationsWriter> SnapshotScaffolder<'a, W> {
    pub fn new(
        writer: W,
        emitter: &'a dyn CodeEmitter,
        model: &'a SchemaModel,
        options: &'a ContextOptions,
    ) -> Self {
        Self {
            writer,
            emitter,
            model,
            options,
            prune_stale_units: true,
        }
    }

    /// Remove entity units left over from entities no longer in the model
    pub fn with_pruning(mut self, prune_stale_units: bool) -> Self {
        self.prune_stale_units = prune_stale_units;
        self
    }

    /// Read the opt-in; an unreadable value counts as disabled
    pub fn split_mode(&self) -> SplitMode {
        match self.options.split_snapshot() {
            Ok(true) => SplitMode::Enabled,
            Ok(false) => SplitMode::Disabled,
            Err(e) => {
                warn!("Ignoring split snapshot option: {}", e);
                SplitMode::Disabled
            }
        }
    }

    /// Save the migration. Returns the paths written, or that would be
    /// written under `dry_run`.
    pub fn save(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles> {
        let migration = migration.normalized()?;
        match self.split_mode() {
            SplitMode::Disabled => self.writer.save(project_dir, &migration, output_dir, dry_run),
            SplitMode::Enabled => self.save_split(project_dir, &migration, output_dir, dry_run),
        }
    }

    fn save_split(
        &self,
        project_dir: &Path,
        migration: &ScaffoldedMigration,
        output_dir: Option<&Path>,
        dry_run: bool,
    ) -> SnapshotResult<MigrationFiles> {
        let extension = migration.file_extension.as_str();

        // Split before writing anything so a bad model leaves no files behind
        let result = SnapshotSplitter::new(self.emitter)
            .with_extension(extension)
            .split(
                &migration.snapshot_namespace,
                &migration.context_type,
                &migration.snapshot_name,
                self.model,
            )?;

        let directory = resolve_output_dir(project_dir, output_dir);
        let orchestrator_path = placement_for(result.primary(), &directory, extension);
        // Read before the orchestrator is overwritten
        let previous_units = if self.prune_stale_units {
            referenced_units(&orchestrator_path, &directory)
        } else {
            Vec::new()
        };

        let mut files = self
            .writer
            .save_migration(project_dir, migration, output_dir, dry_run)?;

        for artifact in &result {
            let path = placement_for(artifact, &directory, extension);
            write_file(&path, &artifact.content, dry_run)?;
            match artifact.role {
                ArtifactRole::Orchestrator => files.snapshot_file = Some(path),
                ArtifactRole::EntityUnit => files.snapshot_units.push(path),
            }
        }

        if self.prune_stale_units {
            let shared = units_referenced_elsewhere(&directory, &orchestrator_path, extension);
            files.pruned = prune_stale_units(previous_units, &files.snapshot_units, &shared, dry_run)?;
        }

        info!(
            "{} split snapshot {}: {} artifacts, {} pruned, checksum {}",
            if dry_run { "Previewed" } else { "Saved" },
            migration.snapshot_name,
            result.len(),
            files.pruned.len(),
            result.checksum()
        );

        Ok(files)
    }
}

/// `#[path = "Snapshots/<file>"]` declarations of an orchestrator
static UNIT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"#\[path = "{}/([^"/\\]+)"\]"#,
        regex::escape(SNAPSHOTS_DIRECTORY)
    ))
    .expect("unit declaration pattern is valid")
});

/// Unit files an orchestrator on disk declares. A missing or unreadable
/// orchestrator declares nothing.
fn referenced_units(orchestrator: &Path, directory: &Path) -> Vec<PathBuf> {
    let content = match fs::read_to_string(orchestrator) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Not pruning: cannot read {}: {}", orchestrator.display(), e);
            return Vec::new();
        }
    };

    let snapshots = snapshots_directory(directory);
    UNIT_DECLARATION
        .captures_iter(&content)
        .map(|captures| snapshots.join(&captures[1]))
        .collect()
}

/// Unit files declared by any other snapshot in the migrations directory
fn units_referenced_elsewhere(directory: &Path, own: &Path, extension: &str) -> HashSet<PathBuf> {
    let Ok(entries) = fs::read_dir(directory) else {
        return HashSet::new();
    };

    entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.as_path() != own && path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .flat_map(|path| referenced_units(&path, directory))
        .collect()
}

/// Delete units the previous orchestrator of this snapshot declared that the
/// current split no longer produces. Units another snapshot still declares
/// are kept.
fn prune_stale_units(
    previous: Vec<PathBuf>,
    current: &[PathBuf],
    shared: &HashSet<PathBuf>,
    dry_run: bool,
) -> SnapshotResult<Vec<PathBuf>> {
    let keep: HashSet<&Path> = current.iter().map(PathBuf::as_path).collect();

    let mut stale: Vec<PathBuf> = previous
        .into_iter()
        .filter(|path| !keep.contains(path.as_path()) && !shared.contains(path))
        .filter(|path| path.is_file())
        .collect();
    stale.sort();
    stale.dedup();

    for path in &stale {
        if dry_run {
            debug!("Dry run: would remove stale unit {}", path.display());
            continue;
        }
        fs::remove_file(path).map_err(|e| write_failure(path, e))?;
        warn!("Removed stale snapshot unit {}", path.display());
    }

    Ok(stale)
}
