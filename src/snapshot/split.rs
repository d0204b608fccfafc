//! Split Coordinator
//!
//! Turns a schema model into an ordered list of artifacts: the orchestrator
//! first, then one unit per non-owned entity in model order. Pure; nothing
//! here touches the filesystem.

use super::artifact::{Artifact, SplitResult};
use super::entity::EntityUnitEmitter;
use super::identifier::identifier_for;
use super::orchestrator::OrchestratorEmitter;
use crate::codegen::CodeEmitter;
use crate::error::{require, SnapshotError, SnapshotResult};
use crate::model::SchemaModel;
use std::collections::HashMap;
use tracing::debug;

/// Default source extension of generated units
pub const DEFAULT_EXTENSION: &str = "rs";

pub struct SnapshotSplitter<'a> {
    emitter: &'a dyn CodeEmitter,
    extension: String,
}

impl<'a> SnapshotSplitter<'a> {
    pub fn new(emitter: &'a dyn CodeEmitter) -> Self {
        Self {
            emitter,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Split `model` into the orchestrator and its entity units
    pub fn split(
        &self,
        namespace: &str,
        owner_type: &str,
        orchestrator_name: &str,
        model: &SchemaModel,
    ) -> SnapshotResult<SplitResult> {
        require(owner_type, "owner type")?;
        require(orchestrator_name, "orchestrator name")?;
        require(&self.extension, "file extension")?;

        let unit_emitter = EntityUnitEmitter::new(self.emitter);

        // Keyed case-insensitively: identifiers differing only in case name
        // the same file on case-insensitive filesystems.
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut units = Vec::new();

        for entity in model.standalone_entities() {
            let identifier = identifier_for(entity)?;
            let key = identifier.to_lowercase();
            if let Some(first) = seen.insert(key, &entity.name) {
                return Err(SnapshotError::IdentifierCollision {
                    identifier,
                    first: first.to_string(),
                    second: entity.name.clone(),
                });
            }

            let content = unit_emitter.emit(namespace, owner_type, &identifier, entity)?;
            debug!("Emitted snapshot unit {} for entity {}", identifier, entity.name);
            units.push(Artifact::entity_unit(identifier, content));
        }

        let orchestrator = OrchestratorEmitter::new(self.emitter, &self.extension).emit(
            namespace,
            owner_type,
            orchestrator_name,
            model,
        )?;

        debug!(
            "Split snapshot {} into {} entity units",
            orchestrator_name,
            units.len()
        );

        Ok(SplitResult::new(
            Artifact::orchestrator(orchestrator_name.trim(), orchestrator),
            units,
        ))
    }
}
