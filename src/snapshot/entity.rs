//! Entity Artifact Emitter
//!
//! Wraps one entity's shape in a self-contained unit with a single
//! `build_entity` entry point, visible only to the orchestrator that
//! declares it.

use crate::codegen::snapshot::BUILDER_NAME;
use crate::codegen::{type_name, write_unit_header, CodeEmitter, IndentedWriter};
use crate::error::{require, SnapshotResult};
use crate::model::EntityDescriptor;

/// Reconstruction entry point every entity unit defines
pub const ENTRY_POINT: &str = "build_entity";

pub struct EntityUnitEmitter<'a> {
    emitter: &'a dyn CodeEmitter,
}

impl<'a> EntityUnitEmitter<'a> {
    pub fn new(emitter: &'a dyn CodeEmitter) -> Self {
        Self { emitter }
    }

    /// Produce the unit source for one entity
    pub fn emit(
        &self,
        namespace: &str,
        owner_type: &str,
        identifier: &str,
        entity: &EntityDescriptor,
    ) -> SnapshotResult<String> {
        require(owner_type, "owner type")?;
        require(identifier, "identifier")?;
        require(&entity.name, "entity name")?;

        let mut out = IndentedWriter::new();
        write_unit_header(
            &mut out,
            namespace,
            &format!(
                "`{}`: snapshot of entity `{}` for `{}`.",
                identifier,
                entity.name,
                type_name(owner_type)
            ),
        );

        // The unit imports the runtime itself; the orchestrator's scope holds
        // sibling unit modules that could shadow runtime names.
        for import in self.emitter.runtime_imports() {
            out.append_line(&format!("use {};", import));
        }
        out.blank_line();

        out.append_line(&format!(
            "pub(super) fn {}({}: &mut ModelBuilder) {{",
            ENTRY_POINT, BUILDER_NAME
        ));
        out.indent();
        self.emitter.emit_entity_shape(BUILDER_NAME, entity, &mut out);
        out.dedent();
        out.append_line("}");

        Ok(out.into_string())
    }
}
