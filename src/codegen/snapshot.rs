//! Monolithic model snapshot generator
//!
//! Produces the single-file snapshot the host writes when split mode is off,
//! and the unit skeleton the split orchestrator reuses.

use super::{type_name, write_unit_header, AnnotationTarget, CodeEmitter, IndentedWriter};
use crate::error::{require, SnapshotResult};
use crate::model::SchemaModel;

/// Name of the builder parameter inside `build_model`
pub const BUILDER_NAME: &str = "model_builder";

/// Generates the whole model snapshot as one unit
pub struct ModelSnapshotGenerator<'a> {
    emitter: &'a dyn CodeEmitter,
}

impl<'a> ModelSnapshotGenerator<'a> {
    pub fn new(emitter: &'a dyn CodeEmitter) -> Self {
        Self { emitter }
    }

    /// Generate the snapshot source with every entity inlined
    pub fn generate(
        &self,
        namespace: &str,
        owner_type: &str,
        snapshot_name: &str,
        model: &SchemaModel,
    ) -> SnapshotResult<String> {
        require(owner_type, "owner type")?;
        require(snapshot_name, "snapshot name")?;

        let mut out = IndentedWriter::new();
        write_snapshot_unit(
            &mut out,
            self.emitter,
            namespace,
            owner_type,
            snapshot_name,
            &[],
            |out| {
                let mut started = write_model_settings(out, self.emitter, model);
                for entity in model.standalone_entities() {
                    if started {
                        out.blank_line();
                    }
                    started = true;
                    self.emitter.emit_entity_shape(BUILDER_NAME, entity, out);
                }
            },
        );

        Ok(out.into_string())
    }
}

/// Write a snapshot unit: header, extra module declarations, the snapshot
/// type and its `build_model` body.
///
/// Nothing is imported at the top level. Runtime and owner types are spelled
/// out, and the runtime glob import lives inside `build_model`, so module
/// declarations can never shadow a name the unit itself relies on.
pub(crate) fn write_snapshot_unit<F>(
    out: &mut IndentedWriter,
    emitter: &dyn CodeEmitter,
    namespace: &str,
    owner_type: &str,
    snapshot_name: &str,
    module_declarations: &[String],
    body: F,
) where
    F: FnOnce(&mut IndentedWriter),
{
    let runtime = emitter.runtime_path();
    let snapshot = snapshot_name.trim();

    write_unit_header(
        out,
        namespace,
        &format!("Model snapshot for `{}`.", type_name(owner_type)),
    );

    if !module_declarations.is_empty() {
        for declaration in module_declarations {
            out.append_line(declaration);
        }
        out.blank_line();
    }

    out.append_line(&format!("pub struct {};", snapshot));
    out.blank_line();
    out.append_line(&format!("impl {}::ModelSnapshot for {} {{", runtime, snapshot));
    out.indent();
    out.append_line(&format!("type Context = {};", owner_type.trim()));
    out.blank_line();
    out.append_line(&format!(
        "fn build_model({}: &mut {}::ModelBuilder) {{",
        BUILDER_NAME, runtime
    ));
    out.indent();
    for import in emitter.runtime_imports() {
        out.append_line(&format!("use {};", import));
    }

    let mut settings = IndentedWriter::new();
    body(&mut settings);
    if !settings.is_empty() {
        out.blank_line();
        out.append(settings.as_str());
    }

    out.dedent();
    out.append_line("}");
    out.dedent();
    out.append_line("}");
}

/// Write model-wide annotations (with the injected producer version) and
/// sequences, in that order. Returns whether anything was written.
pub(crate) fn write_model_settings(
    out: &mut IndentedWriter,
    emitter: &dyn CodeEmitter,
    model: &SchemaModel,
) -> bool {
    let annotations = model.snapshot_annotations();
    let mut started = !annotations.is_empty();
    emitter.emit_annotations(
        BUILDER_NAME,
        AnnotationTarget::Model,
        out,
        &annotations,
        false,
        false,
    );

    for sequence in &model.sequences {
        if started {
            out.blank_line();
        }
        started = true;
        emitter.emit_sequence(BUILDER_NAME, sequence, out);
    }

    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::FluentCodeEmitter;
    use crate::model::{EntityDescriptor, SequenceDescriptor};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_monolithic_snapshot() {
        let mut model = SchemaModel::default();
        model.product_version = Some("2.0.0".to_string());
        model.sequences.push(SequenceDescriptor::new("OrderNumbers"));
        model.entities.push(EntityDescriptor::new("User"));
        let mut address = EntityDescriptor::new("Address");
        address.owner = Some("User".to_string());
        model.entities.push(address);

        let emitter = FluentCodeEmitter::new();
        let text = ModelSnapshotGenerator::new(&emitter)
            .generate("", "crate::data::ShopContext", "ShopContextModelSnapshot", &model)
            .unwrap();

        let expected = r#"// <auto-generated />
//! Model snapshot for `ShopContext`.
#![allow(unused_imports, unused_variables, non_snake_case, clippy::all)]

pub struct ShopContextModelSnapshot;

impl schemaflow_runtime::prelude::ModelSnapshot for ShopContextModelSnapshot {
    type Context = crate::data::ShopContext;

    fn build_model(model_builder: &mut schemaflow_runtime::prelude::ModelBuilder) {
        use schemaflow_runtime::prelude::*;

        model_builder
            .has_annotation("ProductVersion", "2.0.0");

        model_builder.has_sequence::<i64>("OrderNumbers", None);

        model_builder.entity("User", |b| {
        });
    }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_generate_requires_owner_type() {
        let emitter = FluentCodeEmitter::new();
        let result = ModelSnapshotGenerator::new(&emitter).generate(
            "",
            "",
            "Snapshot",
            &SchemaModel::default(),
        );
        assert!(result.is_err());
    }
}
