//! Orchestrator Artifact Emitter
//!
//! The top-level snapshot unit. It rebuilds model-wide settings first
//! (annotations, then sequences) and only then calls into every entity
//! unit, because entity configuration may rely on those settings.

use super::entity::ENTRY_POINT;
use super::identifier::{identifier_for, mangled_module_name, module_name_for};
use super::placement::SNAPSHOTS_DIRECTORY;
use crate::codegen::snapshot::{write_model_settings, write_snapshot_unit, BUILDER_NAME};
use crate::codegen::{literal, CodeEmitter, IndentedWriter};
use crate::error::{require, SnapshotError, SnapshotResult};
use crate::model::SchemaModel;

pub struct OrchestratorEmitter<'a> {
    emitter: &'a dyn CodeEmitter,
    extension: &'a str,
}

impl<'a> OrchestratorEmitter<'a> {
    /// `extension` is the source extension the entity units are saved with
    pub fn new(emitter: &'a dyn CodeEmitter, extension: &'a str) -> Self {
        Self { emitter, extension }
    }

    pub fn emit(
        &self,
        namespace: &str,
        owner_type: &str,
        orchestrator_name: &str,
        model: &SchemaModel,
    ) -> SnapshotResult<String> {
        require(owner_type, "owner type")?;
        require(orchestrator_name, "orchestrator name")?;

        let struct_name = orchestrator_name.trim();
        let mut declarations = Vec::new();
        let mut modules = Vec::new();
        for entity in model.standalone_entities() {
            let identifier = identifier_for(entity)?;
            let mut module = module_name_for(&identifier);
            if module == struct_name {
                module = mangled_module_name(&identifier);
            }
            if module == struct_name {
                return Err(SnapshotError::IdentifierCollision {
                    identifier,
                    first: struct_name.to_string(),
                    second: entity.name.clone(),
                });
            }

            let path = format!("{}/{}.{}", SNAPSHOTS_DIRECTORY, identifier, self.extension);
            declarations.push(format!("#[path = {}]\nmod {};", literal(&path), module));
            modules.push(module);
        }

        let mut out = IndentedWriter::new();
        write_snapshot_unit(
            &mut out,
            self.emitter,
            namespace,
            owner_type,
            orchestrator_name,
            &declarations,
            |out| {
                let started = write_model_settings(out, self.emitter, model);
                if started && !modules.is_empty() {
                    out.blank_line();
                }
                for module in &modules {
                    out.append_line(&format!(
                        "self::{}::{}({});",
                        module, ENTRY_POINT, BUILDER_NAME
                    ));
                }
            },
        );

        Ok(out.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::FluentCodeEmitter;
    use crate::model::{EntityDescriptor, SequenceDescriptor};
    use pretty_assertions::assert_eq;

    fn model() -> SchemaModel {
        let mut model = SchemaModel::default();
        model.product_version = Some("2.0.0".to_string());
        model
            .annotations
            .insert("Relational:MaxIdentifierLength".to_string(), 63.into());
        let mut sequence = SequenceDescriptor::new("OrderNumbers");
        sequence.increment_by = 5;
        model.sequences.push(sequence);
        model.entities.push(EntityDescriptor::new("User"));
        let mut address = EntityDescriptor::new("Address");
        address.owner = Some("User".to_string());
        model.entities.push(address);
        model.entities.push(EntityDescriptor::new("Order"));
        model
    }

    #[test]
    fn test_orchestrator_layout() {
        let emitter = FluentCodeEmitter::new();
        let text = OrchestratorEmitter::new(&emitter, "rs")
            .emit("", "crate::data::ShopContext", "ShopContextModelSnapshot", &model())
            .unwrap();

        let expected = r#"// <auto-generated />
//! Model snapshot for `ShopContext`.
#![allow(unused_imports, unused_variables, non_snake_case, clippy::all)]

#[path = "Snapshots/UserSnapshot.rs"]
mod UserSnapshot;
#[path = "Snapshots/OrderSnapshot.rs"]
mod OrderSnapshot;

pub struct ShopContextModelSnapshot;

impl schemaflow_runtime::prelude::ModelSnapshot for ShopContextModelSnapshot {
    type Context = crate::data::ShopContext;

    fn build_model(model_builder: &mut schemaflow_runtime::prelude::ModelBuilder) {
        use schemaflow_runtime::prelude::*;

        model_builder
            .has_annotation("ProductVersion", "2.0.0")
            .has_max_identifier_length(63);

        model_builder.has_sequence::<i64>("OrderNumbers", None)
            .increments_by(5);

        self::UserSnapshot::build_entity(model_builder);
        self::OrderSnapshot::build_entity(model_builder);
    }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_orchestrator_without_entities() {
        let emitter = FluentCodeEmitter::new();
        let text = OrchestratorEmitter::new(&emitter, "rs")
            .emit("", "ShopContext", "ShopContextModelSnapshot", &SchemaModel::default())
            .unwrap();

        assert!(!text.contains("mod "));
        assert!(text.ends_with(
            "        use schemaflow_runtime::prelude::*;\n    }\n}\n"
        ));
    }

    #[test]
    fn test_unit_modules_do_not_shadow_runtime_or_snapshot() {
        let mut model = SchemaModel::default();
        model.entities.push(EntityDescriptor::new("Model"));
        model.entities.push(EntityDescriptor::new("ShopContextModel"));

        let emitter = FluentCodeEmitter::new().with_runtime_path("crate::rt::*");
        let text = OrchestratorEmitter::new(&emitter, "rs")
            .emit("", "ShopContext", "ShopContextModelSnapshot", &model)
            .unwrap();

        assert!(text.contains("mod ModelSnapshot;"));
        assert!(text.contains("impl crate::rt::ModelSnapshot for ShopContextModelSnapshot {"));
        assert!(text.contains("fn build_model(model_builder: &mut crate::rt::ModelBuilder) {"));
        assert!(text.contains("#[path = \"Snapshots/ShopContextModelSnapshot.rs\"]\nmod ShopContextModelSnapshot_46910b7b;"));
        assert!(text.contains("self::ShopContextModelSnapshot_46910b7b::build_entity(model_builder);"));
        assert!(!text.lines().any(|line| line.starts_with("use ")));
    }

    #[test]
    fn test_orchestrator_requires_name() {
        let emitter = FluentCodeEmitter::new();
        let result = OrchestratorEmitter::new(&emitter, "rs").emit("", "ShopContext", " ", &model());
        assert!(result.is_err());
    }
}
