//! Fluent builder emitter
//!
//! Renders schema elements as `model_builder` call chains. This is the
//! reference [`CodeEmitter`]: it stands in for the host framework's own
//! generator so snapshots can be produced end to end.

use super::{literal, AnnotationTarget, CodeEmitter, IndentedWriter};
use crate::model::{
    Annotations, EntityDescriptor, IndexDescriptor, PropertyDescriptor, RelationshipDescriptor,
    SequenceDescriptor, ValueGenerated,
};

/// Reference emitter producing fluent builder calls
#[derive(Debug, Clone, Default)]
pub struct FluentCodeEmitter {
    runtime_path: Option<String>,
}

impl FluentCodeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build against a different runtime module; a trailing `::*` is ignored
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = path.trim().trim_end_matches("::*").to_string();
        self.runtime_path = Some(path);
        self
    }

    fn emit_entity_body(&self, builder: &str, entity: &EntityDescriptor, depth: usize, out: &mut IndentedWriter) {
        let mut started = false;

        if let Some(base) = &entity.base_type {
            section(out, &mut started);
            out.append_line(&format!("{}.has_base_type({});", builder, literal(base)));
        }

        for property in &entity.properties {
            section(out, &mut started);
            self.emit_property(builder, property, out);
        }

        if let Some(key) = &entity.primary_key {
            section(out, &mut started);
            out.append_line(&format!("{}.has_key(&[{}]);", builder, list(key)));
        }

        for index in &entity.indexes {
            section(out, &mut started);
            self.emit_index(builder, index, out);
        }

        for relationship in &entity.relationships {
            section(out, &mut started);
            self.emit_relationship(builder, relationship, out);
        }

        for owned in &entity.owned {
            section(out, &mut started);
            let nested = format!("b{}", depth + 1);
            let method = if owned.collection { "owns_many" } else { "owns_one" };
            out.append_line(&format!(
                "{}.{}({}, {}, |{}| {{",
                builder,
                method,
                literal(&owned.entity.name),
                literal(&owned.navigation),
                nested
            ));
            out.indent();
            self.emit_entity_body(&nested, &owned.entity, depth + 1, out);
            out.dedent();
            out.append_line("});");
        }

        if let Some(table) = &entity.table {
            section(out, &mut started);
            out.append_line(&format!(
                "{}.to_table({}, {});",
                builder,
                literal(table),
                optional(entity.schema.as_deref())
            ));
        }

        self.emit_annotations(
            builder,
            AnnotationTarget::Entity(entity),
            out,
            &entity.annotations,
            false,
            started,
        );
    }

    fn emit_property(&self, builder: &str, property: &PropertyDescriptor, out: &mut IndentedWriter) {
        out.append(&format!(
            "{}.property::<{}>({})",
            builder,
            property_type(property),
            literal(&property.name)
        ));
        out.indent();

        match property.value_generated {
            Some(ValueGenerated::OnAdd) => {
                out.append("\n.value_generated_on_add()");
            }
            Some(ValueGenerated::OnUpdate) => {
                out.append("\n.value_generated_on_update()");
            }
            Some(ValueGenerated::OnAddOrUpdate) => {
                out.append("\n.value_generated_on_add_or_update()");
            }
            None => {}
        }
        if !property.nullable {
            out.append("\n.is_required()");
        }
        if let Some(max_length) = property.max_length {
            out.append(&format!("\n.has_max_length({})", max_length));
        }
        if let Some(column) = &property.column_name {
            out.append(&format!("\n.has_column_name({})", literal(column)));
        }
        self.emit_annotations(
            builder,
            AnnotationTarget::Property(property),
            out,
            &property.annotations,
            true,
            false,
        );

        out.append_line(";");
        out.dedent();
    }

    fn emit_index(&self, builder: &str, index: &IndexDescriptor, out: &mut IndentedWriter) {
        out.append(&format!("{}.has_index(&[{}])", builder, list(&index.properties)));
        out.indent();
        if let Some(name) = &index.name {
            out.append(&format!("\n.has_database_name({})", literal(name)));
        }
        if index.unique {
            out.append("\n.is_unique()");
        }
        out.append_line(";");
        out.dedent();
    }

    fn emit_relationship(&self, builder: &str, relationship: &RelationshipDescriptor, out: &mut IndentedWriter) {
        out.append(&format!(
            "{}.has_one({}, {})",
            builder,
            literal(&relationship.principal),
            optional(relationship.navigation.as_deref())
        ));
        out.indent();
        let inverse = if relationship.inverse_collection {
            "with_many"
        } else {
            "with_one"
        };
        out.append(&format!(
            "\n.{}({})",
            inverse,
            optional(relationship.inverse_navigation.as_deref())
        ));
        out.append(&format!(
            "\n.has_foreign_key(&[{}])",
            list(&relationship.foreign_key)
        ));
        out.append(&format!(
            "\n.on_delete(DeleteBehavior::{})",
            relationship.delete_behavior.as_str()
        ));
        if relationship.required {
            out.append("\n.is_required()");
        }
        out.append_line(";");
        out.dedent();
    }

    /// Map well-known annotations onto dedicated builder methods
    fn annotation_call(target: AnnotationTarget<'_>, key: &str, value: &serde_json::Value) -> String {
        let dedicated = match (target, key) {
            (AnnotationTarget::Model, "Relational:DefaultSchema") => Some("has_default_schema"),
            (AnnotationTarget::Model, "Relational:MaxIdentifierLength") => {
                Some("has_max_identifier_length")
            }
            (AnnotationTarget::Entity(_), "Relational:Comment") => Some("has_comment"),
            (AnnotationTarget::Property(_), "Relational:ColumnType") => Some("has_column_type"),
            (AnnotationTarget::Property(_), "Relational:DefaultValueSql") => {
                Some("has_default_value_sql")
            }
            (AnnotationTarget::Property(_), "Relational:Comment") => Some("has_comment"),
            _ => None,
        };

        match (dedicated, annotation_value(value)) {
            (Some(method), AnnotationValue::Scalar(rendered)) => format!(".{}({})", method, rendered),
            (_, AnnotationValue::Scalar(rendered)) => {
                format!(".has_annotation({}, {})", literal(key), rendered)
            }
            (_, AnnotationValue::Json(rendered)) => {
                format!(".has_json_annotation({}, {})", literal(key), rendered)
            }
        }
    }
}

impl CodeEmitter for FluentCodeEmitter {
    fn emit_entity_shape(&self, builder_name: &str, entity: &EntityDescriptor, out: &mut IndentedWriter) {
        out.append_line(&format!(
            "{}.entity({}, |b| {{",
            builder_name,
            literal(&entity.name)
        ));
        out.indent();
        self.emit_entity_body("b", entity, 0, out);
        out.dedent();
        out.append_line("});");
    }

    fn emit_annotations(
        &self,
        builder_name: &str,
        target: AnnotationTarget<'_>,
        out: &mut IndentedWriter,
        annotations: &Annotations,
        chained: bool,
        leading_blank_line: bool,
    ) {
        if annotations.is_empty() {
            return;
        }
        if leading_blank_line {
            out.blank_line();
        }

        if chained {
            for (key, value) in annotations {
                out.append("\n");
                out.append(&Self::annotation_call(target, key, value));
            }
            return;
        }

        out.append(builder_name);
        out.indent();
        for (key, value) in annotations {
            out.append("\n");
            out.append(&Self::annotation_call(target, key, value));
        }
        out.append_line(";");
        out.dedent();
    }

    fn emit_sequence(&self, builder_name: &str, sequence: &SequenceDescriptor, out: &mut IndentedWriter) {
        out.append(&format!(
            "{}.has_sequence::<{}>({}, {})",
            builder_name,
            sequence.type_name,
            literal(&sequence.name),
            optional(sequence.schema.as_deref())
        ));
        out.indent();
        if sequence.start_value != 1 {
            out.append(&format!("\n.starts_at({})", sequence.start_value));
        }
        if sequence.increment_by != 1 {
            out.append(&format!("\n.increments_by({})", sequence.increment_by));
        }
        if let Some(min) = sequence.min_value {
            out.append(&format!("\n.has_min({})", min));
        }
        if let Some(max) = sequence.max_value {
            out.append(&format!("\n.has_max({})", max));
        }
        if sequence.cyclic {
            out.append("\n.is_cyclic()");
        }
        out.append_line(";");
        out.dedent();
    }

    fn runtime_path(&self) -> String {
        match &self.runtime_path {
            Some(path) => path.clone(),
            None => super::DEFAULT_RUNTIME_PATH.to_string(),
        }
    }
}

enum AnnotationValue {
    Scalar(String),
    Json(String),
}

fn annotation_value(value: &serde_json::Value) -> AnnotationValue {
    match value {
        serde_json::Value::String(s) => AnnotationValue::Scalar(literal(s)),
        serde_json::Value::Number(n) => AnnotationValue::Scalar(n.to_string()),
        serde_json::Value::Bool(b) => AnnotationValue::Scalar(b.to_string()),
        other => AnnotationValue::Json(literal(&other.to_string())),
    }
}

fn property_type(property: &PropertyDescriptor) -> String {
    if property.nullable && !property.type_name.starts_with("Option<") {
        format!("Option<{}>", property.type_name)
    } else {
        property.type_name.clone()
    }
}

/// Blank line between sections of an entity body
fn section(out: &mut IndentedWriter, started: &mut bool) {
    if *started {
        out.blank_line();
    }
    *started = true;
}

fn list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| literal(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn optional(value: Option<&str>) -> String {
    value
        .map(|v| format!("Some({})", literal(v)))
        .unwrap_or_else(|| "None".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeleteBehavior, OwnedNavigation};
    use pretty_assertions::assert_eq;

    fn user() -> EntityDescriptor {
        let mut user = EntityDescriptor::new("Shop.Models.User");
        user.display_name = Some("User".to_string());
        user.properties = vec![
            PropertyDescriptor {
                name: "Id".to_string(),
                type_name: "i32".to_string(),
                value_generated: Some(ValueGenerated::OnAdd),
                ..Default::default()
            },
            PropertyDescriptor {
                name: "Email".to_string(),
                type_name: "String".to_string(),
                max_length: Some(256),
                ..Default::default()
            },
        ];
        user.primary_key = Some(vec!["Id".to_string()]);
        user.table = Some("users".to_string());
        user
    }

    #[test]
    fn test_entity_shape() {
        let emitter = FluentCodeEmitter::new();
        let mut out = IndentedWriter::new();
        emitter.emit_entity_shape("model_builder", &user(), &mut out);

        let expected = r#"model_builder.entity("Shop.Models.User", |b| {
    b.property::<i32>("Id")
        .value_generated_on_add()
        .is_required();

    b.property::<String>("Email")
        .is_required()
        .has_max_length(256);

    b.has_key(&["Id"]);

    b.to_table("users", None);
});
"#;
        assert_eq!(out.as_str(), expected);
    }

    #[test]
    fn test_owned_entity_rendered_inside_owner() {
        let mut address = EntityDescriptor::new("Shop.Models.Address");
        address.owner = Some("Shop.Models.User".to_string());
        address.properties = vec![PropertyDescriptor {
            name: "City".to_string(),
            type_name: "String".to_string(),
            nullable: true,
            ..Default::default()
        }];

        let mut owner = EntityDescriptor::new("Shop.Models.User");
        owner.owned = vec![OwnedNavigation {
            navigation: "ShippingAddress".to_string(),
            collection: false,
            entity: address,
        }];

        let mut out = IndentedWriter::new();
        FluentCodeEmitter::new().emit_entity_shape("model_builder", &owner, &mut out);

        let text = out.into_string();
        assert!(text.contains(
            "b.owns_one(\"Shop.Models.Address\", \"ShippingAddress\", |b1| {"
        ));
        assert!(text.contains("        b1.property::<Option<String>>(\"City\");"));
    }

    #[test]
    fn test_relationship() {
        let mut order = EntityDescriptor::new("Order");
        order.relationships = vec![RelationshipDescriptor {
            principal: "User".to_string(),
            foreign_key: vec!["UserId".to_string()],
            navigation: Some("Customer".to_string()),
            inverse_navigation: Some("Orders".to_string()),
            inverse_collection: true,
            required: true,
            delete_behavior: DeleteBehavior::Cascade,
        }];

        let mut out = IndentedWriter::new();
        FluentCodeEmitter::new().emit_entity_shape("model_builder", &order, &mut out);

        let text = out.into_string();
        assert!(text.contains("b.has_one(\"User\", Some(\"Customer\"))"));
        assert!(text.contains("        .with_many(Some(\"Orders\"))"));
        assert!(text.contains(".on_delete(DeleteBehavior::Cascade)"));
    }

    #[test]
    fn test_model_annotations_statement() {
        let mut annotations = Annotations::new();
        annotations.insert("ProductVersion".to_string(), "2.0.0".into());
        annotations.insert("Relational:MaxIdentifierLength".to_string(), 63.into());

        let mut out = IndentedWriter::new();
        FluentCodeEmitter::new().emit_annotations(
            "model_builder",
            AnnotationTarget::Model,
            &mut out,
            &annotations,
            false,
            false,
        );

        assert_eq!(
            out.as_str(),
            "model_builder\n    .has_annotation(\"ProductVersion\", \"2.0.0\")\n    .has_max_identifier_length(63);\n"
        );
    }

    #[test]
    fn test_empty_annotations_write_nothing() {
        let mut out = IndentedWriter::new();
        FluentCodeEmitter::new().emit_annotations(
            "model_builder",
            AnnotationTarget::Model,
            &mut out,
            &Annotations::new(),
            false,
            true,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_sequence_skips_defaults() {
        let mut sequence = SequenceDescriptor::new("OrderNumbers");
        sequence.schema = Some("shop".to_string());
        sequence.start_value = 1000;

        let mut out = IndentedWriter::new();
        FluentCodeEmitter::new().emit_sequence("model_builder", &sequence, &mut out);

        assert_eq!(
            out.as_str(),
            "model_builder.has_sequence::<i64>(\"OrderNumbers\", Some(\"shop\"))\n    .starts_at(1000);\n"
        );
    }
}
