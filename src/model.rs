//! Schema Model
//!
//! The fully resolved, in-memory description of the schema at the moment a
//! snapshot is requested. Produced by the host framework and treated as
//! read-only by the snapshot engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation set, ordered by key so emitted text is stable
pub type Annotations = BTreeMap<String, serde_json::Value>;

/// Annotation key carrying the producer version of the model
pub const PRODUCT_VERSION_ANNOTATION: &str = "ProductVersion";

/// Complete schema model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub sequences: Vec<SequenceDescriptor>,
    /// Version of the tool that produced the model (e.g. "2.0.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,
}

impl SchemaModel {
    /// Entities that get their own snapshot unit, in model order
    pub fn standalone_entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter().filter(|e| !e.is_owned())
    }

    /// Model annotations merged with the injected producer version
    pub fn snapshot_annotations(&self) -> Annotations {
        let mut annotations = self.annotations.clone();
        if let Some(version) = &self.product_version {
            annotations.insert(
                PRODUCT_VERSION_ANNOTATION.to_string(),
                serde_json::Value::String(version.clone()),
            );
        }
        annotations
    }

    pub fn find_entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// One entity type of the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    /// Full logical name (e.g. "Shop.Models.User")
    pub name: String,
    /// Short display name; absent for shared-type entities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Name of the owning entity; owned entities live inside their owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDescriptor>,
    /// Owned types navigated to from this entity
    #[serde(default)]
    pub owned: Vec<OwnedNavigation>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Name used for identifiers: the display name, or the raw name when
    /// no display name is available
    pub fn identifier_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display) if !display.trim().is_empty() => display,
            _ => &self.name,
        }
    }
}

/// Scalar property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_generated: Option<ValueGenerated>,
    #[serde(default)]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueGenerated {
    OnAdd,
    OnUpdate,
    OnAddOrUpdate,
}

/// Index over one or more properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub unique: bool,
}

/// Relationship from this entity (dependent) to a principal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDescriptor {
    pub principal: String,
    pub foreign_key: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_navigation: Option<String>,
    #[serde(default)]
    pub inverse_collection: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub delete_behavior: DeleteBehavior,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteBehavior {
    #[default]
    ClientSetNull,
    Cascade,
    Restrict,
    SetNull,
    NoAction,
}

impl DeleteBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteBehavior::ClientSetNull => "ClientSetNull",
            DeleteBehavior::Cascade => "Cascade",
            DeleteBehavior::Restrict => "Restrict",
            DeleteBehavior::SetNull => "SetNull",
            DeleteBehavior::NoAction => "NoAction",
        }
    }
}

/// Navigation from an owner to an owned entity embedded in it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNavigation {
    pub navigation: String,
    #[serde(default)]
    pub collection: bool,
    pub entity: EntityDescriptor,
}

/// Database sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default = "default_sequence_type")]
    pub type_name: String,
    #[serde(default = "default_start_value")]
    pub start_value: i64,
    #[serde(default = "default_increment")]
    pub increment_by: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub cyclic: bool,
}

impl SequenceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            type_name: default_sequence_type(),
            start_value: default_start_value(),
            increment_by: default_increment(),
            min_value: None,
            max_value: None,
            cyclic: false,
        }
    }
}

fn default_sequence_type() -> String {
    "i64".to_string()
}

fn default_start_value() -> i64 {
    1
}

fn default_increment() -> i32 {
    1
}
