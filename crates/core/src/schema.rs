//! Typed model of the resource description document.
//!
//! The document lists every resource type the API exposes (keyed by its
//! plural name), the operations each one supports, the filters its list
//! endpoint accepts and the relationships that can be read or changed.
//! Maps are `BTreeMap`s so every walk over the schema is sorted by name.

use std::collections::BTreeMap;
use std::fs;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Schema document compiled into the binary, used when no other is configured.
pub const BUILTIN_SCHEMA: &str = include_str!("../schema/resources.json");

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Schema {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSchema>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    #[serde(default)]
    pub operations: Operations,
    #[serde(default)]
    pub relationships: BTreeMap<String, RelationshipSchema>,
    pub display: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Operations {
    pub get_many: Option<GetMany>,
    pub get_one: Option<Summary>,
    pub create_one: Option<CreateOne>,
    pub edit_one: Option<EditOne>,
    pub delete: Option<Summary>,
    pub select: Option<Summary>,
    pub clear: Option<Summary>,
}

/// An operation that carries nothing but its help text.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub summary: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GetMany {
    pub summary: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, Filter>,
}

/// A constraint accepted by a list endpoint.
///
/// When `resource` is set the value is the ID of a resource of that type and
/// has to be resolved like any other resource rather than taken literally.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Filter {
    #[serde(default)]
    pub description: String,
    pub resource: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateOne {
    pub summary: Option<String>,
    pub attributes: Option<CreateAttributes>,
    pub relationships: Option<CreateRelationships>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateAttributes {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

/// Relationship name to the plural name of the resource type it points to.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateRelationships {
    #[serde(default)]
    pub required: BTreeMap<String, String>,
    #[serde(default)]
    pub optional: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EditOne {
    pub summary: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RelationshipSchema {
    pub resource: String,
    #[serde(default)]
    pub operations: RelationshipOperations,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RelationshipOperations {
    pub change: Option<Summary>,
    pub get: Option<Summary>,
}

/// Singular form of a plural resource type name: the trailing character is dropped.
pub fn singular(resource_name: &str) -> &str {
    let mut chars = resource_name.chars();
    chars.next_back();
    chars.as_str()
}

/// Flag spelling of a schema name; `__` and `_` both become `-`.
pub fn kebab(name: &str) -> String {
    name.replace("__", "-").replace('_', "-")
}

impl Schema {
    /// Parses a schema document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or doesn't match
    /// the expected structure.
    pub fn from_json(document: &str, path: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|e| Error::json_error("parsing", "schema", path, e))
    }

    /// The schema compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is broken.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SCHEMA, "<builtin>")
    }

    /// Loads the schema from `path`, or the builtin one when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            debug!("Using builtin schema");
            return Self::builtin();
        };

        debug!("Loading schema from `{path}`");
        let document = fs::read_to_string(path)
            .map_err(|e| Error::io_error("schema".to_string(), path.to_string(), e))?;

        Self::from_json(&document, path)
    }

    /// Looks up a resource type by its plural name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownResource`] if the schema doesn't describe it.
    pub fn resource(&self, resource_name: &str) -> Result<&ResourceSchema> {
        self.resources
            .get(resource_name)
            .ok_or_else(|| Error::UnknownResource(resource_name.to_string()))
    }

    /// Looks up a relationship of a resource type.
    ///
    /// # Errors
    ///
    /// Returns an error if either the resource type or the relationship is unknown.
    pub fn relationship(
        &self,
        resource_name: &str,
        relationship_name: &str,
    ) -> Result<&RelationshipSchema> {
        self.resource(resource_name)?
            .relationships
            .get(relationship_name)
            .ok_or_else(|| {
                Error::UnknownRelationship(
                    resource_name.to_string(),
                    relationship_name.to_string(),
                )
            })
    }
}

impl ResourceSchema {
    /// Filters declared on the list operation; empty when there is no list operation.
    pub fn filters(&self) -> impl Iterator<Item = (&String, &Filter)> {
        self.operations
            .get_many
            .iter()
            .flat_map(|get_many| get_many.filters.iter())
    }
}
