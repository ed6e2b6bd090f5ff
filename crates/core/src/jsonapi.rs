//! Just enough of the JSON:API document format to browse and mutate resources.
//!
//! Resources keep the raw object they were parsed from so it can be shown to
//! the operator unchanged (picker previews, pager output).

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub resource_type: String,
    pub id: String,
}

/// The `data` member of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Linkage {
    /// The relationship object carries no `data` member (links only).
    #[default]
    Absent,
    Null,
    One(Identifier),
    Many(Vec<Identifier>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub linkage: Linkage,
    pub related: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub resource_type: String,
    pub id: String,
    pub attributes: Map<String, Value>,
    pub relationships: BTreeMap<String, Relationship>,
    pub raw: Value,
}

impl Identifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        let resource_type = string_member(value, "type")?;
        let id = string_member(value, "id")?;
        Ok(Self { resource_type, id })
    }

    pub fn to_value(&self) -> Value {
        json!({"type": self.resource_type, "id": self.id})
    }
}

impl Linkage {
    fn from_relationship(value: &Value) -> Result<Self> {
        match value.get("data") {
            None => Ok(Self::Absent),
            Some(Value::Null) => Ok(Self::Null),
            Some(Value::Array(items)) => Ok(Self::Many(
                items
                    .iter()
                    .map(Identifier::from_value)
                    .collect::<Result<_>>()?,
            )),
            Some(item) => Ok(Self::One(Identifier::from_value(item)?)),
        }
    }

    /// The `data` member to send, or `None` when there is nothing to send.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::One(identifier) => Some(identifier.to_value()),
            Self::Many(identifiers) => Some(Value::Array(
                identifiers.iter().map(Identifier::to_value).collect(),
            )),
        }
    }

    pub fn is_to_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl Resource {
    /// Parses a single resource object (an element of a document's `data`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Payload`] if `type` or `id` is missing.
    pub fn from_value(value: &Value) -> Result<Self> {
        let resource_type = string_member(value, "type")?;
        let id = string_member(value, "id")?;

        let attributes = match value.get("attributes") {
            Some(Value::Object(attributes)) => attributes.clone(),
            _ => Map::new(),
        };

        let mut relationships = BTreeMap::new();
        if let Some(Value::Object(members)) = value.get("relationships") {
            for (name, relationship) in members {
                let related = relationship
                    .pointer("/links/related")
                    .and_then(related_link);
                relationships.insert(
                    name.clone(),
                    Relationship {
                        linkage: Linkage::from_relationship(relationship)?,
                        related,
                    },
                );
            }
        }

        Ok(Self {
            resource_type,
            id,
            attributes,
            relationships,
            raw: value.clone(),
        })
    }

    /// Parses a single-resource document (`{"data": {...}}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Payload`] if `data` is not a resource object.
    pub fn from_document(document: &Value) -> Result<Self> {
        match document.get("data") {
            Some(data @ Value::Object(_)) => Self::from_value(data),
            _ => Err(Error::payload("expected `data` to be an object")),
        }
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.resource_type.clone(), self.id.clone())
    }

    /// Document for a partial update carrying only `fields`.
    ///
    /// A field is looked up among the attributes first, then among the relationships.
    pub fn patch_document(&self, fields: &[String]) -> Value {
        let mut attributes = Map::new();
        let mut relationships = Map::new();

        for field in fields {
            if let Some(value) = self.attributes.get(field) {
                attributes.insert(field.clone(), value.clone());
            } else if let Some(data) = self
                .relationships
                .get(field)
                .and_then(|relationship| relationship.linkage.to_value())
            {
                relationships.insert(field.clone(), json!({ "data": data }));
            }
        }

        let mut data = Map::new();
        data.insert("type".to_string(), json!(self.resource_type));
        data.insert("id".to_string(), json!(self.id));
        if !attributes.is_empty() {
            data.insert("attributes".to_string(), Value::Object(attributes));
        }
        if !relationships.is_empty() {
            data.insert("relationships".to_string(), Value::Object(relationships));
        }

        json!({ "data": data })
    }
}

/// Document for creating a resource.
pub fn create_document(
    resource_type: &str,
    attributes: &Map<String, Value>,
    relationships: &BTreeMap<String, Linkage>,
) -> Value {
    let mut data = Map::new();
    data.insert("type".to_string(), json!(resource_type));
    data.insert("attributes".to_string(), Value::Object(attributes.clone()));

    let relationships: Map<String, Value> = relationships
        .iter()
        .filter_map(|(name, linkage)| {
            linkage
                .to_value()
                .map(|data| (name.clone(), json!({ "data": data })))
        })
        .collect();
    if !relationships.is_empty() {
        data.insert("relationships".to_string(), Value::Object(relationships));
    }

    json!({ "data": data })
}

/// Turns a list payload into typed resources.
///
/// # Errors
///
/// Returns [`Error::Payload`] if `data` is not an array of resource objects.
pub fn parse_list(payload: &Value) -> Result<Vec<Resource>> {
    match payload.get("data") {
        Some(Value::Array(items)) => items.iter().map(Resource::from_value).collect(),
        _ => Err(Error::payload("expected `data` to be an array")),
    }
}

fn string_member(value: &Value, member: &str) -> Result<String> {
    match value.get(member) {
        Some(Value::String(s)) => Ok(s.clone()),
        // Some servers send numeric IDs
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::payload(format!("missing `{member}` in {value}"))),
    }
}

/// A link is either a plain string or an object with an `href`.
pub(crate) fn related_link(value: &Value) -> Option<String> {
    match value {
        Value::String(link) if !link.is_empty() => Some(link.clone()),
        Value::Object(link) => link
            .get("href")
            .and_then(Value::as_str)
            .filter(|href| !href.is_empty())
            .map(ToString::to_string),
        _ => None,
    }
}
