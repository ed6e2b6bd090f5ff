//! Round-tripping attributes through the operator's editor.

use log::{debug, info};
use serde_json::{Map, Value};

use crate::client::ResourceClient;
use crate::error::{Error, Result};
use crate::interaction::Editor;
use crate::jsonapi::Resource;
use crate::schema::CreateAttributes;

/// The subset of `attributes` named in `editable_fields`.
pub fn editable_attributes(
    attributes: &Map<String, Value>,
    editable_fields: &[String],
) -> Map<String, Value> {
    attributes
        .iter()
        .filter(|(name, _)| editable_fields.contains(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Fields of `after` that existed in `before` with a different value.
///
/// Keys only present in `after` are ignored: an edit can't introduce attributes.
pub fn changed_attributes(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
) -> Map<String, Value> {
    after
        .iter()
        .filter(|(name, value)| {
            before
                .get(name.as_str())
                .is_some_and(|previous| previous != *value)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Parses what came back from the editor; it has to be a JSON object.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] for anything else.
pub fn parse_document(document: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice(document) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidDocument(format!("got {other}"))),
        Err(e) => Err(Error::InvalidDocument(e.to_string())),
    }
}

fn pretty(map: &Map<String, Value>) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(map).map_err(|e| Error::InvalidDocument(e.to_string()))
}

/// Lets the operator edit `editable_fields` of `resource` and saves what changed.
///
/// Returns the names of the saved fields.
///
/// # Errors
///
/// Returns [`Error::NothingChanged`] without contacting the API when the
/// document comes back with no changes, or an error from the editor or the
/// save request.
pub fn edit_resource(
    editor: &mut dyn Editor,
    client: &mut dyn ResourceClient,
    resource: &mut Resource,
    editable_fields: &[String],
) -> Result<Vec<String>> {
    let before = editable_attributes(&resource.attributes, editable_fields);

    let edited = editor.edit(&pretty(&before)?)?;
    let after = parse_document(&edited)?;

    let changed = changed_attributes(&before, &after);
    if changed.is_empty() {
        return Err(Error::NothingChanged);
    }

    let fields: Vec<String> = changed.keys().cloned().collect();
    debug!("Changed fields of {}: {fields:?}", resource.id);
    resource.attributes.extend(changed);

    client.save(resource, &fields)?;
    info!("Saved {} {}", resource.resource_type, resource.id);

    Ok(fields)
}

/// Asks the operator for the attributes of a new resource.
///
/// The editor starts from every declared attribute set to `null`. Required
/// attributes must be filled in, optional ones left `null` are dropped and
/// undeclared ones are rejected.
///
/// # Errors
///
/// Returns an error if the editor fails or the document breaks the rules above.
pub fn new_attributes(
    editor: &mut dyn Editor,
    declared: &CreateAttributes,
) -> Result<Map<String, Value>> {
    let template: Map<String, Value> = declared
        .required
        .iter()
        .chain(declared.optional.iter())
        .map(|name| (name.clone(), Value::Null))
        .collect();

    let edited = parse_document(&editor.edit(&pretty(&template)?)?)?;

    if let Some(unexpected) = edited.keys().find(|name| !template.contains_key(name.as_str())) {
        return Err(Error::UnexpectedAttribute(unexpected.clone()));
    }

    if let Some(missing) = declared
        .required
        .iter()
        .find(|name| edited.get(name.as_str()).map_or(true, Value::is_null))
    {
        return Err(Error::MissingAttribute(missing.clone()));
    }

    Ok(edited
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect())
}
