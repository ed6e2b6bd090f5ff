//! Human readable labels and previews for resources.
//!
//! A resource type's `display` template is a `leon` template whose keys are
//! attribute names, plus `id` and `type`.

use std::collections::HashMap;

use leon::Template;
use log::warn;
use serde_json::Value;

use crate::error::Result;
use crate::jsonapi::Resource;

fn template_context(resource: &Resource) -> HashMap<String, String> {
    let mut context: HashMap<String, String> = resource
        .attributes
        .iter()
        .map(|(name, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name.clone(), rendered)
        })
        .collect();

    context.insert("id".to_string(), resource.id.clone());
    context.insert("type".to_string(), resource.resource_type.clone());
    context
}

/// Renders `template` for `resource`.
///
/// # Errors
///
/// Returns an error if the template is malformed or names a missing key.
pub fn render_label(template: &str, resource: &Resource) -> Result<String> {
    let template = Template::parse(template)?;
    let context = template_context(resource);
    Ok(template.render(&context)?)
}

/// Label for the picker; falls back to the id when there is no usable template.
pub fn label(template: Option<&str>, resource: &Resource) -> String {
    let Some(template) = template else {
        return resource.id.clone();
    };

    match render_label(template, resource) {
        Ok(label) => label,
        Err(e) => {
            warn!("Can't render `{template}` for {}: {e}", resource.id);
            resource.id.clone()
        }
    }
}

/// Pretty JSON of the whole resource object.
pub fn preview(resource: &Resource) -> String {
    serde_json::to_string_pretty(&resource.raw).unwrap_or_else(|_| resource.raw.to_string())
}
