//! The operations behind the leaf commands.

use std::collections::BTreeMap;
use std::io::Write;

use log::{debug, info};
use serde_json::{Map, Value};

use crate::client::ResourceClient;
use crate::edit::{edit_resource, new_attributes};
use crate::error::{Error, Result};
use crate::interaction::{Editor, Pager, Prompter};
use crate::jsonapi::{Identifier, Linkage, Relationship};
use crate::resolve::{Inputs, Resolver};
use crate::schema::{singular, Schema};
use crate::selection::Picker;
use crate::session::{record_pagination, SessionStore, NEXT_KEY, PREVIOUS_KEY};
use crate::tree::Action;

/// Everything an action may need, borrowed for the duration of one command.
///
/// `client` is `None` when no API connection is configured; only the actions
/// that don't talk to the API can run then.
pub struct Explorer<'a> {
    pub schema: &'a Schema,
    pub client: Option<&'a mut dyn ResourceClient>,
    pub session: &'a dyn SessionStore,
    pub picker: &'a mut dyn Picker,
    pub pager: &'a mut dyn Pager,
    pub editor: &'a mut dyn Editor,
    pub prompter: &'a mut dyn Prompter,
    /// Where status messages go.
    pub output: &'a mut dyn Write,
}

fn connected<'c, 'a>(
    client: &'c mut Option<&'a mut dyn ResourceClient>,
) -> Result<&'c mut (dyn ResourceClient + 'a)> {
    client.as_deref_mut().ok_or(Error::NotConnected)
}

fn pretty(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(Error::payload)
}

impl<'a> Explorer<'a> {
    /// Runs `action` with the flag values collected from the command line.
    ///
    /// # Errors
    ///
    /// Returns whatever error stopped the action. Declining a deletion is not an error.
    pub fn run(&mut self, action: &Action, inputs: &Inputs) -> Result<()> {
        debug!("Running {action:?}");

        match action {
            Action::GetMany { resource } => self.get_many(resource, inputs),
            Action::GetOne { resource } => self.get_one(resource, inputs),
            Action::GetRelated {
                resource,
                relationship,
            } => self.get_related(resource, relationship, inputs),
            Action::GetNext => self.get_page(NEXT_KEY),
            Action::GetPrevious => self.get_page(PREVIOUS_KEY),
            Action::Create { resource } => self.create(resource, inputs),
            Action::Edit { resource } => self.edit(resource, inputs),
            Action::Delete { resource } => self.delete(resource, inputs),
            Action::Select { resource } => self.select(resource, inputs),
            Action::Clear { resource } => self.clear(resource),
            Action::ClearAll => self.clear_all(),
            Action::Change {
                resource,
                relationship,
            } => self.change(resource, relationship, inputs),
        }
    }

    fn resolver<'b>(&'b mut self, inputs: &'b Inputs) -> Result<Resolver<'b>> {
        let client = connected(&mut self.client)?;
        Ok(Resolver::new(
            self.schema,
            inputs,
            client,
            self.session,
            &mut *self.picker,
        ))
    }

    /// The primary subject of an operation, which must exist.
    fn subject(&mut self, resource_name: &str, inputs: &Inputs) -> Result<String> {
        self.resolver(inputs)?
            .resolve(resource_name, true)?
            .ok_or_else(|| Error::NotFound(singular(resource_name).to_string()))
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}").map_err(Error::Stdio)
    }

    fn page(&mut self, value: &Value) -> Result<()> {
        let document = pretty(value)?;
        self.pager.page(&document)
    }

    fn get_many(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        self.schema.resource(resource_name)?;

        let query = self.resolver(inputs)?.filter_query(resource_name)?;
        let page = connected(&mut self.client)?.list(resource_name, &query)?;
        record_pagination(self.session, &page.links)?;

        self.page(&page.payload)
    }

    fn get_page(&mut self, key: &str) -> Result<()> {
        let Some(link) = self.session.load(key)? else {
            return Err(Error::NoPage(key.to_string()));
        };

        debug!("Following stored {key} cursor `{link}`");
        let page = connected(&mut self.client)?.list_path(&link)?;
        record_pagination(self.session, &page.links)?;

        self.page(&page.payload)
    }

    fn get_one(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        let id = self.subject(resource_name, inputs)?;
        let item = connected(&mut self.client)?.get(resource_name, &id)?;
        self.page(&item.raw)
    }

    fn get_related(
        &mut self,
        resource_name: &str,
        relationship_name: &str,
        inputs: &Inputs,
    ) -> Result<()> {
        self.schema.relationship(resource_name, relationship_name)?;

        let id = self.subject(resource_name, inputs)?;
        let client = connected(&mut self.client)?;
        let parent = client.get(resource_name, &id)?;

        let link = parent
            .relationships
            .get(relationship_name)
            .and_then(|relationship| relationship.related.clone())
            .ok_or_else(|| {
                Error::NoRelatedLink(
                    singular(resource_name).to_string(),
                    id.clone(),
                    relationship_name.to_string(),
                )
            })?;

        let page = client.list_path(&link)?;
        // To-one relationships answer with a single resource; those aren't pages
        if page.payload.get("data").is_some_and(Value::is_array) {
            record_pagination(self.session, &page.links)?;
        }

        self.page(&page.payload)
    }

    fn create(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        let schema = self.schema;
        let create_one = schema
            .resource(resource_name)?
            .operations
            .create_one
            .as_ref()
            .ok_or_else(|| {
                Error::UnsupportedOperation(resource_name.to_string(), "create".to_string())
            })?;

        let mut relationships = BTreeMap::new();
        if let Some(declared) = &create_one.relationships {
            for (name, target) in &declared.required {
                let id = self
                    .resolver(inputs)?
                    .reference(Some(name.as_str()), target, true)?
                    .ok_or_else(|| Error::NotFound(singular(target).to_string()))?;
                relationships.insert(name.clone(), Linkage::One(Identifier::new(target, id)));
            }

            for (name, target) in &declared.optional {
                let id = self
                    .resolver(inputs)?
                    .reference(Some(name.as_str()), target, false)?;
                let linkage = match id {
                    Some(id) => Linkage::One(Identifier::new(target, id)),
                    None => Linkage::Absent,
                };
                relationships.insert(name.clone(), linkage);
            }
        }

        let attributes = match &create_one.attributes {
            Some(declared) => new_attributes(&mut *self.editor, declared)?,
            None => Map::new(),
        };

        let created =
            connected(&mut self.client)?.create(resource_name, &attributes, &relationships)?;
        info!("Created {} {}", created.resource_type, created.id);

        self.say(&format!("Created {}: {}", singular(resource_name), created.id))?;
        self.page(&created.raw)
    }

    fn edit(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        let schema = self.schema;
        let edit_one = schema
            .resource(resource_name)?
            .operations
            .edit_one
            .as_ref()
            .ok_or_else(|| {
                Error::UnsupportedOperation(resource_name.to_string(), "edit".to_string())
            })?;

        let id = self.subject(resource_name, inputs)?;
        let client = connected(&mut self.client)?;
        let mut item = client.get(resource_name, &id)?;

        let fields = edit_resource(&mut *self.editor, client, &mut item, &edit_one.fields)?;

        self.say(&format!(
            "Saved {} {id}: {}",
            singular(resource_name),
            fields.join(", ")
        ))
    }

    fn delete(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        let singular = singular(resource_name);
        let id = self.subject(resource_name, inputs)?;

        let question = format!("About to delete {singular}: {id}, are you sure (y/N)? ");
        if !self.prompter.confirm(&question)? {
            return self.say("Deletion aborted");
        }

        connected(&mut self.client)?.delete(resource_name, &id)?;
        info!("Deleted {resource_name} {id}");

        // Don't leave a selection pointing at something that is gone
        if self.session.load(singular)?.as_deref() == Some(id.as_str()) {
            self.session.clear(singular)?;
        }

        self.say(&format!("Deleted {singular}: {id}"))
    }

    fn select(&mut self, resource_name: &str, inputs: &Inputs) -> Result<()> {
        let singular = singular(resource_name);
        let id = self
            .resolver(inputs)?
            .select(resource_name, true)?
            .ok_or_else(|| Error::NotFound(singular.to_string()))?;

        self.session.save(singular, &id)?;
        self.say(&format!("Saved {singular}: {id}"))
    }

    fn clear(&mut self, resource_name: &str) -> Result<()> {
        let singular = singular(resource_name);

        if self.session.load(singular)?.is_none() {
            let location = self.session.location();
            return self.say(&format!("Key {singular} has no entry in {location}"));
        }

        self.session.clear(singular)?;
        self.say(&format!("Cleared {singular}"))
    }

    fn clear_all(&mut self) -> Result<()> {
        let location = self.session.location();
        self.session.clear_all()?;
        self.say(&format!("Removed {location} successfully"))
    }

    fn change(
        &mut self,
        resource_name: &str,
        relationship_name: &str,
        inputs: &Inputs,
    ) -> Result<()> {
        let schema = self.schema;
        let target = &schema
            .relationship(resource_name, relationship_name)?
            .resource;

        let id = self.subject(resource_name, inputs)?;
        let mut parent = connected(&mut self.client)?.get(resource_name, &id)?;

        let to_many = match parent.relationships.get(relationship_name) {
            Some(Relationship {
                linkage: Linkage::Absent,
                related: Some(link),
            }) => {
                // Links only: the related document tells one from many
                debug!("Checking cardinality of {relationship_name} through `{link}`");
                let page = connected(&mut self.client)?.list_path(link)?;
                page.payload.get("data").is_some_and(Value::is_array)
            }
            Some(Relationship {
                linkage: Linkage::Absent,
                related: None,
            })
            | None => {
                return Err(Error::UnknownCardinality(
                    singular(resource_name).to_string(),
                    id,
                    relationship_name.to_string(),
                ))
            }
            Some(relationship) => relationship.linkage.is_to_many(),
        };

        let linkage = if to_many {
            let ids = self.resolver(inputs)?.select_many(target)?;
            Linkage::Many(
                ids.into_iter()
                    .map(|id| Identifier::new(target.as_str(), id))
                    .collect(),
            )
        } else {
            match self.resolver(inputs)?.select(target, false)? {
                Some(id) => Linkage::One(Identifier::new(target.as_str(), id)),
                None => Linkage::Null,
            }
        };

        parent
            .relationships
            .entry(relationship_name.to_string())
            .or_default()
            .linkage = linkage;

        connected(&mut self.client)?.save(&parent, &[relationship_name.to_string()])?;
        info!("Changed {relationship_name} of {resource_name} {id}");

        self.say(&format!(
            "Changed {relationship_name} of {}: {id}",
            singular(resource_name)
        ))
    }
}
