//! Working out which resource instance an operation acts on.
//!
//! The ID of a resource is taken from, in order:
//!
//! 1. `--id`, only for the primary subject of an operation;
//! 2. a typed flag: `--<filter>-id` while resolving a filter, then `--<singular>-id`;
//! 3. the session, under the singular resource name;
//! 4. an interactive lookup: the resource's own filters are resolved the same
//!    way (recursively), every page of the filtered list is fetched and the
//!    operator picks one item, unless the list leaves nothing to choose.

use std::collections::HashMap;

use log::debug;

use crate::client::{list_all, Query, ResourceClient};
use crate::display;
use crate::error::{Error, Result};
use crate::jsonapi::Resource;
use crate::schema::{kebab, singular, Schema};
use crate::selection::{pick_many, pick_one, Picker};
use crate::session::SessionStore;

/// Flag naming the primary subject of an operation.
pub const ID_FLAG: &str = "id";

/// Flag values given on the command line, keyed by flag name.
///
/// Empty values are treated as not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    values: HashMap<String, String>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(name.into(), value);
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Flag carrying the ID of a resource referenced by `name` (a filter, relationship or resource).
pub fn id_flag(name: &str) -> String {
    format!("{}-id", kebab(name))
}

pub struct Resolver<'a> {
    schema: &'a Schema,
    inputs: &'a Inputs,
    client: &'a mut dyn ResourceClient,
    session: &'a dyn SessionStore,
    picker: &'a mut dyn Picker,
    // Resource types whose filters are being resolved, outermost first
    chain: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        schema: &'a Schema,
        inputs: &'a Inputs,
        client: &'a mut dyn ResourceClient,
        session: &'a dyn SessionStore,
        picker: &'a mut dyn Picker,
    ) -> Self {
        Self {
            schema,
            inputs,
            client,
            session,
            picker,
            chain: Vec::new(),
        }
    }

    /// Resolves the primary subject of an operation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required resource can't be found, the operator
    /// cancels a selection, or a remote or session lookup fails.
    pub fn resolve(&mut self, resource_name: &str, required: bool) -> Result<Option<String>> {
        if let Some(id) = self.inputs.get(ID_FLAG) {
            debug!("Using --{ID_FLAG} `{id}` for {resource_name}");
            return Ok(Some(id.to_string()));
        }

        self.reference(None, resource_name, required)
    }

    /// Resolves a resource that `via` (a filter or relationship name) points to.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn reference(
        &mut self,
        via: Option<&str>,
        resource_name: &str,
        required: bool,
    ) -> Result<Option<String>> {
        let singular = singular(resource_name);

        let flags = via
            .map(id_flag)
            .into_iter()
            .chain(std::iter::once(id_flag(singular)));
        for flag in flags {
            if let Some(id) = self.inputs.get(&flag) {
                debug!("Using --{flag} `{id}` for {resource_name}");
                return Ok(Some(id.to_string()));
            }
        }

        if let Some(id) = self.session.load(singular)? {
            debug!("Using session value `{id}` for {singular}");
            return Ok(Some(id));
        }

        self.select(resource_name, required)
    }

    /// Interactive lookup of a single resource, skipping flags and session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the list is empty and a resource is required.
    pub fn select(&mut self, resource_name: &str, required: bool) -> Result<Option<String>> {
        let singular = singular(resource_name);
        let items = self.candidates(resource_name)?;

        if items.is_empty() {
            return if required {
                Err(Error::NotFound(singular.to_string()))
            } else {
                Ok(None)
            };
        }

        if let [only] = items.as_slice() {
            debug!("Only one {singular} matches, selecting `{}`", only.id);
            return Ok(Some(only.id.clone()));
        }

        let template = self.display_template(resource_name);
        let chosen = pick_one(
            &mut *self.picker,
            &format!("Select {singular}"),
            &items,
            |item| display::label(template.as_deref(), item),
            display::preview,
            !required,
        )?;

        Ok(chosen.map(|index| items[index].id.clone()))
    }

    /// Interactive lookup of any number of resources; the empty entry is always offered.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or the operator cancels.
    pub fn select_many(&mut self, resource_name: &str) -> Result<Vec<String>> {
        let items = self.candidates(resource_name)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let template = self.display_template(resource_name);
        let chosen = pick_many(
            &mut *self.picker,
            &format!("Select {resource_name}"),
            &items,
            |item| display::label(template.as_deref(), item),
            display::preview,
            true,
        )?;

        Ok(chosen.into_iter().map(|index| items[index].id.clone()).collect())
    }

    /// Builds the list query for `resource_name` from its declared filters.
    ///
    /// Resource-typed filters are resolved like any other reference; plain
    /// filters come from their own flag. Filters without a value are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if resolving a resource-typed filter fails.
    pub fn filter_query(&mut self, resource_name: &str) -> Result<Query> {
        let schema = self.schema;
        let mut query = Query::new();

        let Some(resource) = schema.resources.get(resource_name) else {
            return Ok(query);
        };

        for (filter_name, filter) in resource.filters() {
            let value = match &filter.resource {
                Some(target) => {
                    self.reference(Some(filter_name.as_str()), target, filter.required)?
                }
                None => self.inputs.get(&kebab(filter_name)).map(ToString::to_string),
            };

            if let Some(value) = value {
                query.filters.insert(filter_name.clone(), value);
            }
        }

        Ok(query)
    }

    fn candidates(&mut self, resource_name: &str) -> Result<Vec<Resource>> {
        if self.chain.iter().any(|name| name == resource_name) {
            let mut cycle = self.chain.clone();
            cycle.push(resource_name.to_string());
            return Err(Error::FilterCycle(cycle));
        }

        self.chain.push(resource_name.to_string());
        let query = self.filter_query(resource_name);
        self.chain.pop();

        let query = query?;
        debug!("Listing {resource_name} with `{}`", query.encode());
        list_all(&mut *self.client, resource_name, &query)
    }

    fn display_template(&self, resource_name: &str) -> Option<String> {
        self.schema
            .resources
            .get(resource_name)
            .and_then(|resource| resource.display.clone())
    }
}
