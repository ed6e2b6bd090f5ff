//! Contract for the remote side and the list query it is driven with.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::jsonapi::{self, related_link, Linkage, Resource};

/// Filters of a list request, encoded as `filter[name]=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: BTreeMap<String, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, name: &str, value: &str) -> Self {
        self.filters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn encode(&self) -> String {
        self.filters
            .iter()
            .map(|(name, value)| format!("filter[{name}]={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Pagination links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl PageLinks {
    pub fn from_payload(payload: &Value) -> Self {
        let link = |name: &str| {
            payload
                .get("links")
                .and_then(|links| links.get(name))
                .and_then(related_link)
        };

        Self {
            next: link("next"),
            previous: link("previous"),
        }
    }
}

/// One page of a list response, raw and with its links parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub payload: Value,
    pub links: PageLinks,
}

impl ListPage {
    pub fn from_payload(payload: Value) -> Self {
        let links = PageLinks::from_payload(&payload);
        Self { payload, links }
    }

    /// # Errors
    ///
    /// Returns an error if the payload's `data` is not a list of resources.
    pub fn items(&self) -> Result<Vec<Resource>> {
        jsonapi::parse_list(&self.payload)
    }
}

pub trait ResourceClient {
    /// Fetches the first page of `resource_type` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response isn't a list document.
    fn list(&mut self, resource_type: &str, query: &Query) -> Result<ListPage>;

    /// Fetches a list page by URL or host-relative path (pagination and related links).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response isn't a list document.
    fn list_path(&mut self, path: &str) -> Result<ListPage>;

    /// # Errors
    ///
    /// Returns an error if the request fails or the response isn't a resource document.
    fn get(&mut self, resource_type: &str, id: &str) -> Result<Resource>;

    /// Sends a partial update of `resource` carrying only `fields`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn save(&mut self, resource: &Resource, fields: &[String]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the request fails or the response isn't a resource document.
    fn create(
        &mut self,
        resource_type: &str,
        attributes: &Map<String, Value>,
        relationships: &BTreeMap<String, Linkage>,
    ) -> Result<Resource>;

    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn delete(&mut self, resource_type: &str, id: &str) -> Result<()>;
}

/// Lists every page of `resource_type` matching `query` and combines the items.
///
/// # Errors
///
/// Returns an error if any page fails to load or parse.
pub fn list_all(
    client: &mut dyn ResourceClient,
    resource_type: &str,
    query: &Query,
) -> Result<Vec<Resource>> {
    let mut page = client.list(resource_type, query)?;
    let mut items = page.items()?;

    while let Some(next) = page.links.next.take() {
        debug!("Following `{next}` for more {resource_type}");
        page = client.list_path(&next)?;
        items.extend(page.items()?);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_encode() {
        let query = Query::new()
            .filter("project", "o:acme:p:web")
            .filter("name", "a b");

        assert_eq!(
            query.encode(),
            "filter[name]=a%20b&filter[project]=o%3Aacme%3Ap%3Aweb"
        );
        assert_eq!(Query::new().encode(), "");
    }

    #[test]
    fn test_page_links() {
        let links = PageLinks::from_payload(&json!({
            "data": [],
            "links": {"next": "/projects?page=2", "previous": null, "self": "/projects"}
        }));

        assert_eq!(links.next.as_deref(), Some("/projects?page=2"));
        assert_eq!(links.previous, None);

        assert_eq!(PageLinks::from_payload(&json!({"data": []})), PageLinks::default());
    }
}
