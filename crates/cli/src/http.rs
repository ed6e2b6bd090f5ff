//! JSON:API client on top of `ureq`.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value};

use api_explorer_core::client::{ListPage, Query, ResourceClient};
use api_explorer_core::config::Connection;
use api_explorer_core::error::{Error, Result};
use api_explorer_core::jsonapi::{create_document, Linkage, Resource};

/// Media type of every request and response body.
pub const CONTENT_TYPE: &str = "application/vnd.api+json";

pub struct HttpClient {
    agent: ureq::Agent,
    connection: Connection,
}

/// Maps a `ureq` failure; error statuses keep the response body as the message.
pub fn map_error(error: ureq::Error) -> Error {
    match error {
        ureq::Error::Status(status, response) => Error::Api {
            status,
            message: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => Error::Transport(transport.to_string()),
    }
}

impl HttpClient {
    pub fn new(connection: Connection) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            connection,
        }
    }

    /// Absolute URL for `path`; links from responses may already be absolute.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        format!(
            "{}/{}",
            self.connection.host,
            path.trim_start_matches('/')
        )
    }

    fn resource_url(&self, resource_type: &str, id: &str) -> String {
        self.url(&format!("{resource_type}/{}", urlencoding::encode(id)))
    }

    fn send(&self, method: &str, url: &str, body: Option<&Value>) -> Result<Option<Value>> {
        debug!("{method} {url}");

        let mut request = self
            .agent
            .request(method, url)
            .set(
                "Authorization",
                &format!("Bearer {}", self.connection.token),
            )
            .set("Accept", CONTENT_TYPE);
        for (name, value) in &self.connection.headers {
            request = request.set(name, value);
        }

        let response = match body {
            Some(body) => request
                .set("Content-Type", CONTENT_TYPE)
                .send_string(&body.to_string()),
            None => request.call(),
        }
        .map_err(map_error)?;

        let text = response
            .into_string()
            .map_err(|e| Error::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::json_error("parsing", "response", url, e))
    }

    fn fetch(&self, method: &str, url: &str, body: Option<&Value>) -> Result<Value> {
        self.send(method, url, body)?
            .ok_or_else(|| Error::payload(format!("empty response from {url}")))
    }
}

impl ResourceClient for HttpClient {
    fn list(&mut self, resource_type: &str, query: &Query) -> Result<ListPage> {
        let mut url = self.url(resource_type);
        if !query.is_empty() {
            url = format!("{url}?{}", query.encode());
        }

        Ok(ListPage::from_payload(self.fetch("GET", &url, None)?))
    }

    fn list_path(&mut self, path: &str) -> Result<ListPage> {
        let url = self.url(path);
        Ok(ListPage::from_payload(self.fetch("GET", &url, None)?))
    }

    fn get(&mut self, resource_type: &str, id: &str) -> Result<Resource> {
        let url = self.resource_url(resource_type, id);
        Resource::from_document(&self.fetch("GET", &url, None)?)
    }

    fn save(&mut self, resource: &Resource, fields: &[String]) -> Result<()> {
        let url = self.resource_url(&resource.resource_type, &resource.id);
        self.send("PATCH", &url, Some(&resource.patch_document(fields)))?;
        Ok(())
    }

    fn create(
        &mut self,
        resource_type: &str,
        attributes: &Map<String, Value>,
        relationships: &BTreeMap<String, Linkage>,
    ) -> Result<Resource> {
        let url = self.url(resource_type);
        let document = create_document(resource_type, attributes, relationships);
        Resource::from_document(&self.fetch("POST", &url, Some(&document))?)
    }

    fn delete(&mut self, resource_type: &str, id: &str) -> Result<()> {
        let url = self.resource_url(resource_type, id);
        self.send("DELETE", &url, None)?;
        Ok(())
    }
}
