//! Fakes for the collaborator traits, shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};

use api_explorer_core::actions::Explorer;
use api_explorer_core::client::{ListPage, Query, ResourceClient};
use api_explorer_core::error::{Error, Result};
use api_explorer_core::interaction::{Editor, Pager, Prompter};
use api_explorer_core::jsonapi::{create_document, Linkage, Resource};
use api_explorer_core::resolve::Inputs;
use api_explorer_core::schema::Schema;
use api_explorer_core::selection::{Entry, Picker};
use api_explorer_core::session::MemorySessionStore;
use api_explorer_core::tree::Action;
use serde_json::{json, Map, Value};

pub const SCHEMA: &str = r#"{
    "resources": {
        "organizations": {
            "operations": {"get_many": {}},
            "display": "{name}"
        },
        "projects": {
            "operations": {
                "get_many": {
                    "filters": {
                        "organization": {"description": "Organization", "resource": "organizations", "required": true}
                    }
                },
                "get_one": {},
                "edit_one": {"fields": ["name", "description"]},
                "delete": {},
                "select": {},
                "clear": {},
                "create_one": {
                    "attributes": {"required": ["name"], "optional": ["description"]},
                    "relationships": {"required": {"organization": "organizations"}}
                }
            },
            "relationships": {
                "team": {"resource": "teams", "operations": {"change": {}, "get": {}}},
                "languages": {"resource": "languages", "operations": {"change": {}}}
            },
            "display": "{name}"
        },
        "teams": {
            "operations": {"get_many": {}}
        },
        "languages": {
            "operations": {"get_many": {}}
        },
        "things": {
            "operations": {"get_one": {}, "edit_one": {"fields": ["a"]}}
        },
        "eggs": {
            "operations": {
                "get_many": {"filters": {"chicken": {"description": "", "resource": "chickens", "required": true}}}
            }
        },
        "chickens": {
            "operations": {
                "get_many": {"filters": {"egg": {"description": "", "resource": "eggs", "required": true}}}
            }
        }
    }
}"#;

pub fn schema() -> Schema {
    Schema::from_json(SCHEMA, "test").unwrap()
}

pub fn item(resource_type: &str, id: &str, attributes: Value) -> Value {
    json!({"type": resource_type, "id": id, "attributes": attributes})
}

/// Serves canned payloads and records every request.
#[derive(Default)]
pub struct FakeClient {
    /// First page of each resource type.
    pub lists: HashMap<String, Value>,
    /// Payloads served by URL or path.
    pub pages: HashMap<String, Value>,
    pub requests: Vec<String>,
    pub saved: Vec<Value>,
    pub created: Vec<Value>,
    pub deleted: Vec<String>,
}

impl FakeClient {
    pub fn with_list(mut self, resource_type: &str, items: Vec<Value>) -> Self {
        self.lists
            .insert(resource_type.to_string(), json!({ "data": items }));
        self
    }

    pub fn with_payload(mut self, resource_type: &str, payload: Value) -> Self {
        self.lists.insert(resource_type.to_string(), payload);
        self
    }

    pub fn with_page(mut self, path: &str, payload: Value) -> Self {
        self.pages.insert(path.to_string(), payload);
        self
    }
}

impl ResourceClient for FakeClient {
    fn list(&mut self, resource_type: &str, query: &Query) -> Result<ListPage> {
        self.requests
            .push(format!("list {resource_type}?{}", query.encode()));
        let payload = self
            .lists
            .get(resource_type)
            .cloned()
            .unwrap_or_else(|| json!({"data": []}));
        Ok(ListPage::from_payload(payload))
    }

    fn list_path(&mut self, path: &str) -> Result<ListPage> {
        self.requests.push(format!("list_path {path}"));
        match self.pages.get(path) {
            Some(payload) => Ok(ListPage::from_payload(payload.clone())),
            None => Err(Error::Api {
                status: 404,
                message: path.to_string(),
            }),
        }
    }

    fn get(&mut self, resource_type: &str, id: &str) -> Result<Resource> {
        self.requests.push(format!("get {resource_type}/{id}"));
        let found = self
            .lists
            .get(resource_type)
            .and_then(|payload| payload["data"].as_array())
            .and_then(|items| items.iter().find(|item| item["id"] == json!(id)));

        match found {
            Some(value) => Resource::from_value(value),
            None => Err(Error::Api {
                status: 404,
                message: format!("{resource_type}/{id}"),
            }),
        }
    }

    fn save(&mut self, resource: &Resource, fields: &[String]) -> Result<()> {
        self.saved.push(resource.patch_document(fields));
        Ok(())
    }

    fn create(
        &mut self,
        resource_type: &str,
        attributes: &Map<String, Value>,
        relationships: &BTreeMap<String, Linkage>,
    ) -> Result<Resource> {
        let document = create_document(resource_type, attributes, relationships);
        self.created.push(document.clone());

        let mut data = document["data"].clone();
        data["id"] = json!("new");
        Resource::from_value(&data)
    }

    fn delete(&mut self, resource_type: &str, id: &str) -> Result<()> {
        self.deleted.push(format!("{resource_type}/{id}"));
        Ok(())
    }
}

/// Answers with scripted indexes, one answer per call.
#[derive(Default)]
pub struct ScriptedPicker {
    pub answers: VecDeque<Vec<usize>>,
    pub headers: Vec<String>,
    pub shown: Vec<Vec<Entry>>,
}

impl ScriptedPicker {
    pub fn answering(answers: Vec<Vec<usize>>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    fn next(&mut self, header: &str, entries: &[Entry]) -> Result<Vec<usize>> {
        self.headers.push(header.to_string());
        self.shown.push(entries.to_vec());
        self.answers.pop_front().ok_or(Error::SelectionCancelled)
    }
}

impl Picker for ScriptedPicker {
    fn pick(&mut self, header: &str, entries: &[Entry]) -> Result<usize> {
        Ok(self.next(header, entries)?[0])
    }

    fn pick_many(&mut self, header: &str, entries: &[Entry]) -> Result<Vec<usize>> {
        self.next(header, entries)
    }
}

#[derive(Default)]
pub struct RecordingPager {
    pub pages: Vec<Value>,
}

impl Pager for RecordingPager {
    fn page(&mut self, document: &[u8]) -> Result<()> {
        self.pages.push(serde_json::from_slice(document).unwrap());
        Ok(())
    }
}

/// Returns a fixed document and remembers what it was given.
#[derive(Default)]
pub struct FixedEditor {
    pub reply: String,
    pub seen: Vec<Value>,
}

impl FixedEditor {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Vec::new(),
        }
    }
}

impl Editor for FixedEditor {
    fn edit(&mut self, document: &[u8]) -> Result<Vec<u8>> {
        self.seen.push(serde_json::from_slice(document).unwrap());
        Ok(self.reply.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct FixedPrompter {
    pub answer: bool,
    pub questions: Vec<String>,
}

impl Prompter for FixedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answer)
    }
}

/// Owns one of each fake and runs actions against them.
pub struct Harness {
    pub schema: Schema,
    pub client: FakeClient,
    pub connected: bool,
    pub session: MemorySessionStore,
    pub picker: ScriptedPicker,
    pub pager: RecordingPager,
    pub editor: FixedEditor,
    pub prompter: FixedPrompter,
    pub output: Vec<u8>,
}

impl Harness {
    pub fn new(client: FakeClient) -> Self {
        Self {
            schema: schema(),
            client,
            connected: true,
            session: MemorySessionStore::new(),
            picker: ScriptedPicker::default(),
            pager: RecordingPager::default(),
            editor: FixedEditor::default(),
            prompter: FixedPrompter::default(),
            output: Vec::new(),
        }
    }

    pub fn run(&mut self, action: Action, inputs: &Inputs) -> Result<()> {
        let client: Option<&mut dyn ResourceClient> = if self.connected {
            Some(&mut self.client)
        } else {
            None
        };

        let mut explorer = Explorer {
            schema: &self.schema,
            client,
            session: &self.session,
            picker: &mut self.picker,
            pager: &mut self.pager,
            editor: &mut self.editor,
            prompter: &mut self.prompter,
            output: &mut self.output,
        };

        explorer.run(&action, inputs)
    }

    pub fn output(&self) -> String {
        String::from_utf8(self.output.clone()).unwrap()
    }
}
