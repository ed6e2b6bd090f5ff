//! End-to-end runs of the actions against fakes.

mod common;

use api_explorer_core::error::Error;
use api_explorer_core::resolve::Inputs;
use api_explorer_core::session::SessionStore;
use api_explorer_core::tree::Action;
use common::{item, FakeClient, FixedEditor, Harness, ScriptedPicker};
use serde_json::json;

fn projects() -> FakeClient {
    FakeClient::default()
        .with_list(
            "organizations",
            vec![item("organizations", "o1", json!({"name": "Acme"}))],
        )
        .with_payload(
            "projects",
            json!({
                "data": [
                    {
                        "type": "projects",
                        "id": "p1",
                        "attributes": {"name": "Web", "description": "Site", "slug": "web"},
                        "relationships": {
                            "team": {
                                "data": {"type": "teams", "id": "t1"},
                                "links": {"related": "/projects/p1/team"}
                            },
                            "languages": {"data": [{"type": "languages", "id": "l1"}]}
                        }
                    }
                ],
                "links": {"next": "U"}
            }),
        )
}

fn name(resource: &str) -> String {
    resource.to_string()
}

#[test]
fn test_get_many_pages_payload_and_records_cursors() {
    let mut harness = Harness::new(projects());
    harness.session.save("previous", "stale").unwrap();

    harness
        .run(
            Action::GetMany {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap();

    assert_eq!(
        harness.client.requests,
        vec!["list organizations?", "list projects?filter[organization]=o1"]
    );
    assert_eq!(harness.pager.pages.len(), 1);
    assert_eq!(harness.pager.pages[0]["links"]["next"], json!("U"));

    let session = harness.session.snapshot();
    assert_eq!(session.get("next").map(String::as_str), Some("U"));
    assert_eq!(session.get("previous"), None);
}

#[test]
fn test_get_next_follows_and_replaces_cursors() {
    let client = projects().with_page(
        "U",
        json!({"data": [], "links": {"previous": "P"}}),
    );
    let mut harness = Harness::new(client);
    harness.session.save("next", "U").unwrap();

    harness.run(Action::GetNext, &Inputs::new()).unwrap();

    assert_eq!(harness.client.requests, vec!["list_path U"]);
    let session = harness.session.snapshot();
    assert_eq!(session.get("next"), None);
    assert_eq!(session.get("previous").map(String::as_str), Some("P"));
}

#[test]
fn test_get_previous_without_cursor() {
    let mut harness = Harness::new(FakeClient::default());

    let error = harness.run(Action::GetPrevious, &Inputs::new()).unwrap_err();

    assert_eq!(error.to_string(), "last request did not have a previous page");
    assert!(harness.client.requests.is_empty());
}

#[test]
fn test_get_one() {
    let mut harness = Harness::new(projects());

    harness
        .run(
            Action::GetOne {
                resource: name("projects"),
            },
            &Inputs::new().with("id", "p1"),
        )
        .unwrap();

    assert_eq!(harness.client.requests, vec!["get projects/p1"]);
    assert_eq!(harness.pager.pages[0]["attributes"]["name"], json!("Web"));
}

#[test]
fn test_get_related_follows_link() {
    let client = projects().with_page(
        "/projects/p1/team",
        json!({"data": {"type": "teams", "id": "t1"}}),
    );
    let mut harness = Harness::new(client);
    harness.session.save("next", "U").unwrap();

    harness
        .run(
            Action::GetRelated {
                resource: name("projects"),
                relationship: "team".to_string(),
            },
            &Inputs::new().with("project-id", "p1"),
        )
        .unwrap();

    assert_eq!(
        harness.client.requests,
        vec!["get projects/p1", "list_path /projects/p1/team"]
    );
    assert_eq!(harness.pager.pages[0]["data"]["id"], json!("t1"));
    // A single resource is not a page, so the cursors stay
    assert_eq!(
        harness.session.snapshot().get("next").map(String::as_str),
        Some("U")
    );
}

#[test]
fn test_get_related_without_link() {
    let mut harness = Harness::new(projects());

    let error = harness
        .run(
            Action::GetRelated {
                resource: name("projects"),
                relationship: "languages".to_string(),
            },
            &Inputs::new().with("id", "p1"),
        )
        .unwrap_err();

    assert!(matches!(error, Error::NoRelatedLink(..)));
}

#[test]
fn test_edit_sends_only_changed_fields() {
    let client = FakeClient::default().with_list(
        "things",
        vec![item("things", "t1", json!({"a": 1, "b": 2}))],
    );
    let mut harness = Harness::new(client);
    harness.editor = FixedEditor::replying(r#"{"a": 5}"#);

    harness
        .run(
            Action::Edit {
                resource: name("things"),
            },
            &Inputs::new().with("id", "t1"),
        )
        .unwrap();

    assert_eq!(harness.editor.seen, vec![json!({"a": 1})]);
    assert_eq!(
        harness.client.saved,
        vec![json!({"data": {"type": "things", "id": "t1", "attributes": {"a": 5}}})]
    );
    assert_eq!(harness.output(), "Saved thing t1: a\n");
}

#[test]
fn test_edit_without_changes_does_not_save() {
    let client = FakeClient::default().with_list(
        "things",
        vec![item("things", "t1", json!({"a": 1, "b": 2}))],
    );
    let mut harness = Harness::new(client);
    harness.editor = FixedEditor::replying(r#"{"a": 1}"#);

    let error = harness
        .run(
            Action::Edit {
                resource: name("things"),
            },
            &Inputs::new().with("id", "t1"),
        )
        .unwrap_err();

    assert_eq!(error.to_string(), "nothing changed");
    assert!(harness.client.saved.is_empty());
}

#[test]
fn test_delete_declined() {
    let mut harness = Harness::new(projects());
    harness.prompter.answer = false;

    harness
        .run(
            Action::Delete {
                resource: name("projects"),
            },
            &Inputs::new().with("id", "p1"),
        )
        .unwrap();

    assert_eq!(
        harness.prompter.questions,
        vec!["About to delete project: p1, are you sure (y/N)? "]
    );
    assert!(harness.client.deleted.is_empty());
    assert_eq!(harness.output(), "Deletion aborted\n");
}

#[test]
fn test_delete_confirmed_forgets_selection() {
    let mut harness = Harness::new(projects());
    harness.prompter.answer = true;
    harness.session.save("project", "p1").unwrap();

    harness
        .run(
            Action::Delete {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap();

    assert_eq!(harness.client.deleted, vec!["projects/p1"]);
    assert_eq!(harness.session.load("project").unwrap(), None);
    assert_eq!(harness.output(), "Deleted project: p1\n");
}

#[test]
fn test_select_saves_to_session() {
    let client = projects().with_page(
        "U",
        json!({"data": [item("projects", "p2", json!({"name": "App"}))]}),
    );
    let mut harness = Harness::new(client);
    harness.picker = ScriptedPicker::answering(vec![vec![1]]);
    // An existing selection doesn't short-circuit `select`
    harness.session.save("project", "old").unwrap();

    harness
        .run(
            Action::Select {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap();

    // Every page of the listing is offered
    assert_eq!(
        harness.client.requests,
        vec![
            "list organizations?",
            "list projects?filter[organization]=o1",
            "list_path U"
        ]
    );
    assert_eq!(harness.session.load("project").unwrap().as_deref(), Some("p2"));
    assert_eq!(harness.output(), "Saved project: p2\n");
}

#[test]
fn test_clear() {
    let mut harness = Harness::new(FakeClient::default());
    harness.connected = false;

    harness
        .run(
            Action::Clear {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap();
    assert_eq!(harness.output(), "Key project has no entry in <memory>\n");

    harness.session.save("project", "p1").unwrap();
    harness.output.clear();
    harness
        .run(
            Action::Clear {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap();
    assert_eq!(harness.session.load("project").unwrap(), None);
    assert_eq!(harness.output(), "Cleared project\n");
}

#[test]
fn test_clear_all() {
    let mut harness = Harness::new(FakeClient::default());
    harness.connected = false;
    harness.session.save("project", "p1").unwrap();
    harness.session.save("next", "U").unwrap();

    harness.run(Action::ClearAll, &Inputs::new()).unwrap();

    assert!(harness.session.snapshot().is_empty());
    assert_eq!(harness.output(), "Removed <memory> successfully\n");
}

#[test]
fn test_remote_actions_need_a_connection() {
    let mut harness = Harness::new(projects());
    harness.connected = false;

    let error = harness
        .run(
            Action::GetMany {
                resource: name("projects"),
            },
            &Inputs::new(),
        )
        .unwrap_err();

    assert!(matches!(error, Error::NotConnected));
}

#[test]
fn test_change_to_one_relationship_to_nothing() {
    let client = projects().with_list(
        "teams",
        vec![item("teams", "t1", json!({})), item("teams", "t2", json!({}))],
    );
    let mut harness = Harness::new(client);
    harness.picker = ScriptedPicker::answering(vec![vec![0]]);

    harness
        .run(
            Action::Change {
                resource: name("projects"),
                relationship: "team".to_string(),
            },
            &Inputs::new().with("id", "p1"),
        )
        .unwrap();

    assert_eq!(
        harness.client.saved,
        vec![json!({
            "data": {
                "type": "projects",
                "id": "p1",
                "relationships": {"team": {"data": null}}
            }
        })]
    );
    assert_eq!(harness.output(), "Changed team of project: p1\n");
}

#[test]
fn test_change_to_many_relationship() {
    let client = projects().with_list(
        "languages",
        vec![
            item("languages", "l1", json!({})),
            item("languages", "l2", json!({})),
            item("languages", "l3", json!({})),
        ],
    );
    let mut harness = Harness::new(client);
    harness.picker = ScriptedPicker::answering(vec![vec![2, 3]]);

    harness
        .run(
            Action::Change {
                resource: name("projects"),
                relationship: "languages".to_string(),
            },
            &Inputs::new().with("id", "p1"),
        )
        .unwrap();

    assert_eq!(
        harness.client.saved[0]["data"]["relationships"]["languages"]["data"],
        json!([
            {"type": "languages", "id": "l2"},
            {"type": "languages", "id": "l3"}
        ])
    );
}

fn links_only_project() -> FakeClient {
    FakeClient::default()
        .with_payload(
            "projects",
            json!({
                "data": [{
                    "type": "projects",
                    "id": "p3",
                    "attributes": {"name": "Docs"},
                    "relationships": {
                        "team": {},
                        "languages": {"links": {"related": "/projects/p3/languages"}}
                    }
                }]
            }),
        )
        .with_page(
            "/projects/p3/languages",
            json!({"data": [{"type": "languages", "id": "l1"}]}),
        )
        .with_list(
            "languages",
            vec![
                item("languages", "l1", json!({})),
                item("languages", "l2", json!({})),
            ],
        )
}

#[test]
fn test_change_links_only_relationship_asks_related_document() {
    let mut harness = Harness::new(links_only_project());
    harness.picker = ScriptedPicker::answering(vec![vec![1, 2]]);

    harness
        .run(
            Action::Change {
                resource: name("projects"),
                relationship: "languages".to_string(),
            },
            &Inputs::new().with("id", "p3"),
        )
        .unwrap();

    assert_eq!(
        harness.client.requests[..2],
        ["get projects/p3", "list_path /projects/p3/languages"]
    );
    assert_eq!(
        harness.client.saved[0]["data"]["relationships"]["languages"]["data"],
        json!([
            {"type": "languages", "id": "l1"},
            {"type": "languages", "id": "l2"}
        ])
    );
}

#[test]
fn test_change_relationship_of_unknown_cardinality() {
    let mut harness = Harness::new(links_only_project());

    let error = harness
        .run(
            Action::Change {
                resource: name("projects"),
                relationship: "team".to_string(),
            },
            &Inputs::new().with("id", "p3"),
        )
        .unwrap_err();

    assert!(matches!(error, Error::UnknownCardinality(..)));
    assert!(harness.client.saved.is_empty());
}

#[test]
fn test_create() {
    let mut harness = Harness::new(FakeClient::default());
    harness.editor = FixedEditor::replying(r#"{"name": "New", "description": null}"#);

    harness
        .run(
            Action::Create {
                resource: name("projects"),
            },
            &Inputs::new().with("organization-id", "o1"),
        )
        .unwrap();

    assert_eq!(
        harness.editor.seen,
        vec![json!({"name": null, "description": null})]
    );
    assert_eq!(
        harness.client.created,
        vec![json!({
            "data": {
                "type": "projects",
                "attributes": {"name": "New"},
                "relationships": {
                    "organization": {"data": {"type": "organizations", "id": "o1"}}
                }
            }
        })]
    );
    assert!(harness.output().starts_with("Created project: new"));
    assert_eq!(harness.pager.pages[0]["id"], json!("new"));
}

#[test]
fn test_create_unsupported() {
    let mut harness = Harness::new(FakeClient::default());

    let error = harness
        .run(
            Action::Create {
                resource: name("teams"),
            },
            &Inputs::new(),
        )
        .unwrap_err();

    assert!(matches!(error, Error::UnsupportedOperation(..)));
}
