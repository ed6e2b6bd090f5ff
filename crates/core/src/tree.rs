//! Builds the command hierarchy from the schema.
//!
//! Verb groups and parent nodes are merged by name, so several resources can
//! contribute to the same group. The schema is walked in name order and every
//! level is sorted once the tree is complete, which keeps the tree (and the
//! help output generated from it) the same on every run.

use indexmap::IndexMap;

use crate::resolve::{id_flag, ID_FLAG};
use crate::schema::{kebab, singular, ResourceSchema, Schema, Summary};

pub const GET: &str = "get";
pub const CREATE: &str = "create";
pub const EDIT: &str = "edit";
pub const DELETE: &str = "delete";
pub const SELECT: &str = "select";
pub const CLEAR: &str = "clear";
pub const CHANGE: &str = "change";

pub const NEXT: &str = "next";
pub const PREVIOUS: &str = "previous";
pub const ALL: &str = "all";

/// What a leaf command does when invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetMany { resource: String },
    GetOne { resource: String },
    GetRelated { resource: String, relationship: String },
    GetNext,
    GetPrevious,
    Create { resource: String },
    Edit { resource: String },
    Delete { resource: String },
    Select { resource: String },
    Clear { resource: String },
    ClearAll,
    Change { resource: String, relationship: String },
}

impl Action {
    /// Whether the action talks to the API at all.
    pub fn needs_client(&self) -> bool {
        !matches!(self, Action::Clear { .. } | Action::ClearAll)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub usage: Option<String>,
    pub required: bool,
}

impl FlagSpec {
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: Some(usage.into()),
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandNode {
    pub name: String,
    pub usage: Option<String>,
    pub flags: Vec<FlagSpec>,
    pub action: Option<Action>,
    pub children: IndexMap<String, CommandNode>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The child called `name`, created on first use.
    pub fn child_mut(&mut self, name: &str) -> &mut CommandNode {
        self.children
            .entry(name.to_string())
            .or_insert_with(|| CommandNode::new(name))
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.get(name)
    }

    /// Follows `path` down from this node.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        path.iter()
            .try_fold(self, |node, name| node.child(name))
    }

    /// Adds a flag unless one with the same name is already declared.
    pub fn add_flag(&mut self, flag: FlagSpec) {
        if !self.flags.iter().any(|existing| existing.name == flag.name) {
            self.flags.push(flag);
        }
    }

    pub fn flag(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    fn set_leaf(&mut self, usage: Option<&str>, action: Action) {
        if self.usage.is_none() {
            self.usage = usage.map(str::to_string);
        }
        self.action = Some(action);
    }

    fn sort(&mut self) {
        self.children.sort_keys();
        for child in self.children.values_mut() {
            child.sort();
        }
    }
}

fn summary(operation: &Summary) -> Option<&str> {
    operation.summary.as_deref()
}

/// Declares one flag per filter of `resource_name`'s list operation on `node`.
///
/// Plain filters are only enforced on the list command itself; elsewhere they
/// just narrow the interactive lookup.
fn add_filter_flags(node: &mut CommandNode, schema: &Schema, resource_name: &str, enforce: bool) {
    let Some(resource) = schema.resources.get(resource_name) else {
        return;
    };

    for (filter_name, filter) in resource.filters() {
        let flag = if filter.resource.is_some() {
            // Resolvable without the flag, so never required
            FlagSpec::new(id_flag(filter_name), filter.description.clone())
        } else {
            FlagSpec::new(kebab(filter_name), filter.description.clone())
                .required(enforce && filter.required)
        };
        node.add_flag(flag);
    }
}

fn id_flag_spec(singular: &str, required: bool) -> FlagSpec {
    FlagSpec::new(ID_FLAG, format!("ID of the {singular}")).required(required)
}

fn add_resource(root: &mut CommandNode, schema: &Schema, name: &str, resource: &ResourceSchema) {
    let singular_name = singular(name);
    let operations = &resource.operations;
    let has_get_many = operations.get_many.is_some();

    if let Some(get_many) = &operations.get_many {
        let node = root.child_mut(GET).child_mut(name);
        node.set_leaf(
            get_many.summary.as_deref(),
            Action::GetMany {
                resource: name.to_string(),
            },
        );
        add_filter_flags(node, schema, name, true);
    }

    if let Some(get_one) = &operations.get_one {
        let node = root.child_mut(GET).child_mut(singular_name);
        node.set_leaf(
            summary(get_one),
            Action::GetOne {
                resource: name.to_string(),
            },
        );
        // Without a list operation there is nothing to pick from
        node.add_flag(id_flag_spec(singular_name, !has_get_many));
        add_filter_flags(node, schema, name, false);
    }

    if let Some(edit_one) = &operations.edit_one {
        let node = root.child_mut(EDIT).child_mut(singular_name);
        node.set_leaf(
            edit_one.summary.as_deref(),
            Action::Edit {
                resource: name.to_string(),
            },
        );
        node.add_flag(id_flag_spec(singular_name, !has_get_many));
        add_filter_flags(node, schema, name, false);
    }

    if let Some(create_one) = &operations.create_one {
        let node = root.child_mut(CREATE).child_mut(singular_name);
        node.set_leaf(
            create_one.summary.as_deref(),
            Action::Create {
                resource: name.to_string(),
            },
        );
        if let Some(relationships) = &create_one.relationships {
            for (relationship, target) in relationships
                .required
                .iter()
                .chain(relationships.optional.iter())
            {
                node.add_flag(FlagSpec::new(
                    id_flag(relationship),
                    format!("ID of the {} to use as `{relationship}`", singular(target)),
                ));
            }
        }
    }

    if let Some(delete) = &operations.delete {
        let node = root.child_mut(DELETE).child_mut(singular_name);
        node.set_leaf(
            summary(delete),
            Action::Delete {
                resource: name.to_string(),
            },
        );
        node.add_flag(id_flag_spec(singular_name, !has_get_many));
        add_filter_flags(node, schema, name, false);
    }

    if let Some(select) = &operations.select {
        let node = root.child_mut(SELECT).child_mut(singular_name);
        node.set_leaf(
            summary(select),
            Action::Select {
                resource: name.to_string(),
            },
        );
        add_filter_flags(node, schema, name, false);
    }

    if let Some(clear) = &operations.clear {
        root.child_mut(CLEAR).child_mut(singular_name).set_leaf(
            summary(clear),
            Action::Clear {
                resource: name.to_string(),
            },
        );
    }

    for (relationship_name, relationship) in &resource.relationships {
        if let Some(change) = &relationship.operations.change {
            let parent = root.child_mut(CHANGE).child_mut(singular_name);
            parent.add_flag(id_flag_spec(singular_name, !has_get_many));
            add_filter_flags(parent, schema, name, false);

            let node = parent.child_mut(relationship_name);
            node.set_leaf(
                summary(change),
                Action::Change {
                    resource: name.to_string(),
                    relationship: relationship_name.clone(),
                },
            );
            add_filter_flags(node, schema, &relationship.resource, false);
        }

        if let Some(get) = &relationship.operations.get {
            let parent = root.child_mut(GET).child_mut(singular_name);
            parent.add_flag(id_flag_spec(singular_name, !has_get_many));
            add_filter_flags(parent, schema, name, false);

            parent.child_mut(relationship_name).set_leaf(
                summary(get),
                Action::GetRelated {
                    resource: name.to_string(),
                    relationship: relationship_name.clone(),
                },
            );
        }
    }
}

fn add_fixed_commands(root: &mut CommandNode) {
    let get = root.child_mut(GET);
    get.child_mut(NEXT).set_leaf(
        Some("Get the next page of the last request"),
        Action::GetNext,
    );
    get.child_mut(PREVIOUS).set_leaf(
        Some("Get the previous page of the last request"),
        Action::GetPrevious,
    );

    root.child_mut(CLEAR)
        .child_mut(ALL)
        .set_leaf(Some("Clear the session file"), Action::ClearAll);
}

fn describe_verbs(root: &mut CommandNode) {
    let descriptions = [
        (GET, "Show resources, relationships and pages of earlier lists"),
        (CREATE, "Create a resource"),
        (EDIT, "Edit the attributes of a resource in your editor"),
        (DELETE, "Delete a resource"),
        (SELECT, "Remember a resource for later commands"),
        (CLEAR, "Forget remembered resources"),
        (CHANGE, "Change what a relationship points to"),
    ];

    for (verb, description) in descriptions {
        if let Some(node) = root.children.get_mut(verb) {
            node.usage = Some(description.to_string());
        }
    }
}

/// Builds the full command tree for `schema` under a root called `root_name`.
pub fn build_tree(root_name: &str, schema: &Schema) -> CommandNode {
    let mut root = CommandNode::new(root_name);

    add_fixed_commands(&mut root);
    for (name, resource) in &schema.resources {
        add_resource(&mut root, schema, name, resource);
    }

    describe_verbs(&mut root);
    root.sort();
    root
}
