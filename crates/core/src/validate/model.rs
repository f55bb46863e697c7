//! Shape definitions and references in a JSON AST model
//!
//! The walk follows the AST schema: traits are read from shapes and member
//! definitions, and targets only from the properties that hold shape
//! references. Member names and trait values are never read as schema keys.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Namespace that is always available and never needs resolving
pub const PRELUDE_NAMESPACE: &str = "smithy.api";

/// Properties holding a map of member name to member definition
const MEMBER_MAPS: &[&str] = &["members"];
/// Properties holding a single member definition
const MEMBER_PROPERTIES: &[&str] = &["member", "key", "value"];
/// Properties holding a map of name to `{"target": ...}`
const TARGET_MAPS: &[&str] = &["identifiers", "properties"];
/// Properties holding a single `{"target": ...}`
const TARGET_PROPERTIES: &[&str] = &[
    "input", "output", "create", "put", "read", "update", "delete", "list",
];
/// Properties holding a list of `{"target": ...}`
const TARGET_LISTS: &[&str] = &[
    "mixins",
    "errors",
    "operations",
    "collectionOperations",
    "resources",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReferenceKind {
    Trait,
    Shape,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Trait => write!(f, "trait"),
            ReferenceKind::Shape => write!(f, "shape"),
        }
    }
}

/// Identifiers defined by a model and the identifiers it points at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelIndex {
    pub defined: BTreeSet<String>,
    /// Referenced id to (kind, referencing shapes or members)
    pub references: BTreeMap<String, (ReferenceKind, BTreeSet<String>)>,
}

impl ModelIndex {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_value(&serde_json::from_str(&contents)?))
    }

    pub fn from_value(model: &Value) -> Self {
        let mut index = ModelIndex::default();
        let Some(shapes) = model.get("shapes").and_then(Value::as_object) else {
            return index;
        };

        for (id, shape) in shapes {
            let Some(shape) = shape.as_object() else {
                continue;
            };
            if shape.get("type").and_then(Value::as_str) == Some("apply") {
                index.add_reference(id, ReferenceKind::Shape, id);
            } else {
                index.defined.insert(id.clone());
            }
            index.collect_shape(id, shape);
        }
        index
    }

    /// References that the model itself does not define, outside the prelude
    pub fn external_references(
        &self,
    ) -> impl Iterator<Item = (&String, &(ReferenceKind, BTreeSet<String>))> {
        self.references
            .iter()
            .filter(|(id, _)| !self.defined.contains(*id) && !is_prelude(id))
    }

    fn collect_shape(&mut self, id: &str, shape: &Map<String, Value>) {
        self.collect_traits(id, shape);

        for key in MEMBER_MAPS {
            if let Some(members) = shape.get(*key).and_then(Value::as_object) {
                for (name, member) in members {
                    self.collect_member(&format!("{id}${name}"), member);
                }
            }
        }
        for key in MEMBER_PROPERTIES {
            if let Some(member) = shape.get(*key) {
                self.collect_member(&format!("{id}${key}"), member);
            }
        }
        for key in TARGET_MAPS {
            if let Some(entries) = shape.get(*key).and_then(Value::as_object) {
                for entry in entries.values() {
                    self.collect_target(id, entry);
                }
            }
        }
        for key in TARGET_PROPERTIES {
            if let Some(reference) = shape.get(*key) {
                self.collect_target(id, reference);
            }
        }
        for key in TARGET_LISTS {
            if let Some(references) = shape.get(*key).and_then(Value::as_array) {
                for reference in references {
                    self.collect_target(id, reference);
                }
            }
        }
    }

    fn collect_member(&mut self, member_id: &str, member: &Value) {
        let Some(member) = member.as_object() else {
            return;
        };
        self.collect_traits(member_id, member);
        if let Some(target) = member.get("target").and_then(Value::as_str) {
            self.add_reference(target, ReferenceKind::Shape, member_id);
        }
    }

    fn collect_target(&mut self, owner: &str, reference: &Value) {
        if let Some(target) = reference.get("target").and_then(Value::as_str) {
            self.add_reference(target, ReferenceKind::Shape, owner);
        }
    }

    fn collect_traits(&mut self, owner: &str, node: &Map<String, Value>) {
        if let Some(traits) = node.get("traits").and_then(Value::as_object) {
            for trait_id in traits.keys() {
                self.add_reference(trait_id, ReferenceKind::Trait, owner);
            }
        }
    }

    /// Member ids (`ns#Shape$member`) resolve through their containing shape
    fn add_reference(&mut self, id: &str, kind: ReferenceKind, owner: &str) {
        self.references
            .entry(container_of(id).to_string())
            .or_insert_with(|| (kind, BTreeSet::new()))
            .1
            .insert(owner.to_string());
    }
}

pub fn namespace_of(id: &str) -> &str {
    id.split_once('#').map(|(ns, _)| ns).unwrap_or(id)
}

fn container_of(id: &str) -> &str {
    id.split_once('$').map(|(shape, _)| shape).unwrap_or(id)
}

fn is_prelude(id: &str) -> bool {
    namespace_of(id) == PRELUDE_NAMESPACE
}
