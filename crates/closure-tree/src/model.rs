use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a category, assigned by the store on insert.
pub type CategoryId = i64;

/// Id of the implicit root category. It always exists, has no parent and is
/// never created, renamed, moved or deleted through the public API.
pub const ROOT_ID: CategoryId = 0;

/// The attribute payload of a category. The engine stores it verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Display name.
    pub name: String,
    /// Any additional fields, stored as a JSON object.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Attributes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Adds one extra field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A category row as read from the attribute relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// Copies the attribute payload out of the row.
    pub fn attributes(&self) -> Attributes {
        Attributes {
            name: self.name.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// One `(ancestor, descendant, distance)` triple of the closure relation.
///
/// `distance == 0` is the self-link every live node carries; `distance == 1`
/// encodes a direct parent/child link; larger distances are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClosureEdge {
    pub ancestor: CategoryId,
    pub descendant: CategoryId,
    pub distance: i64,
}

/// A category together with its direct parent, enough to draw the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    /// `None` only if the closure relation lost the node's parent link.
    pub parent_id: Option<CategoryId>,
    pub name: String,
}
