//! Resolved edges and relations.

use relgen_schema::{Annotations, StorageKey, ThroughDef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in the graph arena.
pub type NodeId = usize;

/// Stable address of an edge: the declaring node and the edge's position
/// in that node's edge list. Edges reference each other through these
/// pairs instead of pointers, so the graph stays a plain owned arena even
/// though relations are cyclic.
pub type EdgeId = (NodeId, usize);

/// Kind of a resolved relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelKind {
    /// Not yet resolved. Never observed after graph construction.
    #[default]
    Unk,
    /// One-to-one.
    O2O,
    /// One-to-many.
    O2M,
    /// Many-to-one.
    M2O,
    /// Many-to-many.
    M2M,
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelKind::Unk => "Unknown",
            RelKind::O2O => "O2O",
            RelKind::O2M => "O2M",
            RelKind::M2O => "M2O",
            RelKind::M2M => "M2M",
        };
        write!(f, "{name}")
    }
}

/// Storage-level shape of a relation: the table holding the foreign key
/// (or the join table for many-to-many), and its column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    /// Relation kind.
    pub kind: RelKind,
    /// Table holding the relation columns.
    pub table: String,
    /// Relation column names: one for single-column relations, two for
    /// join tables.
    pub columns: Vec<String>,
}

impl Relation {
    /// The single foreign-key column of a non-M2M relation. `None` before
    /// resolution.
    pub fn column(&self) -> Option<&str> {
        match self.kind {
            RelKind::Unk | RelKind::M2M => None,
            _ => self.columns.first().map(String::as_str),
        }
    }
}

/// A resolved edge between two nodes.
///
/// Both sides of a paired relation are represented: the association that
/// declared it and the back-reference on the target. They share the same
/// relation table and columns, and point at each other through `ref_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Edge name, local to the declaring node.
    pub name: String,
    /// Node that owns the association side of the relation.
    pub owner: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Name of the paired association. Set on back-reference edges.
    pub inverse: Option<String>,
    /// Address of the paired edge, if one exists.
    pub ref_id: Option<EdgeId>,
    /// Whether at most one entity is reachable through this edge.
    pub unique: bool,
    /// Whether the edge may be unset.
    pub optional: bool,
    /// Whether the edge is self-referential with no distinct
    /// back-reference.
    pub bidi: bool,
    /// Struct tag for the generated accessor.
    pub struct_tag: String,
    /// Resolved relation shape.
    pub rel: Relation,
    /// Bound join node for relations routed through an edge schema.
    pub through: Option<NodeId>,
    /// Raw join binding from the descriptor.
    pub through_def: Option<ThroughDef>,
    /// Declared field holding this edge's foreign-key column.
    pub field: Option<String>,
    /// Explicit constraint-symbol overrides.
    pub storage_key: Option<StorageKey>,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl Edge {
    /// Check if this is the back-reference side of a relation.
    pub fn is_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    /// Check if the relation is many-to-many.
    pub fn m2m(&self) -> bool {
        self.rel.kind == RelKind::M2M
    }
}

/// Build the struct tag of an edge or navigation accessor: the declared
/// tag when present, a JSON tag derived from the name otherwise.
pub(crate) fn struct_tag(name: &str, tag: &str) -> String {
    if tag.is_empty() {
        format!("json:\"{name},omitempty\"")
    } else {
        tag.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_kind_display() {
        assert_eq!(RelKind::O2O.to_string(), "O2O");
        assert_eq!(RelKind::M2M.to_string(), "M2M");
        assert_eq!(RelKind::Unk.to_string(), "Unknown");
    }

    #[test]
    fn test_relation_column() {
        let rel = Relation {
            kind: RelKind::M2O,
            table: "posts".into(),
            columns: vec!["user_posts".into()],
        };
        assert_eq!(rel.column(), Some("user_posts"));

        let join = Relation {
            kind: RelKind::M2M,
            table: "user_groups".into(),
            columns: vec!["user_id".into(), "group_id".into()],
        };
        assert_eq!(join.column(), None);

        assert_eq!(Relation::default().column(), None);
    }

    #[test]
    fn test_struct_tag() {
        assert_eq!(struct_tag("posts", ""), "json:\"posts,omitempty\"");
        assert_eq!(struct_tag("posts", "json:\"-\""), "json:\"-\"");
    }
}
