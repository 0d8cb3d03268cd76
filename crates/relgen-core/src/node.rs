//! Resolved nodes and their fields, indexes, and foreign keys.

use crate::config::Config;
use crate::edge::{Edge, EdgeId};
use crate::error::Error;
use crate::naming::{plural, snake};
use relgen_schema::{Annotations, DefaultValue, FieldDef, FieldKind, IndexDef, SchemaDef};
use std::collections::HashSet;

/// A resolved field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type tag.
    pub kind: FieldKind,
    /// Storage column name.
    pub column: String,
    /// Whether the column is nullable.
    pub optional: bool,
    /// Whether the column value must be unique.
    pub unique: bool,
    /// Default value, if declared.
    pub default: Option<DefaultValue>,
    /// Storage size hint.
    pub size: Option<u32>,
    /// Raw SQL type override.
    pub schema_type: Option<String>,
    /// Whether the field backs an edge's foreign-key column.
    pub edge_field: bool,
    /// Whether the field was declared in the schema (false for the
    /// synthesized id).
    pub user_defined: bool,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl Field {
    fn from_def(def: &FieldDef) -> Self {
        Self {
            name: def.name.clone(),
            kind: def.kind,
            column: def
                .storage_key
                .clone()
                .unwrap_or_else(|| snake(&def.name)),
            optional: def.optional,
            unique: def.unique,
            default: def.default.clone(),
            size: def.size,
            schema_type: def.schema_type.clone(),
            edge_field: false,
            user_defined: true,
            annotations: def.annotations.clone(),
        }
    }
}

/// A foreign-key column installed on a node for one of its relations.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// The field holding the column. A copy of the declared field when the
    /// edge binds one, a synthesized field otherwise.
    pub field: Field,
    /// The edge this key belongs to, addressed on its declaring node.
    pub edge: EdgeId,
    /// Whether the field was declared in the schema rather than
    /// synthesized.
    pub user_defined: bool,
}

/// A resolved index over storage columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    /// Index name: the column names joined with underscores.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Storage columns, in order.
    pub columns: Vec<String>,
    /// Free-form annotations.
    pub annotations: Annotations,
}

/// Edge-schema bookkeeping for a node used as the join of a many-to-many
/// relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSchemaInfo {
    /// The back-reference edge routed through this node.
    pub from: Option<EdgeId>,
    /// The association edge routed through this node.
    pub to: Option<EdgeId>,
    /// Promoted composite primary-key fields, by name, in declared order.
    /// Empty unless the node annotates a composite id.
    pub id: Vec<String>,
}

/// A resolved graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Entity name.
    pub name: String,
    /// Snake-cased name, used as prefix in column and table names.
    pub label: String,
    /// Storage table: the plural label, unless overridden by a `table`
    /// annotation.
    pub table: String,
    /// Identity field. `None` after a composite primary key is promoted.
    pub id: Option<Field>,
    /// Declared fields, in order. Excludes the identity field.
    pub fields: Vec<Field>,
    /// Edges declared on this node, in order, plus navigation edges
    /// appended during edge-schema resolution.
    pub edges: Vec<Edge>,
    /// Foreign keys hosted by this node's table.
    pub foreign_keys: Vec<ForeignKey>,
    /// Resolved indexes, including synthesized uniqueness indexes for
    /// edge schemas.
    pub indexes: Vec<Index>,
    /// Edge-schema bookkeeping.
    pub edge_schema: EdgeSchemaInfo,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl Type {
    /// Build a node from a schema descriptor. Edges are linked in a later
    /// pass; only name, identity, fields, and annotations resolve here.
    pub(crate) fn new(config: &Config, def: &SchemaDef) -> Result<Self, Error> {
        let label = snake(&def.name);
        let table = match def.annotations.table() {
            Some(name) => name.to_string(),
            None => plural(&label),
        };

        let mut id = None;
        let mut fields = Vec::with_capacity(def.fields.len());
        let mut seen = HashSet::with_capacity(def.fields.len());
        for fdef in &def.fields {
            if !seen.insert(fdef.name.as_str()) {
                return Err(Error::DuplicateField {
                    schema: def.name.clone(),
                    field: fdef.name.clone(),
                });
            }
            if fdef.kind == FieldKind::Other && fdef.schema_type.is_none() {
                return Err(Error::InvalidFieldType {
                    schema: def.name.clone(),
                    field: fdef.name.clone(),
                });
            }
            if fdef.name == "id" {
                if !fdef.kind.valid_id() {
                    return Err(Error::InvalidIdType {
                        schema: def.name.clone(),
                        kind: fdef.kind,
                    });
                }
                id = Some(Field::from_def(fdef));
            } else {
                fields.push(Field::from_def(fdef));
            }
        }

        // Composite identities are promoted during edge-schema resolution;
        // until then every node carries a single-column id.
        let id = id.unwrap_or_else(|| Field {
            name: "id".to_string(),
            kind: config.id_type.unwrap_or(FieldKind::Int64),
            column: "id".to_string(),
            optional: false,
            unique: false,
            default: None,
            size: None,
            schema_type: None,
            edge_field: false,
            user_defined: false,
            annotations: Annotations::new(),
        });

        Ok(Self {
            name: def.name.clone(),
            label,
            table,
            id: Some(id),
            fields,
            edges: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            edge_schema: EdgeSchemaInfo::default(),
            annotations: def.annotations.clone(),
        })
    }

    /// Check if the node has a single-column identity.
    pub fn has_one_field_id(&self) -> bool {
        self.id.is_some()
    }

    /// Check if the node's primary key was promoted to a composite of
    /// edge-field columns.
    pub fn has_composite_id(&self) -> bool {
        !self.edge_schema.id.is_empty()
    }

    /// Get a declared field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if any edge with the given name exists on this node.
    pub fn has_edge(&self, name: &str) -> bool {
        self.edges.iter().any(|e| e.name == name)
    }

    /// Position of the association edge with the given name, if any.
    pub fn assoc(&self, name: &str) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.name == name && !e.is_inverse())
    }

    /// Resolve an index declaration against this node's columns and
    /// append it. Entries may name the identity, a declared field, or a
    /// foreign-key column.
    pub(crate) fn add_index(&mut self, def: &IndexDef) -> Result<(), Error> {
        let mut columns = Vec::with_capacity(def.fields.len());
        for name in &def.fields {
            let column = self.index_column(name).ok_or_else(|| {
                Error::UnknownIndexColumn {
                    schema: self.name.clone(),
                    name: name.clone(),
                }
            })?;
            columns.push(column);
        }
        self.indexes.push(Index {
            name: columns.join("_"),
            unique: def.unique,
            columns,
            annotations: def.annotations.clone(),
        });
        Ok(())
    }

    fn index_column(&self, name: &str) -> Option<String> {
        if let Some(id) = &self.id {
            if id.name == name {
                return Some(id.column.clone());
            }
        }
        if let Some(f) = self.field(name) {
            return Some(f.column.clone());
        }
        self.foreign_keys
            .iter()
            .find(|fk| fk.field.name == name)
            .map(|fk| fk.field.column.clone())
    }
}
