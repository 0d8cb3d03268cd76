//! Relational table model.
//!
//! [`Graph::tables`] projects a resolved graph onto a neutral table IR:
//! one table per node plus one join table per many-to-many relation that
//! is not routed through an edge schema. Dialect drivers consume this
//! model to emit DDL; nothing here is dialect specific.

use crate::edge::{Edge, RelKind};
use crate::error::Error;
use crate::graph::Graph;
use crate::node::{Field, Index, Type};
use relgen_schema::{Annotations, FieldKind};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument};

/// Referential action of a foreign key on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceAction {
    /// Reject the delete if rows still reference it.
    NoAction,
    /// Like `NoAction`, checked immediately.
    Restrict,
    /// Delete referencing rows.
    Cascade,
    /// Null out the referencing column.
    SetNull,
    /// Reset the referencing column to its default.
    SetDefault,
}

impl ReferenceAction {
    /// SQL spelling of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceAction::NoAction => "NO ACTION",
            ReferenceAction::Restrict => "RESTRICT",
            ReferenceAction::Cascade => "CASCADE",
            ReferenceAction::SetNull => "SET NULL",
            ReferenceAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Parse an annotation value. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [
            ReferenceAction::NoAction,
            ReferenceAction::Restrict,
            ReferenceAction::Cascade,
            ReferenceAction::SetNull,
            ReferenceAction::SetDefault,
        ]
        .into_iter()
        .find(|action| action.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ReferenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type tag.
    pub kind: FieldKind,
    /// Storage size hint.
    pub size: Option<u32>,
    /// Whether the column carries a uniqueness constraint.
    pub unique: bool,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Raw SQL type override.
    pub schema_type: Option<String>,
}

/// A foreign-key constraint on a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableForeignKey {
    /// Constraint symbol.
    pub symbol: String,
    /// Referencing columns on this table.
    pub columns: Vec<String>,
    /// Referenced table.
    pub ref_table: String,
    /// Referenced columns.
    pub ref_columns: Vec<String>,
    /// Action on delete of the referenced row.
    pub on_delete: ReferenceAction,
}

/// A materialized table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns, in declaration order: identity first, then plain fields,
    /// then foreign-key columns as edges are walked.
    pub columns: Vec<Column>,
    /// Primary-key column names, in order.
    pub primary_key: Vec<String>,
    /// Foreign-key constraints.
    pub foreign_keys: Vec<TableForeignKey>,
    /// Indexes.
    pub indexes: Vec<Index>,
    /// Annotations carried over from the node.
    pub annotations: Annotations,
}

impl Table {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Check if a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Add a column unless one with the same name already exists (an
    /// edge-field column may precede its edge).
    fn add_column_if_absent(&mut self, column: Column) {
        if !self.has_column(&column.name) {
            self.columns.push(column);
        }
    }
}

impl Graph {
    /// Materialize the table model for the graph.
    ///
    /// Tables appear in node input order with join tables appended as
    /// they are encountered. Indexes are applied last, after every
    /// column (including relation columns) exists.
    #[instrument(skip(self), fields(nodes = self.nodes.len()))]
    pub fn tables(&self) -> Result<Vec<Table>, Error> {
        let mut order: Vec<String> = Vec::with_capacity(self.nodes.len());
        let mut tables: HashMap<String, Table> = HashMap::with_capacity(self.nodes.len());
        for n in &self.nodes {
            let mut table = Table::new(&n.table);
            if let Some(id) = &n.id {
                table.columns.push(Column {
                    name: id.column.clone(),
                    kind: id.kind,
                    size: id.size,
                    unique: false,
                    nullable: false,
                    schema_type: id.schema_type.clone(),
                });
                table.primary_key.push(id.column.clone());
            }
            table.annotations = n.annotations.clone();
            for f in &n.fields {
                if !f.edge_field {
                    table.columns.push(Column {
                        name: f.column.clone(),
                        kind: f.kind,
                        size: f.size,
                        unique: f.unique,
                        nullable: f.optional,
                        schema_type: f.schema_type.clone(),
                    });
                }
            }
            order.push(n.table.clone());
            tables.insert(n.table.clone(), table);
        }

        for (t, n) in self.nodes.iter().enumerate() {
            for e in &n.edges {
                if e.is_inverse() {
                    continue;
                }
                match e.rel.kind {
                    RelKind::O2O | RelKind::O2M => {
                        // The relation table owns the key; this node is
                        // the referenced side.
                        let pk = node_pk(n)?;
                        let name = rel_column(n, e)?;
                        let mut nullable = true;
                        if t != e.target {
                            if let Some(r) = e.ref_id.and_then(|id| self.edge(id)) {
                                if !r.optional {
                                    nullable = false;
                                }
                            }
                        }
                        let column = Column {
                            name: name.clone(),
                            kind: pk.kind,
                            size: pk.size,
                            unique: e.rel.kind == RelKind::O2O,
                            nullable,
                            schema_type: pk.schema_type.clone(),
                        };
                        let on_delete = delete_action(e, nullable)?;
                        let symbol = fk_symbol(e, &e.rel.table, &n.table);
                        let owner = named_table(&mut tables, &e.rel.table)?;
                        owner.add_column_if_absent(column);
                        owner.foreign_keys.push(TableForeignKey {
                            symbol,
                            columns: vec![name],
                            ref_table: n.table.clone(),
                            ref_columns: vec![pk.column.clone()],
                            on_delete,
                        });
                    }
                    RelKind::M2O => {
                        // This node is the many side and hosts the key.
                        let target = &self.nodes[e.target];
                        let pk = node_pk(target)?;
                        let name = rel_column(n, e)?;
                        let nullable = e.optional || t == e.target;
                        let column = Column {
                            name: name.clone(),
                            kind: pk.kind,
                            size: pk.size,
                            unique: false,
                            nullable,
                            schema_type: pk.schema_type.clone(),
                        };
                        let on_delete = delete_action(e, nullable)?;
                        let symbol = fk_symbol(e, &e.rel.table, &target.table);
                        let owner = named_table(&mut tables, &e.rel.table)?;
                        owner.add_column_if_absent(column);
                        owner.foreign_keys.push(TableForeignKey {
                            symbol,
                            columns: vec![name],
                            ref_table: target.table.clone(),
                            ref_columns: vec![pk.column.clone()],
                            on_delete,
                        });
                    }
                    RelKind::M2M => {
                        // Relations routed through an edge schema already
                        // materialized their join table as a node.
                        let through = e.through.is_some()
                            || e
                                .ref_id
                                .and_then(|id| self.edge(id))
                                .is_some_and(|r| r.through.is_some());
                        if through {
                            continue;
                        }
                        let target = &self.nodes[e.target];
                        let c1 = join_column(&e.rel.columns[0], n)?;
                        let c2 = join_column(&e.rel.columns[1], target)?;
                        let (s1, s2) = fk_symbols(e, &c1.name, &c2.name);
                        let n_pk = node_pk(n)?;
                        let target_pk = node_pk(target)?;
                        let join = Table {
                            name: e.rel.table.clone(),
                            primary_key: vec![c1.name.clone(), c2.name.clone()],
                            foreign_keys: vec![
                                TableForeignKey {
                                    symbol: s1,
                                    columns: vec![c1.name.clone()],
                                    ref_table: n.table.clone(),
                                    ref_columns: vec![n_pk.column.clone()],
                                    on_delete: ReferenceAction::Cascade,
                                },
                                TableForeignKey {
                                    symbol: s2,
                                    columns: vec![c2.name.clone()],
                                    ref_table: target.table.clone(),
                                    ref_columns: vec![target_pk.column.clone()],
                                    on_delete: ReferenceAction::Cascade,
                                },
                            ],
                            columns: vec![c1, c2],
                            indexes: Vec::new(),
                            annotations: Annotations::new(),
                        };
                        order.push(join.name.clone());
                        tables.insert(join.name.clone(), join);
                    }
                    RelKind::Unk => {
                        return Err(Error::Internal(format!(
                            "unresolved relation for edge {}.{}",
                            n.name, e.name
                        )))
                    }
                }
            }
            if n.has_composite_id() {
                let table = named_table(&mut tables, &n.table)?;
                let pk = composite_pk(table, n)?;
                table.primary_key = pk;
            }
        }

        for n in &self.nodes {
            let table = named_table(&mut tables, &n.table)?;
            table.indexes.extend(n.indexes.iter().cloned());
        }

        let mut all = Vec::with_capacity(order.len());
        for name in order {
            let table = tables.remove(&name).ok_or_else(|| {
                Error::Internal(format!("table {name:?} vanished during materialization"))
            })?;
            all.push(table);
        }
        debug!(tables = all.len(), "tables materialized");
        Ok(all)
    }
}

/// The identity field a foreign-key column mirrors.
fn node_pk(node: &Type) -> Result<&Field, Error> {
    node.id.as_ref().ok_or_else(|| Error::MissingPrimaryKey {
        table: node.table.clone(),
    })
}

fn rel_column(node: &Type, edge: &Edge) -> Result<String, Error> {
    edge.rel.column().map(str::to_string).ok_or_else(|| {
        Error::Internal(format!(
            "unresolved relation column for edge {}.{}",
            node.name, edge.name
        ))
    })
}

fn named_table<'a>(
    tables: &'a mut HashMap<String, Table>,
    name: &str,
) -> Result<&'a mut Table, Error> {
    tables
        .get_mut(name)
        .ok_or_else(|| Error::Internal(format!("no table {name:?} in the graph")))
}

/// A join-table column: integral by default, mirroring the endpoint's
/// identity when the user declared one.
fn join_column(name: &str, node: &Type) -> Result<Column, Error> {
    let id = node.id.as_ref().ok_or_else(|| Error::MissingPrimaryKey {
        table: node.table.clone(),
    })?;
    let mut column = Column {
        name: name.to_string(),
        kind: FieldKind::Int64,
        size: None,
        unique: false,
        nullable: false,
        schema_type: id.schema_type.clone(),
    };
    if id.user_defined {
        column.kind = id.kind;
        column.size = id.size;
    }
    Ok(column)
}

/// Replace a table's primary key with the edge-field columns promoted on
/// the node, in declared order.
fn composite_pk(table: &Table, node: &Type) -> Result<Vec<String>, Error> {
    let mut columns = Vec::with_capacity(node.edge_schema.id.len());
    for name in &node.edge_schema.id {
        let field = node
            .fields
            .iter()
            .find(|f| f.edge_field && f.name == *name)
            .ok_or_else(|| Error::MissingPkColumn {
                column: name.clone(),
                schema: node.name.clone(),
                field: name.clone(),
            })?;
        if !table.has_column(&field.column) {
            return Err(Error::MissingPkColumn {
                column: field.column.clone(),
                schema: node.name.clone(),
                field: field.name.clone(),
            });
        }
        columns.push(field.column.clone());
    }
    Ok(columns)
}

/// Delete action for a single-column foreign key: nullable keys null out,
/// others reject, and an edge annotation overrides either.
fn delete_action(edge: &Edge, nullable: bool) -> Result<ReferenceAction, Error> {
    let mut action = if nullable {
        ReferenceAction::SetNull
    } else {
        ReferenceAction::NoAction
    };
    if let Some(value) = edge.annotations.on_delete() {
        action = ReferenceAction::parse(value).ok_or_else(|| Error::UnknownReferenceAction {
            value: value.to_string(),
        })?;
    }
    Ok(action)
}

/// Constraint symbol of a single-column foreign key:
/// `<owner-table>_<ref-table>_<edge-name>`, unless the edge declares
/// exactly one explicit symbol.
fn fk_symbol(edge: &Edge, owner_table: &str, ref_table: &str) -> String {
    if let Some(key) = &edge.storage_key {
        if key.symbols.len() == 1 {
            return key.symbols[0].clone();
        }
    }
    format!("{}_{}_{}", owner_table, ref_table, edge.name)
}

/// Constraint symbols of the two join-table foreign keys:
/// `<join-table>_<column>`, with per-position overrides from the edge's
/// storage key.
fn fk_symbols(edge: &Edge, c1: &str, c2: &str) -> (String, String) {
    let mut s1 = format!("{}_{}", edge.rel.table, c1);
    let mut s2 = format!("{}_{}", edge.rel.table, c2);
    if let Some(key) = &edge.storage_key {
        if let Some(first) = key.symbols.first() {
            s1 = first.clone();
        }
        if let Some(second) = key.symbols.get(1) {
            s2 = second.clone();
        }
    }
    (s1, s2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use relgen_schema::{EdgeDef, FieldDef, SchemaDef, StorageKey};
    use serde_json::json;

    fn tables(schemas: Vec<SchemaDef>) -> Vec<Table> {
        Graph::new(Config::default(), schemas)
            .unwrap()
            .tables()
            .unwrap()
    }

    fn table<'a>(all: &'a [Table], name: &str) -> &'a Table {
        all.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn test_reference_action_parse() {
        assert_eq!(
            ReferenceAction::parse("cascade"),
            Some(ReferenceAction::Cascade)
        );
        assert_eq!(
            ReferenceAction::parse("SET NULL"),
            Some(ReferenceAction::SetNull)
        );
        assert_eq!(ReferenceAction::parse("drop"), None);
        assert_eq!(ReferenceAction::NoAction.as_str(), "NO ACTION");
    }

    #[test]
    fn test_node_tables_in_input_order() {
        let all = tables(vec![SchemaDef::new("User"), SchemaDef::new("Post")]);
        let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "posts"]);
    }

    #[test]
    fn test_identity_and_field_columns() {
        let all = tables(vec![SchemaDef::new("User")
            .with_field(FieldDef::new("name", FieldKind::String))
            .with_field(FieldDef::optional("nickname", FieldKind::String).unique())]);
        let users = table(&all, "users");
        assert_eq!(users.primary_key, vec!["id"]);
        assert_eq!(users.columns.len(), 3);
        assert_eq!(users.columns[0].name, "id");
        assert!(!users.columns[0].nullable);
        let nickname = users.column("nickname").unwrap();
        assert!(nickname.nullable);
        assert!(nickname.unique);
    }

    #[test]
    fn test_o2m_foreign_key() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(EdgeDef::to("posts", "Post")),
            SchemaDef::new("Post")
                .with_edge(EdgeDef::from("author", "User").with_ref("posts").unique()),
        ]);
        let posts = table(&all, "posts");
        let column = posts.column("user_posts").unwrap();
        assert!(column.nullable);
        assert!(!column.unique);
        assert_eq!(column.kind, FieldKind::Int64);

        assert_eq!(posts.foreign_keys.len(), 1);
        let fk = &posts.foreign_keys[0];
        assert_eq!(fk.on_delete, ReferenceAction::SetNull);
        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.ref_columns, vec!["id"]);
        assert_eq!(fk.symbol, "posts_users_posts");
    }

    #[test]
    fn test_required_edge_blocks_delete() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(EdgeDef::to("posts", "Post")),
            SchemaDef::new("Post").with_edge(
                EdgeDef::from("author", "User").with_ref("posts").unique().required(),
            ),
        ]);
        let posts = table(&all, "posts");
        assert!(!posts.column("user_posts").unwrap().nullable);
        assert_eq!(posts.foreign_keys[0].on_delete, ReferenceAction::NoAction);
    }

    #[test]
    fn test_on_delete_annotation_override() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(
                EdgeDef::to("posts", "Post").with_annotation("on_delete", json!("CASCADE")),
            ),
            SchemaDef::new("Post"),
        ]);
        let posts = table(&all, "posts");
        assert_eq!(posts.foreign_keys[0].on_delete, ReferenceAction::Cascade);
    }

    #[test]
    fn test_unknown_on_delete_value() {
        let graph = Graph::new(
            Config::default(),
            vec![
                SchemaDef::new("User").with_edge(
                    EdgeDef::to("posts", "Post").with_annotation("on_delete", json!("drop")),
                ),
                SchemaDef::new("Post"),
            ],
        )
        .unwrap();
        let err = graph.tables().unwrap_err();
        assert!(matches!(err, Error::UnknownReferenceAction { .. }));
    }

    #[test]
    fn test_o2o_unique_column() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(EdgeDef::to("card", "Card").unique()),
            SchemaDef::new("Card")
                .with_edge(EdgeDef::from("owner", "User").with_ref("card").unique()),
        ]);
        let cards = table(&all, "cards");
        let column = cards.column("user_card").unwrap();
        assert!(column.unique);
        assert!(column.nullable);
    }

    #[test]
    fn test_m2m_join_table() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(EdgeDef::to("groups", "Group")),
            SchemaDef::new("Group")
                .with_edge(EdgeDef::from("users", "User").with_ref("groups")),
        ]);
        // Join tables are appended after the node tables.
        assert_eq!(all.len(), 3);
        let join = table(&all, "user_groups");
        assert_eq!(join.primary_key, vec!["user_id", "group_id"]);
        assert_eq!(join.columns.len(), 2);
        assert!(join.columns.iter().all(|c| !c.nullable));
        assert_eq!(join.foreign_keys.len(), 2);
        assert!(join
            .foreign_keys
            .iter()
            .all(|fk| fk.on_delete == ReferenceAction::Cascade));
        assert_eq!(join.foreign_keys[0].symbol, "user_groups_user_id");
        assert_eq!(join.foreign_keys[1].symbol, "user_groups_group_id");
    }

    #[test]
    fn test_m2m_join_mirrors_user_defined_ids() {
        let all = tables(vec![
            SchemaDef::new("User")
                .with_field(FieldDef::new("id", FieldKind::Uuid))
                .with_edge(EdgeDef::to("groups", "Group")),
            SchemaDef::new("Group")
                .with_edge(EdgeDef::from("users", "User").with_ref("groups")),
        ]);
        let join = table(&all, "user_groups");
        assert_eq!(join.column("user_id").unwrap().kind, FieldKind::Uuid);
        assert_eq!(join.column("group_id").unwrap().kind, FieldKind::Int64);
    }

    #[test]
    fn test_storage_key_symbol_overrides() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(
                EdgeDef::to("groups", "Group")
                    .with_storage_key(StorageKey::symbols("member_fk", "group_fk")),
            ),
            SchemaDef::new("Group")
                .with_edge(EdgeDef::from("users", "User").with_ref("groups")),
        ]);
        let join = table(&all, "user_groups");
        assert_eq!(join.foreign_keys[0].symbol, "member_fk");
        assert_eq!(join.foreign_keys[1].symbol, "group_fk");

        // An unpaired unique association is many-to-one: its key lives on
        // the declaring side.
        let all = tables(vec![
            SchemaDef::new("User").with_edge(
                EdgeDef::to("card", "Card")
                    .unique()
                    .with_storage_key(StorageKey::symbol("user_card_fk")),
            ),
            SchemaDef::new("Card"),
        ]);
        let users = table(&all, "users");
        assert!(users.has_column("user_card"));
        assert_eq!(users.foreign_keys[0].symbol, "user_card_fk");
    }

    #[test]
    fn test_indexes_applied_to_relation_columns() {
        let all = tables(vec![
            SchemaDef::new("User").with_edge(EdgeDef::to("posts", "Post")),
            SchemaDef::new("Post")
                .with_field(FieldDef::new("title", FieldKind::String))
                .with_edge(EdgeDef::from("author", "User").with_ref("posts").unique())
                .with_index(relgen_schema::IndexDef::unique_on(["title", "user_posts"])),
        ]);
        let posts = table(&all, "posts");
        assert_eq!(posts.indexes.len(), 1);
        assert_eq!(posts.indexes[0].columns, vec!["title", "user_posts"]);
        assert!(posts.has_column("user_posts"));
    }
}
