//! Integration tests for the materialized table model.

use relgen_core::{Config, Graph, ReferenceAction, Table};
use relgen_schema::{EdgeDef, FieldDef, FieldKind, IndexDef, SchemaDef};
use serde_json::json;

fn tables(schemas: Vec<SchemaDef>) -> Vec<Table> {
    Graph::new(Config::default(), schemas)
        .unwrap()
        .tables()
        .unwrap()
}

fn table<'a>(all: &'a [Table], name: &str) -> &'a Table {
    all.iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("no table {name:?}"))
}

fn blog_schemas() -> Vec<SchemaDef> {
    vec![
        SchemaDef::new("User")
            .with_field(FieldDef::new("name", FieldKind::String))
            .with_field(FieldDef::new("email", FieldKind::String).unique())
            .with_edge(EdgeDef::to("posts", "Post")),
        SchemaDef::new("Post")
            .with_field(FieldDef::new("title", FieldKind::String))
            .with_edge(EdgeDef::from("author", "User").with_ref("posts").unique())
            .with_index(IndexDef::on(["title"])),
    ]
}

// ============== Node tables ==============

#[test]
fn test_parent_children_foreign_key() {
    let all = tables(blog_schemas());
    assert_eq!(all.len(), 2);

    let posts = table(&all, "posts");
    let fk_column = posts.column("user_posts").unwrap();
    assert!(fk_column.nullable);
    assert!(!fk_column.unique);

    let fk = &posts.foreign_keys[0];
    assert_eq!(fk.on_delete, ReferenceAction::SetNull);
    assert_eq!(fk.ref_table, "users");
    assert_eq!(fk.columns, vec!["user_posts"]);
    assert_eq!(fk.ref_columns, vec!["id"]);

    // No uniqueness index appears on the relation column.
    assert!(posts.indexes.iter().all(|idx| !idx.unique));
}

#[test]
fn test_self_referential_friends_join_table() {
    let all = tables(vec![
        SchemaDef::new("User")
            .with_field(FieldDef::new("name", FieldKind::String))
            .with_edge(EdgeDef::to("friends", "User")),
    ]);
    assert_eq!(all.len(), 2);

    let join = table(&all, "user_friends");
    assert_eq!(join.primary_key, vec!["user_id", "friend_id"]);
    assert_eq!(join.columns.len(), 2);
    assert!(join.columns.iter().all(|c| !c.nullable));
    assert_eq!(join.foreign_keys.len(), 2);
    for fk in &join.foreign_keys {
        assert_eq!(fk.on_delete, ReferenceAction::Cascade);
        assert_eq!(fk.ref_table, "users");
    }
}

#[test]
fn test_bidirectional_o2o_unique_key() {
    let all = tables(vec![
        SchemaDef::new("User").with_edge(EdgeDef::to("card", "Card").unique()),
        SchemaDef::new("Card")
            .with_field(FieldDef::new("number", FieldKind::String))
            .with_edge(EdgeDef::from("owner", "User").with_ref("card").unique()),
    ]);
    let cards = table(&all, "cards");
    let column = cards.column("user_card").unwrap();
    assert!(column.unique);
    assert!(column.nullable);
    assert_eq!(cards.foreign_keys[0].on_delete, ReferenceAction::SetNull);
}

#[test]
fn test_required_o2o_not_nullable() {
    let all = tables(vec![
        SchemaDef::new("User").with_edge(EdgeDef::to("card", "Card").unique()),
        SchemaDef::new("Card").with_edge(
            EdgeDef::from("owner", "User").with_ref("card").unique().required(),
        ),
    ]);
    let cards = table(&all, "cards");
    assert!(!cards.column("user_card").unwrap().nullable);
    assert_eq!(cards.foreign_keys[0].on_delete, ReferenceAction::NoAction);
}

// ============== Edge schemas ==============

fn role_schemas() -> Vec<SchemaDef> {
    vec![
        SchemaDef::new("User")
            .with_field(FieldDef::new("name", FieldKind::String))
            .with_edge(EdgeDef::to("roles", "Role").through("user_roles", "UserRole")),
        SchemaDef::new("Role")
            .with_field(FieldDef::new("name", FieldKind::String))
            .with_edge(
                EdgeDef::from("users", "User")
                    .with_ref("roles")
                    .through("user_roles", "UserRole"),
            ),
        SchemaDef::new("UserRole")
            .with_field(FieldDef::new("user_id", FieldKind::Int64))
            .with_field(FieldDef::new("role_id", FieldKind::Int64))
            .with_field(FieldDef::new("assigned_at", FieldKind::Time))
            .with_edge(
                EdgeDef::to("user", "User").unique().required().with_field("user_id"),
            )
            .with_edge(
                EdgeDef::to("role", "Role").unique().required().with_field("role_id"),
            )
            .with_annotation("id", json!(["user_id", "role_id"])),
    ]
}

#[test]
fn test_edge_schema_composite_primary_key() {
    let all = tables(role_schemas());
    // The user-defined join node materializes the relation; no extra
    // join table is synthesized.
    assert_eq!(all.len(), 3);

    let join = table(&all, "user_roles");
    assert_eq!(join.primary_key, vec!["user_id", "role_id"]);
    assert!(!join.has_column("id"));
    assert!(join.has_column("assigned_at"));

    // Reference edges are required, so both key columns reject deletes.
    for name in ["user_id", "role_id"] {
        assert!(!join.column(name).unwrap().nullable);
    }
    assert_eq!(join.foreign_keys.len(), 2);
    for fk in &join.foreign_keys {
        assert_eq!(fk.on_delete, ReferenceAction::NoAction);
    }
}

#[test]
fn test_edge_schema_without_composite_id() {
    let mut schemas = role_schemas();
    schemas[2].annotations = Default::default();
    let all = tables(schemas);

    let join = table(&all, "user_roles");
    assert_eq!(join.primary_key, vec!["id"]);
    assert!(join.has_column("id"));
    let idx = &join.indexes[0];
    assert!(idx.unique);
    assert_eq!(idx.columns, vec!["user_id", "role_id"]);
}

#[test]
fn test_declared_unique_index_suppresses_synthesis() {
    let mut schemas = role_schemas();
    schemas[2].annotations = Default::default();
    schemas[2].indexes.push(IndexDef::unique_on(["role_id", "user_id"]));
    let all = tables(schemas);

    let join = table(&all, "user_roles");
    assert_eq!(join.indexes.len(), 1);
    assert_eq!(join.indexes[0].columns, vec!["role_id", "user_id"]);
}

// ============== Ordering ==============

#[test]
fn test_join_tables_appended_after_nodes() {
    let all = tables(vec![
        SchemaDef::new("User")
            .with_edge(EdgeDef::to("groups", "Group"))
            .with_edge(EdgeDef::to("friends", "User")),
        SchemaDef::new("Group")
            .with_edge(EdgeDef::from("users", "User").with_ref("groups")),
    ]);
    let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["users", "groups", "user_groups", "user_friends"]
    );
}
