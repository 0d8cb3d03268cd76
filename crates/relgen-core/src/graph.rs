//! Graph construction and relation resolution.
//!
//! [`Graph::new`] runs the full pipeline over the loaded schemas: nodes
//! are built first, then edges are linked into bidirectional pairs,
//! relation kinds are inferred, foreign keys are installed, edge schemas
//! are bound, and indexes resolve against the final column set.
//!
//! Relation kinds between an association `E` on `A` and a back-reference
//! `E'` on `B`:
//!
//! - O2O: `E` unique and `E'` unique, or `E` unique to `A` itself.
//! - O2M: `E` not unique, `E'` unique or absent (the many side holds the
//!   reference to the one side).
//! - M2O: `E` unique, `E'` not unique or absent.
//! - M2M: neither unique, or `E` not unique to `A` itself.
//!
//! Construction is a pure function of its inputs: the same schemas and
//! config always produce the same graph, and a failed construction never
//! exposes a partially-built one.

use crate::config::{Config, Generator};
use crate::edge::{struct_tag, Edge, EdgeId, NodeId, RelKind, Relation};
use crate::error::Error;
use crate::naming::{singular, snake};
use crate::node::{Field, ForeignKey, Type};
use relgen_schema::{Annotations, FieldKind, IndexDef, SchemaDef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The resolved schema graph.
///
/// Nodes are held in input order; each node holds the edges declared on
/// it (plus navigation edges appended for edge schemas). Paired edges
/// address each other by [`EdgeId`].
#[derive(Debug, Clone)]
pub struct Graph {
    /// Shared generation configuration.
    pub config: Config,
    /// Resolved nodes, in schema input order.
    pub nodes: Vec<Type>,
    /// Raw input schemas, kept for the snapshot bundle.
    pub schemas: Vec<SchemaDef>,
    node_index: HashMap<String, NodeId>,
}

impl Graph {
    /// Resolve the given schemas into a graph. Fails on the first invalid
    /// schema, edge, or index.
    #[instrument(skip_all, fields(schemas = schemas.len()))]
    pub fn new(config: Config, schemas: Vec<SchemaDef>) -> Result<Self, Error> {
        let mut graph = Self {
            config,
            nodes: Vec::with_capacity(schemas.len()),
            schemas: Vec::new(),
            node_index: HashMap::with_capacity(schemas.len()),
        };
        for def in &schemas {
            graph.add_node(def)?;
        }
        for def in &schemas {
            graph.add_edges(def)?;
        }
        for t in 0..graph.nodes.len() {
            graph.resolve(t)?;
        }
        for t in 0..graph.nodes.len() {
            graph.setup_fks(t)?;
        }
        graph.edge_schemas(&schemas)?;
        for def in &schemas {
            graph.add_indexes(def)?;
        }
        graph.defaults();
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.nodes.iter().map(|n| n.edges.len()).sum::<usize>(),
            "graph resolved"
        );
        graph.schemas = schemas;
        Ok(graph)
    }

    /// Get a node by name.
    pub fn node(&self, name: &str) -> Option<&Type> {
        self.node_index.get(name).map(|&t| &self.nodes[t])
    }

    /// Get an edge by address.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.nodes.get(id.0).and_then(|n| n.edges.get(id.1))
    }

    /// Run the given generator over the graph, wrapped by the configured
    /// hooks (outermost hook first).
    pub fn gen(&self, base: Arc<dyn Generator>) -> Result<(), Error> {
        let mut generator = base;
        for hook in self.config.hooks.iter().rev() {
            generator = hook(generator);
        }
        generator.generate(self)
    }

    /// The read-only snapshot of the inputs this graph was built from.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            schema: self.config.schema.clone(),
            package: self.config.package.clone(),
            schemas: self.schemas.clone(),
            features: self.config.features.iter().map(|f| f.name.clone()).collect(),
        }
    }

    /// Stable JSON encoding of the snapshot bundle.
    pub fn schema_snapshot(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.snapshot()).map_err(|err| Error::Serialization(err.to_string()))
    }

    pub(crate) fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    fn named(&self, name: &str) -> Result<NodeId, Error> {
        self.node_id(name)
            .ok_or_else(|| Error::Internal(format!("node {name:?} missing from the graph")))
    }

    fn add_node(&mut self, def: &SchemaDef) -> Result<(), Error> {
        if self.node_index.contains_key(&def.name) {
            return Err(Error::DuplicateType {
                name: def.name.clone(),
            });
        }
        let node = Type::new(&self.config, def)?;
        self.node_index.insert(def.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Construct the edges declared on a schema. Back-references are
    /// linked to their associations in [`Graph::resolve`]; only the
    /// self-paired form cross-links here, since both sides are declared
    /// together.
    fn add_edges(&mut self, def: &SchemaDef) -> Result<(), Error> {
        let t = self.named(&def.name)?;
        let mut seen: HashSet<&str> = HashSet::with_capacity(def.edges.len());
        for edef in &def.edges {
            let target = self.node_id(&edef.target).ok_or_else(|| Error::TypeNotFound {
                schema: def.name.clone(),
                edge: edef.name.clone(),
                target: edef.target.clone(),
            })?;
            self.check_edge_name(t, &def.name, &edef.name, &mut seen)?;
            match (edef.inverse, &edef.ref_def) {
                // Association only.
                (false, _) => {
                    let edge = Edge {
                        name: edef.name.clone(),
                        owner: t,
                        target,
                        inverse: None,
                        ref_id: None,
                        unique: edef.unique,
                        optional: !edef.required,
                        bidi: false,
                        struct_tag: struct_tag(&edef.name, &edef.tag),
                        rel: Relation::default(),
                        through: None,
                        through_def: edef.through.clone(),
                        field: edef.field.clone(),
                        storage_key: edef.storage_key.clone(),
                        annotations: edef.annotations.clone(),
                    };
                    self.nodes[t].edges.push(edge);
                }
                // Back-reference only.
                (true, None) => {
                    let ref_name = edef
                        .ref_name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .ok_or_else(|| Error::MissingRefName {
                            schema: def.name.clone(),
                            edge: edef.name.clone(),
                        })?;
                    let edge = Edge {
                        name: edef.name.clone(),
                        owner: target,
                        target,
                        inverse: Some(ref_name),
                        ref_id: None,
                        unique: edef.unique,
                        optional: !edef.required,
                        bidi: false,
                        struct_tag: struct_tag(&edef.name, &edef.tag),
                        rel: Relation::default(),
                        through: None,
                        through_def: edef.through.clone(),
                        field: edef.field.clone(),
                        storage_key: edef.storage_key.clone(),
                        annotations: edef.annotations.clone(),
                    };
                    self.nodes[t].edges.push(edge);
                }
                // Back-reference with its association declared inline:
                // a unique self-referencing pair.
                (true, Some(assoc)) => {
                    if edef.ref_name.is_some() {
                        return Err(Error::SelfPairRefName {
                            schema: def.name.clone(),
                            edge: edef.name.clone(),
                        });
                    }
                    if assoc.target != def.name {
                        return Err(Error::SelfPairType {
                            schema: def.name.clone(),
                            edge: edef.name.clone(),
                        });
                    }
                    if !edef.unique || !assoc.unique {
                        return Err(Error::SelfPairUnique {
                            schema: def.name.clone(),
                            edge: edef.name.clone(),
                        });
                    }
                    self.check_edge_name(t, &def.name, &assoc.name, &mut seen)?;
                    let base = self.nodes[t].edges.len();
                    let from = Edge {
                        name: edef.name.clone(),
                        owner: t,
                        target,
                        inverse: Some(assoc.name.clone()),
                        ref_id: Some((t, base + 1)),
                        unique: edef.unique,
                        optional: !edef.required,
                        bidi: false,
                        struct_tag: struct_tag(&edef.name, &edef.tag),
                        rel: Relation::default(),
                        through: None,
                        through_def: edef.through.clone(),
                        field: edef.field.clone(),
                        storage_key: edef.storage_key.clone(),
                        annotations: edef.annotations.clone(),
                    };
                    let to = Edge {
                        name: assoc.name.clone(),
                        owner: t,
                        target,
                        inverse: None,
                        ref_id: Some((t, base)),
                        unique: assoc.unique,
                        optional: !assoc.required,
                        bidi: false,
                        struct_tag: struct_tag(&assoc.name, &assoc.tag),
                        rel: Relation::default(),
                        through: None,
                        through_def: assoc.through.clone(),
                        field: assoc.field.clone(),
                        storage_key: assoc.storage_key.clone(),
                        annotations: assoc.annotations.clone(),
                    };
                    self.nodes[t].edges.push(from);
                    self.nodes[t].edges.push(to);
                }
            }
        }
        Ok(())
    }

    fn check_edge_name<'a>(
        &self,
        t: NodeId,
        schema: &str,
        name: &'a str,
        seen: &mut HashSet<&'a str>,
    ) -> Result<(), Error> {
        let node = &self.nodes[t];
        let id_conflict = node.id.as_ref().is_some_and(|id| id.name == name);
        if id_conflict || node.field(name).is_some() {
            return Err(Error::FieldEdgeConflict {
                schema: schema.to_string(),
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(Error::DuplicateEdge {
                schema: schema.to_string(),
                edge: name.to_string(),
            });
        }
        Ok(())
    }

    /// Pair back-references with their associations and infer relation
    /// kinds, tables, and foreign-key columns.
    fn resolve(&mut self, t: NodeId) -> Result<(), Error> {
        for j in 0..self.nodes[t].edges.len() {
            let (inverse, kind) = {
                let e = &self.nodes[t].edges[j];
                (e.inverse.clone(), e.rel.kind)
            };
            if let Some(inverse) = inverse {
                self.resolve_pair(t, j, &inverse)?;
            } else if kind == RelKind::Unk {
                self.resolve_assoc(t, j);
            }
        }
        Ok(())
    }

    fn resolve_pair(&mut self, t: NodeId, j: usize, inverse: &str) -> Result<(), Error> {
        let (e_name, e_unique, e_optional, target) = {
            let e = &self.nodes[t].edges[j];
            (e.name.clone(), e.unique, e.optional, e.target)
        };
        let rj = self.nodes[target].assoc(inverse).ok_or_else(|| Error::MissingAssoc {
            ref_name: inverse.to_string(),
            schema: self.nodes[t].name.clone(),
            edge: e_name.clone(),
            target: self.nodes[target].name.clone(),
        })?;
        let (ref_name, ref_unique, ref_optional, ref_target) = {
            let r = &self.nodes[target].edges[rj];
            (r.name.clone(), r.unique, r.optional, r.target)
        };
        if !e_optional && !ref_optional {
            return Err(Error::BothRequired {
                schema: self.nodes[t].name.clone(),
                edge: e_name,
                target: self.nodes[target].name.clone(),
                ref_name,
            });
        }
        if ref_target != t {
            return Err(Error::RefTypeMismatch {
                ref_name,
                schema: self.nodes[t].name.clone(),
                edge: e_name,
                target: self.nodes[target].name.clone(),
            });
        }
        self.nodes[t].edges[j].ref_id = Some((target, rj));
        self.nodes[target].edges[rj].ref_id = Some((t, j));

        // Name the foreign-key column so that it survives dropping or
        // adding the back-reference: "<assoc-owner-label>_<assoc-name>".
        let column = format!("{}_{}", self.nodes[target].label, snake(&ref_name));
        let mut table = self.nodes[t].table.clone();
        let (e_kind, ref_kind) = match (ref_unique, e_unique) {
            // The relation column lives in the back-reference table.
            (true, true) => (RelKind::O2O, RelKind::O2O),
            (false, true) => (RelKind::M2O, RelKind::O2M),
            // The relation column lives in the association table.
            (true, false) => {
                table = self.nodes[target].table.clone();
                (RelKind::O2M, RelKind::M2O)
            }
            (false, false) => {
                table = format!("{}_{}", self.nodes[target].label, ref_name);
                (RelKind::M2M, RelKind::M2M)
            }
        };
        let columns = if e_kind == RelKind::M2M {
            let c1 = format!("{}_id", self.nodes[target].label);
            let mut c2 = format!("{}_id", self.nodes[t].label);
            // A self-referencing relation would produce the same name
            // twice; the second column takes the edge name instead.
            if c1 == c2 {
                c2 = format!("{}_id", singular(&e_name));
            }
            vec![c1, c2]
        } else {
            vec![column]
        };
        {
            let e = &mut self.nodes[t].edges[j];
            e.rel.kind = e_kind;
            e.rel.table = table.clone();
            e.rel.columns = columns.clone();
        }
        {
            let r = &mut self.nodes[target].edges[rj];
            r.rel.kind = ref_kind;
            r.rel.table = table;
            r.rel.columns = columns;
        }
        Ok(())
    }

    fn resolve_assoc(&mut self, t: NodeId, j: usize) {
        let (name, unique, target) = {
            let e = &self.nodes[t].edges[j];
            (e.name.clone(), e.unique, e.target)
        };
        let label = self.nodes[t].label.clone();
        let (kind, bidi, table) = match (unique, target == t) {
            (false, true) => (RelKind::M2M, true, format!("{label}_{name}")),
            (true, true) => (RelKind::O2O, true, self.nodes[t].table.clone()),
            (true, false) => (RelKind::M2O, false, self.nodes[t].table.clone()),
            (false, false) => (RelKind::O2M, false, self.nodes[target].table.clone()),
        };
        let columns = if kind == RelKind::M2M {
            vec![format!("{label}_id"), format!("{}_id", singular(&name))]
        } else {
            vec![format!("{}_{}", label, snake(&name))]
        };
        let e = &mut self.nodes[t].edges[j];
        e.rel.kind = kind;
        e.bidi = bidi;
        e.rel.table = table;
        e.rel.columns = columns;
    }

    /// Install foreign-key fields: for each single-column relation, the
    /// node whose table hosts the column either reuses the declared field
    /// the edge binds or gains a synthesized one.
    fn setup_fks(&mut self, t: NodeId) -> Result<(), Error> {
        for j in 0..self.nodes[t].edges.len() {
            let (kind, ref_id, is_inverse, target, optional, binding) = {
                let e = &self.nodes[t].edges[j];
                (
                    e.rel.kind,
                    e.ref_id,
                    e.is_inverse(),
                    e.target,
                    e.optional,
                    e.field.clone(),
                )
            };
            // Each paired relation installs its key once, from the side
            // declared on the hosting node; many-to-many relations hold
            // their columns in the join table instead.
            let process = match (ref_id, kind) {
                (_, RelKind::M2M) => false,
                (None, _) => true,
                (Some(_), RelKind::M2O) => true,
                (Some(_), RelKind::O2O) => is_inverse,
                _ => false,
            };
            if !process {
                if let Some(field) = binding {
                    return Err(Error::BindingWrongSide {
                        schema: self.nodes[t].name.clone(),
                        edge: self.nodes[t].edges[j].name.clone(),
                        field,
                    });
                }
                continue;
            }
            let (host, referenced) = if kind == RelKind::O2M {
                (target, t)
            } else {
                (t, target)
            };
            if let Some(field) = &binding {
                if host != t {
                    return Err(Error::BindingWrongSide {
                        schema: self.nodes[t].name.clone(),
                        edge: self.nodes[t].edges[j].name.clone(),
                        field: field.clone(),
                    });
                }
                self.bind_edge_field(t, j, field)?;
            }
            let column = self.nodes[t].edges[j]
                .rel
                .column()
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::Internal(format!(
                        "unresolved relation column for edge {}.{}",
                        self.nodes[t].name, self.nodes[t].edges[j].name
                    ))
                })?;
            if self.nodes[host]
                .foreign_keys
                .iter()
                .any(|fk| fk.field.column == column)
            {
                continue;
            }
            let field = match &binding {
                Some(name) => {
                    let declared =
                        self.nodes[host].field(name).cloned().ok_or_else(|| {
                            Error::Internal(format!("bound field {name:?} vanished"))
                        })?;
                    declared
                }
                None => {
                    let pk = self.nodes[referenced].id.clone().ok_or_else(|| {
                        Error::Internal(format!(
                            "node {} has no id to reference",
                            self.nodes[referenced].name
                        ))
                    })?;
                    // Self-referencing keys stay nullable; otherwise the
                    // hosting side's edge decides.
                    let nullable = match kind {
                        RelKind::O2M => true,
                        _ => optional || t == target,
                    };
                    Field {
                        name: column.clone(),
                        kind: pk.kind,
                        column: column.clone(),
                        optional: nullable,
                        unique: kind == RelKind::O2O,
                        default: None,
                        size: pk.size,
                        schema_type: pk.schema_type.clone(),
                        edge_field: true,
                        user_defined: false,
                        annotations: Annotations::new(),
                    }
                }
            };
            self.nodes[host].foreign_keys.push(ForeignKey {
                field,
                edge: (t, j),
                user_defined: binding.is_some(),
            });
        }
        Ok(())
    }

    /// Rewrite an edge's relation column to the storage column of the
    /// declared field it binds, and mark that field as an edge field.
    fn bind_edge_field(&mut self, t: NodeId, j: usize, name: &str) -> Result<(), Error> {
        let column = match self.nodes[t].fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.edge_field = true;
                field.column.clone()
            }
            None => {
                return Err(Error::BindingFieldNotFound {
                    schema: self.nodes[t].name.clone(),
                    edge: self.nodes[t].edges[j].name.clone(),
                    field: name.to_string(),
                })
            }
        };
        let ref_id = self.nodes[t].edges[j].ref_id;
        self.nodes[t].edges[j].rel.columns = vec![column.clone()];
        if let Some((rt, rj)) = ref_id {
            self.nodes[rt].edges[rj].rel.columns = vec![column];
        }
        Ok(())
    }

    /// Bind join entities declared with a through specifier: validate the
    /// join node, wire the from/to slots, rebase the relation onto the
    /// join table, and expose a navigation edge to the join rows.
    fn edge_schemas(&mut self, schemas: &[SchemaDef]) -> Result<(), Error> {
        for t in 0..self.nodes.len() {
            let declared = self.nodes[t].edges.len();
            for j in 0..declared {
                let Some(through) = self.nodes[t].edges[j].through_def.clone() else {
                    continue;
                };
                let (kind, is_inverse, e_name, ref_id) = {
                    let e = &self.nodes[t].edges[j];
                    (e.rel.kind, e.is_inverse(), e.name.clone(), e.ref_id)
                };
                let schema = self.nodes[t].name.clone();
                if kind != RelKind::M2M {
                    return Err(Error::ThroughNotM2M {
                        schema,
                        edge: e_name,
                        kind,
                    });
                }
                let join = self.node_id(&through.target).ok_or_else(|| {
                    Error::ThroughTypeNotFound {
                        schema: schema.clone(),
                        edge: e_name.clone(),
                        target: through.target.clone(),
                    }
                })?;
                if join == t {
                    return Err(Error::ThroughSelf {
                        schema,
                        edge: e_name,
                    });
                }
                if through.name.is_empty() || self.nodes[t].has_edge(&through.name) {
                    return Err(Error::ThroughNameUsed {
                        schema,
                        edge: e_name,
                        name: through.name,
                    });
                }
                // Claim the from/to slot and check the pair is consistent.
                let slot = if is_inverse {
                    self.nodes[join].edge_schema.from
                } else {
                    self.nodes[join].edge_schema.to
                };
                if let Some(existing) = slot {
                    return Err(Error::EdgeSchemaTaken {
                        join: self.nodes[join].name.clone(),
                        existing_schema: self.nodes[existing.0].name.clone(),
                        existing_edge: self.nodes[existing.0].edges[existing.1].name.clone(),
                    });
                }
                self.nodes[t].edges[j].through = Some(join);
                let paired = if is_inverse {
                    self.nodes[join].edge_schema.from = Some((t, j));
                    self.nodes[join].edge_schema.to
                } else {
                    self.nodes[join].edge_schema.to = Some((t, j));
                    self.nodes[join].edge_schema.from
                };
                if let Some(other) = paired {
                    let pair_ok = if is_inverse {
                        ref_id == Some(other)
                    } else {
                        self.nodes[other.0].edges[other.1].ref_id == Some((t, j))
                    };
                    if !pair_ok {
                        return Err(Error::EdgeSchemaMismatch {
                            join: self.nodes[join].name.clone(),
                        });
                    }
                }
                self.nodes[t].edges[j].rel.table = self.nodes[join].table.clone();
                // Bind both relation columns to edge-fields on the join
                // node, and pick the one referencing this side.
                let cols = self.nodes[t].edges[j].rel.columns.clone();
                let mut reference: Option<EdgeId> = None;
                for (i, column) in cols.iter().enumerate() {
                    let fk_edge = self.nodes[join]
                        .foreign_keys
                        .iter()
                        .find(|fk| fk.field.name == *column)
                        .map(|fk| fk.edge)
                        .ok_or_else(|| Error::MissingEdgeField {
                            join: self.nodes[join].name.clone(),
                            column: column.clone(),
                            schema: schema.clone(),
                            edge: e_name.clone(),
                        })?;
                    if self.nodes[fk_edge.0].edges[fk_edge.1].optional {
                        return Err(Error::EdgeFieldOptional {
                            join: self.nodes[join].name.clone(),
                            schema: schema.clone(),
                            edge: e_name.clone(),
                        });
                    }
                    if (!is_inverse && i == 0) || (is_inverse && i == 1) {
                        reference = Some(fk_edge);
                    }
                }
                let reference = reference.ok_or_else(|| {
                    Error::Internal("edge schema resolved without a reference edge".to_string())
                })?;
                let (ref_name, ref_table, ref_columns) = {
                    let r = &self.nodes[reference.0].edges[reference.1];
                    (r.name.clone(), r.rel.table.clone(), r.rel.columns.clone())
                };
                // One row on this side maps to many join rows, so the
                // navigation edge is always O2M and reuses the reference
                // edge's key.
                let nav_id = (t, self.nodes[t].edges.len());
                self.nodes[t].edges.push(Edge {
                    name: through.name.clone(),
                    owner: t,
                    target: join,
                    inverse: Some(ref_name),
                    ref_id: Some(reference),
                    unique: false,
                    optional: true,
                    bidi: false,
                    struct_tag: struct_tag(&through.name, ""),
                    rel: Relation {
                        kind: RelKind::O2M,
                        table: ref_table,
                        columns: ref_columns,
                    },
                    through: None,
                    through_def: None,
                    field: None,
                    storage_key: None,
                    annotations: Annotations::new(),
                });
                if self.nodes[reference.0].edges[reference.1].ref_id.is_none() {
                    self.nodes[reference.0].edges[reference.1].ref_id = Some(nav_id);
                }
                self.promote_composite_id(join, &cols)?;
                if self.nodes[join].has_composite_id() {
                    continue;
                }
                self.ensure_unique_index(join, &cols, schemas)?;
            }
        }
        Ok(())
    }

    /// Promote a composite primary key declared through an `id`
    /// annotation on the join node. Only the exact relation-column order
    /// is accepted.
    fn promote_composite_id(&mut self, join: NodeId, cols: &[String]) -> Result<(), Error> {
        let Some(declared) = self.nodes[join].annotations.composite_id() else {
            return Ok(());
        };
        if !self.nodes[join].edge_schema.id.is_empty() {
            return Ok(());
        }
        if declared.len() != 2 || declared[0] != cols[0] || declared[1] != cols[1] {
            return Err(Error::CompositeIdMismatch {
                join: self.nodes[join].name.clone(),
                c1: cols[0].clone(),
                c2: cols[1].clone(),
            });
        }
        self.nodes[join].id = None;
        self.nodes[join].edge_schema.id = declared;
        Ok(())
    }

    /// Synthesize a unique index over the relation-column pair unless the
    /// join schema declares one (in either order) or a previous binding
    /// already synthesized it.
    fn ensure_unique_index(
        &mut self,
        join: NodeId,
        cols: &[String],
        schemas: &[SchemaDef],
    ) -> Result<(), Error> {
        let covers = |columns: &[String], unique: bool| {
            unique
                && columns.len() == 2
                && ((columns[0] == cols[0] && columns[1] == cols[1])
                    || (columns[0] == cols[1] && columns[1] == cols[0]))
        };
        let declared = schemas
            .iter()
            .find(|s| s.name == self.nodes[join].name)
            .map(|s| s.indexes.iter().any(|idx| covers(&idx.fields, idx.unique)))
            .unwrap_or(false);
        let synthesized = self.nodes[join]
            .indexes
            .iter()
            .any(|idx| covers(&idx.columns, idx.unique));
        if !declared && !synthesized {
            let def = IndexDef::unique_on(cols.iter().cloned());
            self.nodes[join].add_index(&def)?;
        }
        Ok(())
    }

    fn add_indexes(&mut self, def: &SchemaDef) -> Result<(), Error> {
        let t = self.named(&def.name)?;
        for idx in &def.indexes {
            self.nodes[t].add_index(idx)?;
        }
        Ok(())
    }

    /// Derive the graph-wide default id type: the one shared by all nodes
    /// with a single-column id, falling back to `Int64` when nodes
    /// disagree or none exist.
    fn defaults(&mut self) {
        if self.config.id_type.is_some() {
            return;
        }
        let kinds: Vec<FieldKind> = self
            .nodes
            .iter()
            .filter_map(|n| n.id.as_ref())
            .map(|id| id.kind)
            .collect();
        let mut id_type = FieldKind::Int64;
        if let Some((first, rest)) = kinds.split_first() {
            if rest.iter().all(|kind| kind == first) {
                id_type = *first;
            }
        }
        self.config.id_type = Some(id_type);
    }
}

/// Serializable bundle of the generator inputs: schema path, package,
/// raw schemas, and enabled feature names. A round-trip of the inputs,
/// not of resolved state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Source package path of the user schemas.
    pub schema: String,
    /// Package path of the generated code.
    pub package: String,
    /// Raw input schemas.
    pub schemas: Vec<SchemaDef>,
    /// Enabled feature names.
    pub features: Vec<String>,
}
