//! Relgen core - graph resolver and relational materializer.
//!
//! The core turns a list of declarative entity schemas into a fully
//! typed relational graph: fields and identities resolve first, edges
//! are linked into bidirectional pairs, relation kinds (O2O, O2M, M2O,
//! M2M) are inferred from the uniqueness of each side, foreign keys are
//! placed on the hosting tables, and join entities declared as edge
//! schemas are bound with their composite keys. [`Graph::tables`] then
//! projects the result onto a neutral table model for DDL emission.
//!
//! Resolution is synchronous and deterministic: [`Graph::new`] is a pure
//! function of its config and schemas, fails on the first invalid input,
//! and never exposes a partially-built graph.

pub mod config;
pub mod edge;
pub mod error;
pub mod graph;
pub mod naming;
pub mod node;
pub mod table;

pub use config::{Config, Feature, GenerateFunc, Generator, Hook, Storage};
pub use edge::{Edge, EdgeId, NodeId, RelKind, Relation};
pub use error::Error;
pub use graph::{Graph, Snapshot};
pub use node::{EdgeSchemaInfo, Field, ForeignKey, Index, Type};
pub use table::{Column, ReferenceAction, Table, TableForeignKey};

/// Re-export the schema descriptors.
pub use relgen_schema as schema;
