//! Relgen schema descriptors.
//!
//! This crate defines the raw, declarative schema contract consumed by the
//! relgen resolver: entity descriptors with fields, edges, and indexes,
//! plus the free-form annotations map attached to each of them.
//!
//! Descriptors are plain data. They carry no resolved state (no inferred
//! cardinality, no foreign keys, no table layout); all of that is produced
//! by `relgen-core`. Every type serializes with serde so a set of loaded
//! schemas can round-trip through the snapshot bundle unchanged.

pub mod annotations;
pub mod def;
pub mod kind;

pub use annotations::Annotations;
pub use def::{
    DefaultValue, EdgeDef, FieldDef, IndexDef, SchemaDef, StorageKey, ThroughDef,
};
pub use kind::FieldKind;
