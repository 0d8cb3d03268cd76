//! Resolver error types.
//!
//! Construction is fail-fast: every pipeline stage returns the first error
//! it encounters, the partially-built graph is dropped, and the caller
//! sees exactly one diagnostic naming the offending schema, field, or
//! edge.

use crate::edge::RelKind;
use relgen_schema::FieldKind;
use thiserror::Error;

/// Graph construction and materialization errors.
#[derive(Debug, Error)]
pub enum Error {
    // ---- Schema well-formedness ----
    /// A schema name is declared more than once.
    #[error("schema {name:?} is declared more than once")]
    DuplicateType {
        /// Schema name.
        name: String,
    },

    /// A schema declares two fields with the same name.
    #[error("schema {schema} contains multiple {field:?} fields")]
    DuplicateField {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// A schema declares two edges with the same name.
    #[error("schema {schema} contains multiple {edge:?} edges")]
    DuplicateEdge {
        /// Schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// A schema declares a field and an edge with the same name.
    #[error("schema {schema} cannot contain field and edge with the same name {name:?}")]
    FieldEdgeConflict {
        /// Schema name.
        schema: String,
        /// Conflicting name.
        name: String,
    },

    /// The id field has a type that cannot be used as an identity column.
    #[error("invalid type {kind} for the id field of schema {schema}")]
    InvalidIdType {
        /// Schema name.
        schema: String,
        /// Declared field kind.
        kind: FieldKind,
    },

    /// An `other`-tagged field declares no schema type to map through.
    #[error("field {schema}.{field} has an opaque type tag but no schema type")]
    InvalidFieldType {
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// An edge points at a type that is not part of the graph.
    #[error("type {target:?} does not exist for edge {schema}.{edge}")]
    TypeNotFound {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Missing target type name.
        target: String,
    },

    // ---- Edge wiring ----
    /// An inverse edge names no association to pair with.
    #[error("back-reference edge {schema}.{edge} is missing the ref attribute")]
    MissingRefName {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// The association named by an inverse edge does not exist on the
    /// target type.
    #[error("edge {ref_name:?} is missing for inverse edge: {schema}.{edge}({target})")]
    MissingAssoc {
        /// Named association edge.
        ref_name: String,
        /// Declaring schema name.
        schema: String,
        /// Inverse edge name.
        edge: String,
        /// Target type name.
        target: String,
    },

    /// Both sides of a paired edge are required.
    #[error("edges cannot be required in both directions: {schema}.{edge} <-> {target}.{ref_name}")]
    BothRequired {
        /// Inverse-declaring schema name.
        schema: String,
        /// Inverse edge name.
        edge: String,
        /// Target type name.
        target: String,
        /// Association edge name.
        ref_name: String,
    },

    /// The association an inverse edge pairs with points at a different
    /// type.
    #[error("mismatched type for back-ref {ref_name:?} of {schema}.{edge} <-> {target}.{ref_name}")]
    RefTypeMismatch {
        /// Named association edge.
        ref_name: String,
        /// Inverse-declaring schema name.
        schema: String,
        /// Inverse edge name.
        edge: String,
        /// Target type name.
        target: String,
    },

    /// A self-paired back-reference also names a ref; the name is derived
    /// from the inline association.
    #[error("reference name is derived from the association name: {schema}.{edge}")]
    SelfPairRefName {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// A back-reference with an inline association targets another type.
    #[error("association with an inline back-reference is allowed only on the same type: {schema}.{edge}")]
    SelfPairType {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// A self-paired edge is not unique on both sides.
    #[error("association with an inline back-reference must be unique on both sides: {schema}.{edge}")]
    SelfPairUnique {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    // ---- Edge schemas ----
    /// A join entity was bound to an edge that is not many-to-many.
    #[error("Through is allowed only on M2M edges, but edge {schema}.{edge} is {kind}")]
    ThroughNotM2M {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Resolved relation kind.
        kind: RelKind,
    },

    /// The join entity named by an edge does not exist.
    #[error("edge {schema}.{edge} goes through type {target:?}, but the type was not found")]
    ThroughTypeNotFound {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Missing join type name.
        target: String,
    },

    /// An edge goes through its own declaring schema.
    #[error("edge {schema}.{edge} cannot go through itself")]
    ThroughSelf {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// The navigation-edge name of a join binding is empty or clashes with
    /// an existing edge.
    #[error("edge {schema}.{edge} goes through {name:?}, but schema {schema} already has an edge with that name")]
    ThroughNameUsed {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Requested navigation-edge name.
        name: String,
    },

    /// A join entity is already bound to a different edge pair.
    #[error("type {join} is already used as an edge schema by {existing_schema}.{existing_edge}")]
    EdgeSchemaTaken {
        /// Join type name.
        join: String,
        /// Schema of the edge already holding the slot.
        existing_schema: String,
        /// Name of the edge already holding the slot.
        existing_edge: String,
    },

    /// The association and back-reference bound to a join entity are not
    /// a pair.
    #[error("mismatched association and back-reference for edge schema {join}")]
    EdgeSchemaMismatch {
        /// Join type name.
        join: String,
    },

    /// A join entity lacks the edge-field backing one of the relation
    /// columns.
    #[error("missing edge-field {join}.{column} for edge schema used by {schema}.{edge}")]
    MissingEdgeField {
        /// Join type name.
        join: String,
        /// Expected column name.
        column: String,
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// A join entity's reference edge is optional.
    #[error("edge schema {join} must declare a required reference edge for {schema}.{edge}")]
    EdgeFieldOptional {
        /// Join type name.
        join: String,
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
    },

    /// The composite primary-key annotation does not match the relation
    /// columns.
    #[error("edge schema {join} primary key can only be defined on \"id\" or ({c1:?}, {c2:?}) in the same order")]
    CompositeIdMismatch {
        /// Join type name.
        join: String,
        /// First relation column.
        c1: String,
        /// Second relation column.
        c2: String,
    },

    // ---- Foreign keys ----
    /// An edge binds a foreign-key field that is not declared.
    #[error("edge {schema}.{edge} is bound to field {field:?}, but the field is not declared")]
    BindingFieldNotFound {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Bound field name.
        field: String,
    },

    /// An edge binds a foreign-key field on the side that does not host
    /// the column.
    #[error("edge {schema}.{edge} cannot bind field {field:?}: the foreign-key column lives on the other side of the relation")]
    BindingWrongSide {
        /// Declaring schema name.
        schema: String,
        /// Edge name.
        edge: String,
        /// Bound field name.
        field: String,
    },

    // ---- Indexes ----
    /// An index entry names neither a declared field nor a foreign-key
    /// column.
    #[error("unknown column {name:?} for index on schema {schema}")]
    UnknownIndexColumn {
        /// Schema name.
        schema: String,
        /// Unresolvable entry.
        name: String,
    },

    // ---- Materialization ----
    /// A composite primary-key column is missing from its table.
    #[error("missing column {column:?} for edge field {schema}.{field}")]
    MissingPkColumn {
        /// Column name.
        column: String,
        /// Schema name.
        schema: String,
        /// Field name.
        field: String,
    },

    /// A referenced table has no primary key to point a foreign key at.
    #[error("missing primary key for table {table:?}")]
    MissingPrimaryKey {
        /// Table name.
        table: String,
    },

    /// A referential-action annotation holds an unknown value.
    #[error("unknown referential action {value:?}")]
    UnknownReferenceAction {
        /// Annotation value.
        value: String,
    },

    // ---- Infrastructure ----
    /// Snapshot encoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A post-stage invariant was violated. Seeing this means a resolver
    /// bug, not a schema mistake.
    #[error("internal error: {0}")]
    Internal(String),
}
