//! Schema, field, edge, and index descriptors.

use crate::annotations::Annotations;
use crate::kind::FieldKind;
use serde::{Deserialize, Serialize};

/// A declarative entity schema: the raw input to the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Entity name (unique within a generator invocation).
    pub name: String,
    /// Field declarations, in order.
    pub fields: Vec<FieldDef>,
    /// Edge declarations, in order.
    pub edges: Vec<EdgeDef>,
    /// Index declarations.
    pub indexes: Vec<IndexDef>,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl SchemaDef {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an edge.
    pub fn with_edge(mut self, edge: EdgeDef) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Set an annotation value.
    pub fn with_annotation(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(name, value);
        self
    }
}

/// A field declaration within a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field type tag.
    pub kind: FieldKind,
    /// Whether the field is nullable.
    pub optional: bool,
    /// Whether the field value must be unique across rows.
    pub unique: bool,
    /// Default value, if declared.
    pub default: Option<DefaultValue>,
    /// Storage column override. Defaults to the snake-cased field name.
    pub storage_key: Option<String>,
    /// Storage size hint (e.g. varchar width), propagated to foreign-key
    /// columns that mirror this field.
    pub size: Option<u32>,
    /// Raw SQL type override, propagated to foreign-key columns that
    /// mirror this field.
    pub schema_type: Option<String>,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl FieldDef {
    /// Create a required (non-nullable) field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            unique: false,
            default: None,
            storage_key: None,
            size: None,
            schema_type: None,
            annotations: Annotations::new(),
        }
    }

    /// Create an optional (nullable) field.
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            optional: true,
            ..Self::new(name, kind)
        }
    }

    /// Mark the field as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Override the storage column name.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Set the storage size hint.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Override the raw SQL column type.
    pub fn with_schema_type(mut self, ty: impl Into<String>) -> Self {
        self.schema_type = Some(ty.into());
        self
    }

    /// Set an annotation value.
    pub fn with_annotation(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(name, value);
        self
    }

    /// Check if the field declares a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Default value for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Current timestamp, evaluated at insert time.
    CurrentTime,
    /// Auto-generated UUID.
    AutoUuid,
    /// Custom expression, evaluated by the target dialect.
    Expression(String),
}

/// An edge declaration within a schema.
///
/// An edge is either an association (declared with [`EdgeDef::to`]) or a
/// back-reference to an association on the target type (declared with
/// [`EdgeDef::from`] plus [`EdgeDef::with_ref`]). The resolver pairs the
/// two into a bidirectional relation and infers its cardinality from the
/// `unique` flags on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    /// Edge name, local to the declaring schema.
    pub name: String,
    /// Target entity name.
    pub target: String,
    /// Whether at most one entity can be reached through this edge.
    pub unique: bool,
    /// Whether the edge must be set on creation.
    pub required: bool,
    /// Whether this is the back-reference side of a relation.
    pub inverse: bool,
    /// Name of the association edge on the target this back-reference
    /// pairs with. Required for inverse edges without an inline
    /// association.
    pub ref_name: Option<String>,
    /// Inline association for a self-referencing pair declared from the
    /// back-reference side. Mutually exclusive with `ref_name`.
    pub ref_def: Option<Box<EdgeDef>>,
    /// Name of a declared field that holds this edge's foreign-key
    /// column. Only valid on the side whose table hosts the column.
    pub field: Option<String>,
    /// Join-entity binding for many-to-many relations.
    pub through: Option<ThroughDef>,
    /// Struct tag for the generated accessor. Empty means the default
    /// JSON tag.
    pub tag: String,
    /// Explicit constraint-symbol overrides.
    pub storage_key: Option<StorageKey>,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl EdgeDef {
    fn bare(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            unique: false,
            required: false,
            inverse: false,
            ref_name: None,
            ref_def: None,
            field: None,
            through: None,
            tag: String::new(),
            storage_key: None,
            annotations: Annotations::new(),
        }
    }

    /// Declare an association edge to the given target.
    pub fn to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::bare(name, target)
    }

    /// Declare a back-reference edge from the given target. Pair it with
    /// the association via [`EdgeDef::with_ref`] or an inline
    /// [`EdgeDef::with_assoc`].
    pub fn from(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            inverse: true,
            ..Self::bare(name, target)
        }
    }

    /// Name the association edge on the target that this back-reference
    /// pairs with.
    pub fn with_ref(mut self, name: impl Into<String>) -> Self {
        self.ref_name = Some(name.into());
        self
    }

    /// Attach the inline association of a self-referencing pair.
    pub fn with_assoc(mut self, assoc: EdgeDef) -> Self {
        self.ref_def = Some(Box::new(assoc));
        self
    }

    /// Mark the edge as unique (at most one target entity).
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the edge as required on creation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bind the edge's foreign-key column to a declared field.
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    /// Route the relation through a join entity, exposed on the declaring
    /// schema as a navigation edge with the given name.
    pub fn through(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.through = Some(ThroughDef {
            name: name.into(),
            target: target.into(),
        });
        self
    }

    /// Set the struct tag for the generated accessor.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Override the foreign-key constraint symbols.
    pub fn with_storage_key(mut self, key: StorageKey) -> Self {
        self.storage_key = Some(key);
        self
    }

    /// Set an annotation value.
    pub fn with_annotation(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(name, value);
        self
    }
}

/// Join-entity binding of a many-to-many edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughDef {
    /// Name of the navigation edge added to the declaring schema.
    pub name: String,
    /// Name of the join entity.
    pub target: String,
}

/// Explicit foreign-key constraint symbols for an edge.
///
/// Single-column relations use the first symbol; join tables use the
/// first and second for their two foreign keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageKey {
    /// Constraint symbols, in foreign-key order.
    pub symbols: Vec<String>,
}

impl StorageKey {
    /// Override the symbol of a single-column foreign key.
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbols: vec![symbol.into()],
        }
    }

    /// Override both join-table foreign-key symbols.
    pub fn symbols(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            symbols: vec![first.into(), second.into()],
        }
    }
}

/// An index declaration within a schema.
///
/// Entries name declared fields or foreign-key columns; they are bound to
/// storage columns after edges resolve, so indexes over relation columns
/// are declared the same way as indexes over plain fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Field or column names, in order.
    pub fields: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Free-form annotations.
    pub annotations: Annotations,
}

impl IndexDef {
    /// Declare an index over the given fields.
    pub fn on<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
            annotations: Annotations::new(),
        }
    }

    /// Declare a unique index over the given fields.
    pub fn unique_on<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            ..Self::on(fields)
        }
    }
}
