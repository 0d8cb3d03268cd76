//! Generator configuration shared by all resolved nodes.

use crate::error::Error;
use crate::graph::Graph;
use relgen_schema::{Annotations, FieldKind};
use std::fmt;
use std::sync::Arc;

/// Global code-generation configuration.
///
/// Most options are opaque to the resolver and merely forwarded to the
/// surrounding generator: source and target paths, the package name, the
/// file header, features, and global annotations. The resolver itself
/// consumes `storage` (whether a table model is materialized at all) and
/// `id_type` (the default identity column type).
#[derive(Clone, Default)]
pub struct Config {
    /// Source package path of the user schemas.
    pub schema: String,
    /// Target directory for generated code.
    pub target: String,
    /// Package path of the target directory.
    pub package: String,
    /// Optional header for generated files.
    pub header: Option<String>,
    /// Storage family the generator targets.
    pub storage: Storage,
    /// Default identity column type. When unset, it is derived from the
    /// nodes after resolution (falling back to `Int64`).
    pub id_type: Option<FieldKind>,
    /// Feature flags forwarded to the generator.
    pub features: Vec<Feature>,
    /// Global annotations, passed through verbatim.
    pub annotations: Annotations,
    /// Middleware wrapping the whole generation.
    pub hooks: Vec<Hook>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("schema", &self.schema)
            .field("target", &self.target)
            .field("package", &self.package)
            .field("header", &self.header)
            .field("storage", &self.storage)
            .field("id_type", &self.id_type)
            .field("features", &self.features)
            .field("annotations", &self.annotations)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Storage family targeted by the generator. Only SQL storage carries a
/// table model; the graph resolves identically either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Storage {
    /// Relational storage: the materializer produces a table model.
    #[default]
    Sql,
    /// Document storage: no table model.
    Document,
}

impl Storage {
    /// Check if this storage family materializes tables.
    pub fn supports_tables(self) -> bool {
        matches!(self, Storage::Sql)
    }
}

/// A named feature flag. Opaque to the resolver; feature names are
/// recorded in the schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl Feature {
    /// Create a feature flag.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Consumer of a resolved graph. The template engine implements this on
/// the outside; the core only defines the seam so hooks can wrap it.
pub trait Generator {
    /// Generate artifacts for the resolved graph.
    fn generate(&self, graph: &Graph) -> Result<(), Error>;
}

/// Adapter to use a plain function as a [`Generator`].
pub struct GenerateFunc<F>(pub F);

impl<F> Generator for GenerateFunc<F>
where
    F: Fn(&Graph) -> Result<(), Error>,
{
    fn generate(&self, graph: &Graph) -> Result<(), Error> {
        (self.0)(graph)
    }
}

/// Generation middleware: receives the next generator in the chain and
/// returns the wrapped one.
pub type Hook = Arc<dyn Fn(Arc<dyn Generator>) -> Arc<dyn Generator> + Send + Sync>;
