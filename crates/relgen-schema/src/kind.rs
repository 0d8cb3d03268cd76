//! Field type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a schema field.
///
/// The set is closed: dialect drivers map each tag to a concrete column
/// type, so fields cannot introduce arbitrary types. `Other` is an escape
/// hatch for columns the generator does not interpret; such fields must
/// carry an explicit schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Boolean value.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp.
    Time,
    /// UUID (128-bit identifier).
    Uuid,
    /// Enumeration over a fixed set of string values.
    Enum,
    /// JSON document.
    Json,
    /// Opaque type mapped through an explicit schema type.
    Other,
}

impl FieldKind {
    /// Check if this tag is a signed or unsigned integer.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldKind::Int8
                | FieldKind::Int16
                | FieldKind::Int32
                | FieldKind::Int64
                | FieldKind::Uint8
                | FieldKind::Uint16
                | FieldKind::Uint32
                | FieldKind::Uint64
        )
    }

    /// Check if this tag is a floating point type.
    pub fn is_float(self) -> bool {
        matches!(self, FieldKind::Float32 | FieldKind::Float64)
    }

    /// Check if this tag is numeric.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this tag is allowed for an identity field.
    ///
    /// Identity columns are integers, strings, or UUIDs; anything else is
    /// rejected by the node builder.
    pub fn valid_id(self) -> bool {
        self.is_integer() || matches!(self, FieldKind::String | FieldKind::Uuid)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Bool => "bool",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint8 => "uint8",
            FieldKind::Uint16 => "uint16",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Time => "time",
            FieldKind::Uuid => "uuid",
            FieldKind::Enum => "enum",
            FieldKind::Json => "json",
            FieldKind::Other => "other",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_tags() {
        assert!(FieldKind::Int32.is_integer());
        assert!(FieldKind::Uint64.is_integer());
        assert!(!FieldKind::Float32.is_integer());
        assert!(!FieldKind::String.is_integer());
    }

    #[test]
    fn test_numeric_tags() {
        assert!(FieldKind::Int8.is_numeric());
        assert!(FieldKind::Float64.is_numeric());
        assert!(!FieldKind::Bytes.is_numeric());
        assert!(!FieldKind::Json.is_numeric());
    }

    #[test]
    fn test_valid_id_tags() {
        assert!(FieldKind::Int64.valid_id());
        assert!(FieldKind::Uuid.valid_id());
        assert!(FieldKind::String.valid_id());
        assert!(!FieldKind::Float64.valid_id());
        assert!(!FieldKind::Time.valid_id());
        assert!(!FieldKind::Json.valid_id());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldKind::Int64.to_string(), "int64");
        assert_eq!(FieldKind::Uuid.to_string(), "uuid");
    }
}
