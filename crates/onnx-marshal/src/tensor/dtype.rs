//! Enumerates the element kinds a script can ask the runtime to build tensors of.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarshalError;

/// Element kind of a tensor handed to the inference runtime.
///
/// `Unknown` mirrors the runtime's sentinel: it can be named by a script but has no
/// construction rule, so the builder rejects it before allocating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// 32-bit IEEE-754 float (`FLOAT`).
    Float32,
    /// 64-bit IEEE-754 float (`DOUBLE`).
    Float64,
    /// Unsigned byte (`UINT8`).
    UInt8,
    /// Signed byte (`INT8`).
    Int8,
    /// 16-bit signed integer (`INT16`).
    Int16,
    /// 32-bit signed integer (`INT32`).
    Int32,
    /// 64-bit signed integer (`INT64`).
    Int64,
    /// Boolean stored as one byte per element (`BOOL`).
    Bool,
    /// Variable-width UTF-8 string (`STRING`).
    String,
    /// Reserved sentinel (`UNKNOWN`).
    Unknown,
}

impl ElementType {
    pub const SUPPORTED: [ElementType; 9] = [
        ElementType::Float32,
        ElementType::Float64,
        ElementType::UInt8,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Bool,
        ElementType::String,
    ];

    /// Returns the number of bytes per element, or `None` for variable-width kinds.
    pub fn size_in_bytes(self) -> Option<usize> {
        match self {
            ElementType::Float32 => Some(4),
            ElementType::Float64 => Some(8),
            ElementType::UInt8 | ElementType::Int8 | ElementType::Bool => Some(1),
            ElementType::Int16 => Some(2),
            ElementType::Int32 => Some(4),
            ElementType::Int64 => Some(8),
            ElementType::String | ElementType::Unknown => None,
        }
    }

    /// Runtime-facing tag, as scripts spell it.
    pub fn tag(self) -> &'static str {
        match self {
            ElementType::Float32 => "FLOAT",
            ElementType::Float64 => "DOUBLE",
            ElementType::UInt8 => "UINT8",
            ElementType::Int8 => "INT8",
            ElementType::Int16 => "INT16",
            ElementType::Int32 => "INT32",
            ElementType::Int64 => "INT64",
            ElementType::Bool => "BOOL",
            ElementType::String => "STRING",
            ElementType::Unknown => "UNKNOWN",
        }
    }

    fn variant_name(self) -> &'static str {
        match self {
            ElementType::Float32 => "Float32",
            ElementType::Float64 => "Float64",
            ElementType::UInt8 => "UInt8",
            ElementType::Int8 => "Int8",
            ElementType::Int16 => "Int16",
            ElementType::Int32 => "Int32",
            ElementType::Int64 => "Int64",
            ElementType::Bool => "Bool",
            ElementType::String => "String",
            ElementType::Unknown => "Unknown",
        }
    }

    /// Resolves a type name by exact, case-sensitive match against either the runtime
    /// tag (`FLOAT`) or the variant name (`Float32`).
    pub fn from_tag(name: &str) -> Option<Self> {
        Self::SUPPORTED
            .iter()
            .copied()
            .chain(std::iter::once(ElementType::Unknown))
            .find(|ty| ty.tag() == name || ty.variant_name() == name)
    }

    /// Space separated list of the runtime tags, used in diagnostics.
    pub fn tag_list() -> &'static str {
        "FLOAT DOUBLE UINT8 INT8 INT16 INT32 INT64 BOOL STRING UNKNOWN"
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ElementType {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| MarshalError::InvalidTypeTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_for_every_kind() {
        for ty in ElementType::SUPPORTED {
            assert_eq!(ElementType::from_tag(ty.tag()), Some(ty));
            assert_eq!(ElementType::from_tag(ty.variant_name()), Some(ty));
        }
        assert_eq!(ElementType::from_tag("UNKNOWN"), Some(ElementType::Unknown));
    }

    #[test]
    fn tag_lookup_is_case_sensitive() {
        assert_eq!(ElementType::from_tag("float"), None);
        assert_eq!(ElementType::from_tag("int64"), None);
        let err = "Float16".parse::<ElementType>().expect_err("unknown tag must fail");
        assert_eq!(err, MarshalError::InvalidTypeTag("Float16".to_string()));
    }

    #[test]
    fn widths_match_native_types() {
        assert_eq!(ElementType::Float32.size_in_bytes(), Some(4));
        assert_eq!(ElementType::Int16.size_in_bytes(), Some(2));
        assert_eq!(ElementType::Bool.size_in_bytes(), Some(1));
        assert_eq!(ElementType::String.size_in_bytes(), None);
    }
}
