//! Scalar and index type vocabulary shared with the remote store.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Scalar Types
// ============================================================================

/// Scalar types a vertex field may declare.
///
/// These are the remote store's property types; the validator works on the
/// coarser [`ValueKind`] buckets derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Decimal,
    Float,
    Integer,
    Double,
    Short,
    Date,
    Datetime,
    String,
    Boolean,
}

impl ScalarType {
    /// Parse a declared type tag. `None` for anything outside the supported
    /// set; callers turn that into a schema construction error.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "decimal" => Some(Self::Decimal),
            "float" => Some(Self::Float),
            "integer" => Some(Self::Integer),
            "double" => Some(Self::Double),
            "short" => Some(Self::Short),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Short => "short",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// The validator bucket this scalar type maps onto.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Decimal | Self::Float | Self::Integer | Self::Double | Self::Short => {
                ValueKind::Number
            }
            Self::Date | Self::Datetime => ValueKind::Date,
            Self::String => ValueKind::String,
            Self::Boolean => ValueKind::Boolean,
        }
    }

    /// The coercion applied to raw values before validation, if any.
    pub fn coercion(&self) -> Option<Coercion> {
        match self {
            Self::Decimal | Self::Float | Self::Double => Some(Coercion::ToFloat),
            Self::Integer | Self::Short => Some(Coercion::ToInteger),
            Self::Date | Self::Datetime => Some(Coercion::ToDate),
            Self::String | Self::Boolean => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Validator Buckets & Coercions
// ============================================================================

/// Coarse type buckets the validator checks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Date,
    String,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Date => "date",
            Self::String => "string",
            Self::Boolean => "boolean",
        })
    }
}

/// In-place conversions run on raw record values before the kind check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// `"3.14"` → number
    ToFloat,
    /// `"42"` → number
    ToInteger,
    /// `"2024-05-01"` → canonical RFC 3339 string
    ToDate,
}

// ============================================================================
// Index Types
// ============================================================================

/// Index kinds the remote store supports on a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexType {
    Unique,
    NotUnique,
    FullText,
    Dictionary,
}

impl IndexType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "UNIQUE" => Some(Self::Unique),
            "NOTUNIQUE" => Some(Self::NotUnique),
            "FULLTEXT" => Some(Self::FullText),
            "DICTIONARY" => Some(Self::Dictionary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "UNIQUE",
            Self::NotUnique => "NOTUNIQUE",
            Self::FullText => "FULLTEXT",
            Self::Dictionary => "DICTIONARY",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
