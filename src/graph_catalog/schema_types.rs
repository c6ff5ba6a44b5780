//! Value types understood by the translator
//!
//! Field types in the schema YAML are plain GraphQL type names. Each one is
//! classified as a primitive scalar, a structured scalar (temporal or spatial
//! value that is stored as one property but exposed as a group of sub-fields),
//! or the name of another object type.
//!
//! # Supported Types
//!
//! - scalars: `ID`, `String`, `Int`, `Float`, `Boolean`
//! - temporal: `Date`, `Time`, `LocalTime`, `DateTime`, `LocalDateTime`
//! - spatial: `Point`
//!
//! Anything else is treated as an object type name and must be bound through a
//! relation or a custom statement.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Primitive scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    #[serde(rename = "ID")]
    Id,
    String,
    Int,
    Float,
    Boolean,
}

impl ScalarType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(ScalarType::Id),
            "String" => Some(ScalarType::String),
            "Int" => Some(ScalarType::Int),
            "Float" => Some(ScalarType::Float),
            "Boolean" => Some(ScalarType::Boolean),
            _ => None,
        }
    }

    /// String operators (`contains`, `regexp`, ...) apply to text-like scalars only
    pub fn is_textual(&self) -> bool {
        matches!(self, ScalarType::Id | ScalarType::String)
    }

    /// Ordering comparisons (`lt`, `gte`, ...) apply to numeric scalars only
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Id => "ID",
            ScalarType::String => "String",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Boolean => "Boolean",
        };
        write!(f, "{}", name)
    }
}

/// Compound scalars represented as a field group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuredKind {
    Date,
    Time,
    LocalTime,
    DateTime,
    LocalDateTime,
    Point,
}

/// Name of the computed text rendering available on temporal values
pub const FORMATTED_FIELD: &str = "formatted";

lazy_static! {
    static ref CONSTITUENTS: HashMap<StructuredKind, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(StructuredKind::Date, vec!["year", "month", "day"]);
        m.insert(
            StructuredKind::Time,
            vec![
                "hour",
                "minute",
                "second",
                "millisecond",
                "microsecond",
                "nanosecond",
                "timezone",
            ],
        );
        m.insert(
            StructuredKind::LocalTime,
            vec![
                "hour",
                "minute",
                "second",
                "millisecond",
                "microsecond",
                "nanosecond",
            ],
        );
        m.insert(
            StructuredKind::DateTime,
            vec![
                "year",
                "month",
                "day",
                "hour",
                "minute",
                "second",
                "millisecond",
                "microsecond",
                "nanosecond",
                "timezone",
            ],
        );
        m.insert(
            StructuredKind::LocalDateTime,
            vec![
                "year",
                "month",
                "day",
                "hour",
                "minute",
                "second",
                "millisecond",
                "microsecond",
                "nanosecond",
            ],
        );
        m.insert(
            StructuredKind::Point,
            vec![
                "x",
                "y",
                "z",
                "longitude",
                "latitude",
                "height",
                "crs",
                "srid",
            ],
        );
        m
    };
}

impl StructuredKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Date" => Some(StructuredKind::Date),
            "Time" => Some(StructuredKind::Time),
            "LocalTime" => Some(StructuredKind::LocalTime),
            "DateTime" => Some(StructuredKind::DateTime),
            "LocalDateTime" => Some(StructuredKind::LocalDateTime),
            "Point" => Some(StructuredKind::Point),
            _ => None,
        }
    }

    /// Declared constituent sub-fields, in projection order
    pub fn constituents(&self) -> &'static [&'static str] {
        CONSTITUENTS.get(self).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_temporal(&self) -> bool {
        !matches!(self, StructuredKind::Point)
    }

    /// Whether `name` is a selectable sub-field of this kind
    pub fn has_sub_field(&self, name: &str) -> bool {
        (self.is_temporal() && name == FORMATTED_FIELD) || self.constituents().contains(&name)
    }

    /// Cypher function that builds a value of this kind from a map or string
    pub fn constructor(&self) -> &'static str {
        match self {
            StructuredKind::Date => "date",
            StructuredKind::Time => "time",
            StructuredKind::LocalTime => "localtime",
            StructuredKind::DateTime => "datetime",
            StructuredKind::LocalDateTime => "localdatetime",
            StructuredKind::Point => "point",
        }
    }
}

impl fmt::Display for StructuredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Classification of a declared field type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarType),
    Structured(StructuredKind),
    Object(String),
}

impl TypeRef {
    pub fn classify(name: &str) -> Self {
        if let Some(scalar) = ScalarType::parse(name) {
            TypeRef::Scalar(scalar)
        } else if let Some(kind) = StructuredKind::parse(name) {
            TypeRef::Structured(kind)
        } else {
            TypeRef::Object(name.to_string())
        }
    }
}
