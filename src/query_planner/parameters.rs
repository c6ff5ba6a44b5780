//! Parameter map produced alongside every statement.
//!
//! Every value that came from the query issuer lives here and is referenced
//! from the statement text as `$name`; no literal is ever spliced into the
//! text. Names are path-qualified (see `utils::alias_naming::ParamPath`) and
//! insertion order is preserved, so repeated translations serialize
//! identically.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::graph_catalog::ScalarType;

use super::errors::TranslationError;

/// Reference to a hoisted value, rendered as `$name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef(String);

impl ParamRef {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap(Map<String, Value>);

impl ParameterMap {
    pub fn new() -> Self {
        ParameterMap(Map::new())
    }

    /// Hoist `value` under `name`. Names are derived from unique query paths,
    /// so a second producer for the same name is a translator defect.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<ParamRef, TranslationError> {
        let name = name.into();
        if self.0.contains_key(&name) {
            return Err(TranslationError::ParameterCollision(name));
        }
        log::trace!("hoisting parameter ${}", name);
        self.0.insert(name.clone(), value);
        Ok(ParamRef(name))
    }

    /// Reference a parameter shared by several statement parts (for example
    /// `cypherParams`), inserting `default` the first time.
    pub fn share(&mut self, name: &str, default: impl FnOnce() -> Value) -> ParamRef {
        if !self.0.contains_key(name) {
            self.0.insert(name.to_string(), default());
        }
        ParamRef(name.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Normalise a raw argument value for a scalar field: `ID` values are
/// always strings, whatever the front-end parsed them as.
pub fn normalize_scalar(value: &Value, scalar: ScalarType) -> Value {
    match (scalar, value) {
        (ScalarType::Id, Value::Number(n)) => Value::String(n.to_string()),
        (ScalarType::Id, Value::Bool(b)) => Value::String(b.to_string()),
        (_, Value::Array(items)) => {
            Value::Array(items.iter().map(|v| normalize_scalar(v, scalar)).collect())
        }
        _ => value.clone(),
    }
}
