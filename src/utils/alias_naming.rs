//! Centralized alias and parameter naming.
//!
//! **CRITICAL**: every node alias and every parameter name in an emitted
//! statement MUST come from these functions. Output stability across repeated
//! translations of the same query shape depends on it, and so does the
//! guarantee that one relationship path maps to exactly one alias.
//!
//! ## Naming Convention
//! - Root alias: type name with its first character lower-cased
//!   (`Person` → `person`).
//! - Step alias: `{parent_alias}_{key}`, where `key` is the field name for
//!   filter and group-by hops and the response key for selected fields
//!   (`person` + `movies` → `person_movies`). Every alias is claimed from the
//!   statement's [`AliasRegistry`]; a name already bound anywhere in the
//!   statement gets a `_2`, `_3`, ... suffix.
//! - Parameter names: path segments joined with `_`, prefixed with the
//!   claimed alias of the nested selection that produced them (empty prefix
//!   at the root).
//!
//! Examples:
//! - `root_alias("Equipment")` → `"equipment"`
//! - `child_alias("equipment_facilities", "company")` → `"equipment_facilities_company"`
//! - `ParamPath::root().child("filter").child("name")` → `"filter_name"`

use std::collections::HashSet;

/// Alias of the root node of a statement.
///
/// # Examples
/// ```
/// use cyphergen::utils::alias_naming::root_alias;
///
/// assert_eq!(root_alias("Person"), "person");
/// assert_eq!(root_alias("URLRecord"), "uRLRecord");
/// assert_eq!(root_alias(""), "");
/// ```
pub fn root_alias(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Alias of a node reached from `parent` through `key`.
///
/// # Examples
/// ```
/// use cyphergen::utils::alias_naming::child_alias;
///
/// assert_eq!(child_alias("genre", "movies"), "genre_movies");
/// ```
pub fn child_alias(parent: &str, key: &str) -> String {
    format!("{}_{}", parent, key)
}

/// Alias of a node read by a nested mutation input (`index` within a list input)
pub fn indexed_alias(parent: &str, key: &str, index: usize) -> String {
    format!("{}_{}_{}", parent, key, index)
}

/// Path-qualified parameter name builder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamPath {
    segments: Vec<String>,
}

impl ParamPath {
    /// Path with no prefix (top-level statement)
    pub fn root() -> Self {
        ParamPath::default()
    }

    /// Path scoped to a nested selection whose node alias is `alias`
    pub fn scoped(alias: &str) -> Self {
        ParamPath {
            segments: vec![alias.to_string()],
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        ParamPath { segments }
    }

    pub fn indexed(&self, segment: &str, index: usize) -> Self {
        self.child(format!("{}_{}", segment, index))
    }

    /// Parameter name for this path.
    ///
    /// # Examples
    /// ```
    /// use cyphergen::utils::alias_naming::ParamPath;
    ///
    /// assert_eq!(ParamPath::root().child("first").name(), "first");
    /// assert_eq!(ParamPath::scoped("person_movies").child("first").name(), "person_movies_first");
    /// assert_eq!(ParamPath::root().child("filter").indexed("OR", 1).child("name").name(), "filter_OR_1_name");
    /// ```
    pub fn name(&self) -> String {
        self.segments.join("_")
    }
}

/// Aliases bound anywhere in one statement.
///
/// Nested selections are planned one level at a time but render into the
/// same statement text, so every level claims from one registry.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    taken: HashSet<String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        AliasRegistry::default()
    }

    /// Bind `base`, or the first free `base_2`, `base_3`, ...
    ///
    /// # Examples
    /// ```
    /// use cyphergen::utils::alias_naming::AliasRegistry;
    ///
    /// let mut aliases = AliasRegistry::new();
    /// assert_eq!(aliases.claim("person_movies"), "person_movies");
    /// assert_eq!(aliases.claim("person_movies"), "person_movies_2");
    /// ```
    pub fn claim(&mut self, base: &str) -> String {
        let mut alias = base.to_string();
        let mut n = 2;
        while self.taken.contains(&alias) {
            alias = format!("{}_{}", base, n);
            n += 1;
        }
        self.taken.insert(alias.clone());
        alias
    }

    /// Mark an alias as bound without renaming it (statement roots)
    pub fn reserve(&mut self, alias: &str) {
        self.taken.insert(alias.to_string());
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.taken.contains(alias)
    }
}
