//! Common utilities for Cypher text generation

use crate::graph_catalog::{Direction, RelationMeta};

/// Quote a Cypher identifier (alias, label, relation type).
///
/// Identifiers are always backtick-quoted; embedded backticks are doubled.
///
/// # Examples
/// ```
/// use cyphergen::cypher_generator::common::quote_identifier;
/// assert_eq!(quote_identifier("person"), "`person`");
/// assert_eq!(quote_identifier("odd`name"), "`odd``name`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Property key as written in maps and property reads: bare when it is a
/// plain identifier, quoted otherwise.
///
/// # Examples
/// ```
/// use cyphergen::cypher_generator::common::property_key;
/// assert_eq!(property_key("userId"), "userId");
/// assert_eq!(property_key("first name"), "`first name`");
/// ```
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if plain {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}

/// Property read on an alias: `` `person`.name ``
pub fn property(alias: &str, field: &str) -> String {
    format!("{}.{}", quote_identifier(alias), property_key(field))
}

/// Double-quoted string literal for text that is part of the schema (index
/// names, custom statements), never for user values.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Label list `:`A`:`B``
pub fn label_list<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    labels
        .into_iter()
        .map(|l| format!(":{}", quote_identifier(l)))
        .collect()
}

/// Node pattern `(`alias`:`Label`)`; no labels renders `(`alias`)`
pub fn node_pattern<'a>(alias: &str, labels: impl IntoIterator<Item = &'a str>) -> String {
    format!("({}{})", quote_identifier(alias), label_list(labels))
}

/// Arrow around a relation type as seen from the left-hand node
pub fn relation_arrow(relation: &RelationMeta, variable: Option<&str>) -> String {
    let var = variable.map(quote_identifier).unwrap_or_default();
    let rel = format!("[{}:{}]", var, quote_identifier(&relation.name));
    match relation.direction {
        Direction::Outbound => format!("-{}->", rel),
        Direction::Inbound => format!("<-{}-", rel),
    }
}

/// One hop from a bound parent to a child node:
/// `` (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) ``
pub fn hop_pattern(parent_alias: &str, relation: &RelationMeta, child_alias: &str) -> String {
    format!(
        "{}{}{}",
        node_pattern(parent_alias, std::iter::empty()),
        relation_arrow(relation, None),
        node_pattern(child_alias, [relation.target_type.as_str()])
    )
}
