//! Soft-typed reads.
//!
//! Every accessor here resolves a path and converts the node only when its
//! tag matches the requested type exactly. A missing path, a bad path or a
//! tag mismatch all produce the default (the type's zero value, or the
//! caller's value for the `_or` variants). Nothing in this module returns an
//! error; use [`Store::get`] when the failure matters.
//!
//! No coercion happens: an `Int` never satisfies [`Store::float`] and a
//! numeric string never satisfies [`Store::int`]. Sequence and mapping reads
//! require every element to match.

use crate::node::{Mapping, Node};
use crate::store::Store;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Exact, non-coercing conversion out of a [`Node`].
pub trait FromNode: Sized {
    /// `None` unless `node` holds exactly this type.
    fn from_node(node: &Node) -> Option<Self>;
}

impl FromNode for i64 {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_i64()
    }
}

impl FromNode for f64 {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_f64()
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_bool()
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_str().map(str::to_string)
    }
}

impl FromNode for Duration {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

impl FromNode for DateTime<Utc> {
    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl FromNode for Node {
    fn from_node(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_sequence()?.iter().map(T::from_node).collect()
    }
}

impl<T: FromNode> FromNode for BTreeMap<String, T> {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_mapping()?
            .iter()
            .map(|(key, value)| Some((key.clone(), T::from_node(value)?)))
            .collect()
    }
}

/// Parse `input` with a chrono format string.
///
/// Tries a full timestamp with offset, then a naive timestamp taken as UTC,
/// then a bare date at midnight UTC. An empty layout means RFC 3339.
pub fn parse_time(input: &str, layout: &str) -> Option<DateTime<Utc>> {
    if layout.is_empty() {
        return DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(input, layout) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(input, layout) {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(input, layout)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

impl Store {
    /// The node at `path` converted to `T`, or `None` on any failure.
    pub fn try_value<T: FromNode>(&self, path: &str) -> Option<T> {
        self.with_node(path, T::from_node).ok().flatten()
    }

    /// The node at `path` as `T`, or `T::default()`.
    pub fn value<T: FromNode + Default>(&self, path: &str) -> T {
        self.try_value(path).unwrap_or_default()
    }

    /// The node at `path` as `T`, or `default`.
    pub fn value_or<T: FromNode>(&self, path: &str, default: T) -> T {
        self.try_value(path).unwrap_or(default)
    }

    // Integers

    pub fn int(&self, path: &str) -> i64 {
        self.value(path)
    }

    pub fn int_or(&self, path: &str, default: i64) -> i64 {
        self.value_or(path, default)
    }

    pub fn ints(&self, path: &str) -> Vec<i64> {
        self.value(path)
    }

    pub fn ints_or(&self, path: &str, default: Vec<i64>) -> Vec<i64> {
        self.value_or(path, default)
    }

    pub fn int_map(&self, path: &str) -> BTreeMap<String, i64> {
        self.value(path)
    }

    pub fn int_map_or(&self, path: &str, default: BTreeMap<String, i64>) -> BTreeMap<String, i64> {
        self.value_or(path, default)
    }

    // Floats

    pub fn float(&self, path: &str) -> f64 {
        self.value(path)
    }

    pub fn float_or(&self, path: &str, default: f64) -> f64 {
        self.value_or(path, default)
    }

    pub fn floats(&self, path: &str) -> Vec<f64> {
        self.value(path)
    }

    pub fn floats_or(&self, path: &str, default: Vec<f64>) -> Vec<f64> {
        self.value_or(path, default)
    }

    pub fn float_map(&self, path: &str) -> BTreeMap<String, f64> {
        self.value(path)
    }

    pub fn float_map_or(&self, path: &str, default: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        self.value_or(path, default)
    }

    // Strings

    pub fn string(&self, path: &str) -> String {
        self.value(path)
    }

    pub fn string_or(&self, path: &str, default: impl Into<String>) -> String {
        self.try_value(path).unwrap_or_else(|| default.into())
    }

    pub fn strings(&self, path: &str) -> Vec<String> {
        self.value(path)
    }

    pub fn strings_or(&self, path: &str, default: Vec<String>) -> Vec<String> {
        self.value_or(path, default)
    }

    pub fn string_map(&self, path: &str) -> BTreeMap<String, String> {
        self.value(path)
    }

    pub fn string_map_or(
        &self,
        path: &str,
        default: BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        self.value_or(path, default)
    }

    /// A mapping whose every value is a sequence of strings.
    pub fn strings_map(&self, path: &str) -> BTreeMap<String, Vec<String>> {
        self.value(path)
    }

    pub fn strings_map_or(
        &self,
        path: &str,
        default: BTreeMap<String, Vec<String>>,
    ) -> BTreeMap<String, Vec<String>> {
        self.value_or(path, default)
    }

    // Booleans

    pub fn bool(&self, path: &str) -> bool {
        self.value(path)
    }

    pub fn bool_or(&self, path: &str, default: bool) -> bool {
        self.value_or(path, default)
    }

    pub fn bools(&self, path: &str) -> Vec<bool> {
        self.value(path)
    }

    pub fn bools_or(&self, path: &str, default: Vec<bool>) -> Vec<bool> {
        self.value_or(path, default)
    }

    pub fn bool_map(&self, path: &str) -> BTreeMap<String, bool> {
        self.value(path)
    }

    pub fn bool_map_or(&self, path: &str, default: BTreeMap<String, bool>) -> BTreeMap<String, bool> {
        self.value_or(path, default)
    }

    // Bytes, durations and times

    /// Only a `Bytes` node qualifies; strings are not converted.
    pub fn bytes(&self, path: &str) -> Vec<u8> {
        self.bytes_or(path, Vec::new())
    }

    pub fn bytes_or(&self, path: &str, default: Vec<u8>) -> Vec<u8> {
        self.with_node(path, |node| match node {
            Node::Bytes(data) => Some(data.clone()),
            _ => None,
        })
        .ok()
        .flatten()
        .unwrap_or(default)
    }

    pub fn duration(&self, path: &str) -> Duration {
        self.value(path)
    }

    pub fn duration_or(&self, path: &str, default: Duration) -> Duration {
        self.value_or(path, default)
    }

    /// A `Time` node, or a `String` node parsed with `layout` (see
    /// [`parse_time`]). Falls back to the Unix epoch.
    pub fn time(&self, path: &str, layout: &str) -> DateTime<Utc> {
        self.time_or(path, layout, DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn time_or(&self, path: &str, layout: &str, default: DateTime<Utc>) -> DateTime<Utc> {
        self.with_node(path, |node| match node {
            Node::Time(t) => Some(*t),
            Node::String(s) => parse_time(s, layout),
            _ => None,
        })
        .ok()
        .flatten()
        .unwrap_or(default)
    }

    // Untyped

    /// The node at `path`, or `Null`.
    pub fn any(&self, path: &str) -> Node {
        self.value(path)
    }

    pub fn any_or(&self, path: &str, default: Node) -> Node {
        self.value_or(path, default)
    }

    pub fn anys(&self, path: &str) -> Vec<Node> {
        self.value(path)
    }

    pub fn anys_or(&self, path: &str, default: Vec<Node>) -> Vec<Node> {
        self.value_or(path, default)
    }

    pub fn any_map(&self, path: &str) -> Mapping {
        self.value(path)
    }

    pub fn any_map_or(&self, path: &str, default: Mapping) -> Mapping {
        self.value_or(path, default)
    }
}
