//! The configuration tree's value type.
//!
//! A [`Node`] is a tagged union of scalars, mappings and sequences. Every
//! traversal in the crate matches on the tag; there is no dynamic type
//! probing.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A string-keyed set of child nodes.
///
/// Ordering carries no meaning; a `BTreeMap` keeps enumeration deterministic.
pub type Mapping = BTreeMap<String, Node>;

/// One value in the configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Duration(Duration),
    Time(DateTime<Utc>),
    Mapping(Mapping),
    Sequence(Vec<Node>),
}

/// The tag of a [`Node`], inspectable before traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Duration,
    Time,
    Mapping,
    Sequence,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "boolean",
            NodeKind::Int => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Bytes => "bytes",
            NodeKind::Duration => "duration",
            NodeKind::Time => "time",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
        }
    }

    /// True for mappings and sequences.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Mapping | NodeKind::Sequence)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    /// An empty mapping node.
    pub fn mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    /// An empty sequence node.
    pub fn sequence() -> Self {
        Node::Sequence(Vec::new())
    }

    /// A byte-string scalar.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Node::Bytes(data.into())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Int(_) => NodeKind::Int,
            Node::Float(_) => NodeKind::Float,
            Node::String(_) => NodeKind::String,
            Node::Bytes(_) => NodeKind::Bytes,
            Node::Duration(_) => NodeKind::Duration,
            Node::Time(_) => NodeKind::Time,
            Node::Mapping(_) => NodeKind::Mapping,
            Node::Sequence(_) => NodeKind::Sequence,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_container()
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Read `text` as a YAML scalar or flow collection (`8080`, `true`,
    /// `[a, b]`). Blank or unparsable text stays a plain string.
    pub fn parse_yaml(text: &str) -> Node {
        if text.trim().is_empty() {
            return Node::String(text.to_string());
        }
        match serde_yaml::from_str::<serde_yaml::Value>(text) {
            Ok(value) => Node::from(value),
            Err(_) => Node::String(text.to_string()),
        }
    }
}

// Serialization
//
// Durations and times reuse the serde representations of `std::time::Duration`
// and `chrono::DateTime`, so a decoded struct field of either type round-trips.

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::Int(v) => serializer.serialize_i64(*v),
            Node::Float(v) => serializer.serialize_f64(*v),
            Node::String(v) => serializer.serialize_str(v),
            Node::Bytes(data) => {
                let mut seq = serializer.serialize_seq(Some(data.len()))?;
                for byte in data {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Node::Duration(d) => d.serialize(serializer),
            Node::Time(t) => t.serialize(serializer),
            Node::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// Conversions from format crates

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Node::String(s),
            Value::Sequence(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Mapping(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, value)| (yaml_key(key), Node::from(value)))
                    .collect(),
            ),
            // Tags carry no meaning in the tree; keep the tagged value.
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

/// Render a YAML mapping key as a string key.
fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// Conversions from Rust values

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Int(v.into())
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Node::Int(v.into())
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<Duration> for Node {
    fn from(v: Duration) -> Self {
        Node::Duration(v)
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(v: DateTime<Utc>) -> Self {
        Node::Time(v)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Node>> From<BTreeMap<String, V>> for Node {
    fn from(map: BTreeMap<String, V>) -> Self {
        Node::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Node::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_kinds() {
        let node = Node::from(json!({
            "port": 3306,
            "ratio": 0.5,
            "name": "db",
            "tags": ["a", "b"],
            "tls": null
        }));
        let map = node.as_mapping().unwrap();
        assert_eq!(map["port"], Node::Int(3306));
        assert_eq!(map["ratio"], Node::Float(0.5));
        assert_eq!(map["name"], Node::from("db"));
        assert_eq!(map["tags"].kind(), NodeKind::Sequence);
        assert_eq!(map["tls"], Node::Null);
    }

    #[test]
    fn test_from_yaml_stringifies_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\nname: x\n").unwrap();
        let node = Node::from(yaml);
        let map = node.as_mapping().unwrap();
        assert_eq!(map["1"], Node::from("one"));
        assert_eq!(map["true"], Node::from("yes"));
        assert_eq!(map["name"], Node::from("x"));
    }

    #[test]
    fn test_from_yaml_unwraps_tags() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("value: !custom 42\n").unwrap();
        let node = Node::from(yaml);
        assert_eq!(node.as_mapping().unwrap()["value"], Node::Int(42));
    }

    #[test]
    fn test_serialize_to_json() {
        let mut map = Mapping::new();
        map.insert("bytes".into(), Node::bytes(vec![1u8, 2]));
        map.insert("timeout".into(), Node::Duration(Duration::from_secs(3)));
        map.insert("list".into(), Node::from(vec![1i64, 2]));
        let value = serde_json::to_value(Node::Mapping(map)).unwrap();
        assert_eq!(
            value,
            json!({
                "bytes": [1, 2],
                "timeout": {"secs": 3, "nanos": 0},
                "list": [1, 2]
            })
        );
    }

    #[test]
    fn test_parse_yaml_text() {
        assert_eq!(Node::parse_yaml("8080"), Node::Int(8080));
        assert_eq!(Node::parse_yaml("true"), Node::Bool(true));
        assert_eq!(Node::parse_yaml("[a, b]"), Node::from(vec!["a", "b"]));
        assert_eq!(Node::parse_yaml("localhost"), Node::from("localhost"));
        assert_eq!(Node::parse_yaml(""), Node::from(""));
        assert_eq!(Node::parse_yaml("[oops"), Node::from("[oops"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Node::Int(1).kind().as_str(), "integer");
        assert_eq!(Node::mapping().kind().to_string(), "mapping");
        assert!(Node::sequence().is_container());
        assert!(Node::Null.is_scalar());
    }
}
