//! Structural decode of a subtree into a serde type.
//!
//! The subtree is rendered to a `serde_json::Value`, reshaped according to
//! [`DecodeOptions`], then handed to `serde_json::from_value`.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::store::Store;
use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Key convention applied to every mapping key before decoding.
///
/// Lets a document written in one convention (say `max-conns`) feed a
/// struct whose serde names use another (`max_conns`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// Keys are passed through unchanged.
    #[default]
    AsIs,
    SnakeCase,
    KebabCase,
    CamelCase,
    PascalCase,
    ScreamingSnakeCase,
}

impl FieldNaming {
    pub fn apply(&self, key: &str) -> String {
        match self {
            FieldNaming::AsIs => key.to_string(),
            FieldNaming::SnakeCase => key.to_snake_case(),
            FieldNaming::KebabCase => key.to_kebab_case(),
            FieldNaming::CamelCase => key.to_lower_camel_case(),
            FieldNaming::PascalCase => key.to_upper_camel_case(),
            FieldNaming::ScreamingSnakeCase => key.to_shouty_snake_case(),
        }
    }

    /// Parse a convention name such as `snake_case` or `kebab-case`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "as_is" | "none" => Some(FieldNaming::AsIs),
            "snake" | "snake_case" => Some(FieldNaming::SnakeCase),
            "kebab" | "kebab_case" => Some(FieldNaming::KebabCase),
            "camel" | "camelcase" | "camel_case" => Some(FieldNaming::CamelCase),
            "pascal" | "pascalcase" | "pascal_case" => Some(FieldNaming::PascalCase),
            "screaming_snake" | "screaming_snake_case" => Some(FieldNaming::ScreamingSnakeCase),
            _ => None,
        }
    }
}

/// Options for [`Store::decode_into`].
///
/// There is no separate tag key to configure. Per-field names come from the
/// target type's serde attributes (`#[serde(rename = "...")]`), and
/// `field_naming` is applied to the tree's keys at runtime before those
/// attributes are matched. For example, `FieldNaming::SnakeCase` lets a
/// plain `max_conns` field read a `MaxConns` key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Key convention applied before decoding.
    pub field_naming: FieldNaming,
    /// Lift the entries of nested mappings into their parent so structs
    /// with `#[serde(flatten)]` members can see them. Keys already present
    /// in the parent win.
    pub squash: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_naming(mut self, naming: FieldNaming) -> Self {
        self.field_naming = naming;
        self
    }

    pub fn squash(mut self, squash: bool) -> Self {
        self.squash = squash;
        self
    }
}

/// Decode a detached node.
pub fn decode_node<T: DeserializeOwned>(node: &Node, options: &DecodeOptions) -> Result<T> {
    let value = serde_json::to_value(node).map_err(Error::Decode)?;
    let value = reshape(value, options);
    serde_json::from_value(value).map_err(Error::Decode)
}

fn reshape(value: Value, options: &DecodeOptions) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                out.insert(options.field_naming.apply(&key), reshape(child, options));
            }
            if options.squash {
                squash(&mut out);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| reshape(v, options)).collect()),
        scalar => scalar,
    }
}

fn squash(map: &mut Map<String, Value>) {
    let lifted: Vec<(String, Value)> = map
        .values()
        .filter_map(Value::as_object)
        .flat_map(|child| child.iter().map(|(k, v)| (k.clone(), v.clone())))
        .collect();
    for (key, value) in lifted {
        map.entry(key).or_insert(value);
    }
}

impl Store {
    /// Decode the subtree at `path` into `target`.
    ///
    /// When `path` does not resolve, `target` is left untouched and `Ok` is
    /// returned. Bad paths and decode failures are errors.
    pub fn decode_into<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &mut T,
        options: &DecodeOptions,
    ) -> Result<()> {
        match self.get(path) {
            Ok(node) => {
                *target = decode_node(&node, options)?;
                Ok(())
            }
            Err(err) if err.is_resolution() => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Decode the subtree at `path`; `NotFound` and friends when it does
    /// not resolve.
    pub fn decode<T: DeserializeOwned>(&self, path: &str, options: &DecodeOptions) -> Result<T> {
        decode_node(&self.get(path)?, options)
    }

    /// Decode the whole tree.
    pub fn decode_root<T: DeserializeOwned>(&self, options: &DecodeOptions) -> Result<T> {
        decode_node(&Node::Mapping(self.to_mapping()), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    fn store(value: serde_json::Value) -> Store {
        match Node::from(value) {
            Node::Mapping(map) => Store::from_mapping(map),
            other => panic!("fixture must be a mapping, got {:?}", other.kind()),
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Database {
        host: String,
        port: u16,
        #[serde(default)]
        max_conns: u32,
    }

    #[test]
    fn test_decode_subtree() {
        let s = store(json!({"db": {"host": "localhost", "port": 5432}}));
        let db: Database = s.decode("db", &DecodeOptions::new()).unwrap();
        assert_eq!(
            db,
            Database {
                host: "localhost".into(),
                port: 5432,
                max_conns: 0
            }
        );
    }

    #[test]
    fn test_decode_into_missing_path_is_noop() {
        let s = store(json!({"other": 1}));
        let mut db = Database {
            host: "keep".into(),
            ..Default::default()
        };
        s.decode_into("db", &mut db, &DecodeOptions::new()).unwrap();
        assert_eq!(db.host, "keep");

        let err = s.decode::<Database>("db", &DecodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(s.decode_into("", &mut db, &DecodeOptions::new()).is_err());
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let s = store(json!({"db": {"host": "h", "port": "not a number"}}));
        let mut db = Database::default();
        let err = s.decode_into("db", &mut db, &DecodeOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_field_naming() {
        let s = store(json!({"db": {"Host": "h", "Port": 1, "max-conns": 10}}));
        let db: Database = s
            .decode("db", &DecodeOptions::new().field_naming(FieldNaming::SnakeCase))
            .unwrap();
        assert_eq!(db.max_conns, 10);
        assert_eq!(db.host, "h");

        assert_eq!(FieldNaming::CamelCase.apply("max_conns"), "maxConns");
        assert_eq!(FieldNaming::ScreamingSnakeCase.apply("maxConns"), "MAX_CONNS");
        assert_eq!(FieldNaming::from_str("kebab-case"), Some(FieldNaming::KebabCase));
        assert_eq!(FieldNaming::from_str("bogus"), None);
    }

    #[test]
    fn test_serde_rename_acts_as_field_tag() {
        #[derive(Debug, Deserialize)]
        struct Pool {
            #[serde(rename = "size_limit")]
            max: u32,
            idle_timeout: u32,
        }
        let s = store(json!({"pool": {"SizeLimit": 8, "IdleTimeout": 30}}));
        let pool: Pool = s
            .decode("pool", &DecodeOptions::new().field_naming(FieldNaming::SnakeCase))
            .unwrap();
        assert_eq!(pool.max, 8);
        assert_eq!(pool.idle_timeout, 30);
    }

    #[derive(Debug, Deserialize)]
    struct Server {
        name: String,
        #[serde(flatten)]
        net: Net,
    }

    #[derive(Debug, Deserialize)]
    struct Net {
        host: String,
        port: u16,
    }

    #[test]
    fn test_squash_lifts_nested_entries() {
        let s = store(json!({"server": {"name": "api", "net": {"host": "0.0.0.0", "port": 80, "name": "ignored"}}}));
        let server: Server = s
            .decode("server", &DecodeOptions::new().squash(true))
            .unwrap();
        assert_eq!(server.name, "api");
        assert_eq!(server.net.host, "0.0.0.0");
        assert_eq!(server.net.port, 80);

        assert!(s.decode::<Server>("server", &DecodeOptions::new()).is_err());
    }

    #[test]
    fn test_decode_duration_node() {
        #[derive(Deserialize)]
        struct Timeouts {
            read: Duration,
        }
        let s = Store::new();
        s.set("t.read", Duration::from_millis(1500)).unwrap();
        let t: Timeouts = s.decode("t", &DecodeOptions::new()).unwrap();
        assert_eq!(t.read, Duration::from_millis(1500));
    }
}
