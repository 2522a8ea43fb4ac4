//! Stock parsers: JSON, YAML and flat `key=value` text.

use super::Parser;
use crate::error::{Error, Result};
use crate::node::{Mapping, Node};
use crate::path::{DEFAULT_DELIMITER, Path};
use crate::tree;
use tracing::warn;

fn into_root(node: Node, format: &str) -> Result<Mapping> {
    match node {
        Node::Mapping(map) => Ok(map),
        other => Err(Error::parse(format!(
            "{format} document root must be a mapping, found {}",
            other.kind()
        ))),
    }
}

/// JSON documents via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn unmarshal(&self, data: &[u8]) -> Result<Mapping> {
        let value: serde_json::Value = serde_json::from_slice(data).map_err(Error::parse)?;
        into_root(Node::from(value), "JSON")
    }
}

/// YAML documents via `serde_yaml`. An empty document is an empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl Parser for YamlParser {
    fn unmarshal(&self, data: &[u8]) -> Result<Mapping> {
        let value: serde_yaml::Value = serde_yaml::from_slice(data).map_err(Error::parse)?;
        match value {
            serde_yaml::Value::Null => Ok(Mapping::new()),
            value => into_root(Node::from(value), "YAML"),
        }
    }
}

/// Flat `path=value` pairs, unflattened into a tree.
///
/// Pairs are separated by `pair_separator` (newline by default). Blank
/// entries and entries starting with `#` are skipped. Values stay strings
/// unless `typed_values` is set, in which case each is read as YAML.
///
/// Entries are written deepest path first, ties broken by key, so the
/// result does not depend on input order: given `db=x` and `db.port=1`,
/// the shallower `db=x` always wins. Repeated keys keep the last value.
/// An entry that cannot be written (an empty segment, or a key that needs
/// a sequence where another entry made a mapping) fails the parse, or is
/// logged and dropped when `skip_invalid` is set.
#[derive(Debug, Clone, Copy)]
pub struct KeyValueParser {
    pair_separator: char,
    delimiter: char,
    typed_values: bool,
    skip_invalid: bool,
}

impl Default for KeyValueParser {
    fn default() -> Self {
        Self {
            pair_separator: '\n',
            delimiter: DEFAULT_DELIMITER,
            typed_values: false,
            skip_invalid: false,
        }
    }
}

impl KeyValueParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair_separator(mut self, separator: char) -> Self {
        self.pair_separator = separator;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read values as YAML scalars, so `port=8080` yields an integer.
    pub fn typed_values(mut self, typed: bool) -> Self {
        self.typed_values = typed;
        self
    }

    /// Drop entries that cannot be written instead of failing the parse.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    fn depth(&self, key: &str) -> usize {
        key.matches(self.delimiter).count()
    }
}

impl Parser for KeyValueParser {
    fn unmarshal(&self, data: &[u8]) -> Result<Mapping> {
        let text = std::str::from_utf8(data).map_err(Error::parse)?;
        let mut entries = Vec::new();
        for (n, pair) in text.split(self.pair_separator).enumerate() {
            let pair = pair.trim();
            if pair.is_empty() || pair.starts_with('#') {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                return Err(Error::parse(format!("entry {}: expected key=value, got '{pair}'", n + 1)));
            };
            let value = value.trim();
            let value = if self.typed_values {
                Node::parse_yaml(value)
            } else {
                Node::from(value)
            };
            entries.push((key.trim().to_string(), value));
        }
        entries.sort_by(|(a, _), (b, _)| {
            self.depth(b).cmp(&self.depth(a)).then_with(|| a.cmp(b))
        });

        let mut root = Mapping::new();
        for (key, value) in entries {
            let written = Path::parse_with(&key, self.delimiter)
                .and_then(|path| tree::set(&mut root, &path, value));
            if let Err(err) = written {
                if self.skip_invalid {
                    warn!(%key, error = %err, "skipping invalid entry");
                    continue;
                }
                return Err(Error::parse(format!("entry '{key}': {err}")));
            }
        }
        Ok(root)
    }
}
