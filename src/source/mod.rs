//! Data sources for ingestion.
//!
//! A load pairs a [`Provider`], which produces raw bytes, with a [`Parser`],
//! which turns them into a [`Mapping`]. Both are narrow traits; any closure
//! with the right signature implements them.
//!
//! ```rust
//! use pathconf::Store;
//! use pathconf::source::{BytesProvider, YamlParser};
//!
//! let store = Store::new();
//! store.load(&BytesProvider::from_static("db:\n  port: 5432\n"), &YamlParser)?;
//! assert_eq!(store.int("db.port"), 5432);
//! # Ok::<(), pathconf::Error>(())
//! ```

mod parser;
mod provider;

pub use parser::{JsonParser, KeyValueParser, YamlParser};
pub use provider::{BytesProvider, EnvProvider, FileProvider};

use crate::error::Result;
use crate::node::Mapping;
use std::path::Path;

/// Produces the raw bytes of a configuration document.
pub trait Provider {
    fn read(&self) -> Result<Vec<u8>>;
}

impl<F> Provider for F
where
    F: Fn() -> std::io::Result<Vec<u8>>,
{
    fn read(&self) -> Result<Vec<u8>> {
        Ok(self()?)
    }
}

/// Decodes raw bytes into a root mapping.
pub trait Parser {
    fn unmarshal(&self, data: &[u8]) -> Result<Mapping>;
}

impl<F> Parser for F
where
    F: Fn(&[u8]) -> Result<Mapping>,
{
    fn unmarshal(&self, data: &[u8]) -> Result<Mapping> {
        self(data)
    }
}

/// Pick a parser from a file extension.
///
/// `json` -> JSON, `yaml`/`yml` -> YAML, `env`/`properties` -> key=value.
pub fn parser_for_path(path: &Path) -> Option<Box<dyn Parser + Send + Sync>> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Box::new(JsonParser)),
        "yaml" | "yml" => Some(Box::new(YamlParser)),
        "env" | "properties" => Some(Box::new(KeyValueParser::default())),
        _ => None,
    }
}

/// Read and parse in one step.
pub fn read_mapping(provider: &dyn Provider, parser: &dyn Parser) -> Result<Mapping> {
    let data = provider.read()?;
    parser.unmarshal(&data)
}
