//! pathconf: a hierarchical configuration store addressed by delimited paths.
//!
//! A [`Store`] owns a tree of mappings, sequences and scalars. Paths such as
//! `database.hosts.0.port` walk mapping keys and sequence indices from the
//! root. Reads come in two families: [`Store::get`] and friends report
//! failures as [`Error`], while the typed accessors ([`Store::int`],
//! [`Store::string_or`], ...) silently fall back to a default.
//!
//! ```rust
//! use pathconf::Store;
//!
//! let store = Store::new();
//! store.set("database.hosts.1.port", 5433)?;
//! assert_eq!(store.int("database.hosts.1.port"), 5433);
//! assert!(store.has("database.hosts.0"));
//! assert_eq!(store.string_or("database.name", "app"), "app");
//! # Ok::<(), pathconf::Error>(())
//! ```

pub mod cli;
pub mod decode;
pub mod error;
pub mod flatten;
pub mod format;
pub mod layers;
pub mod logging;
pub mod merge;
pub mod node;
pub mod path;
pub mod registry;
pub mod source;
pub mod store;
pub mod tree;
pub mod typed;

pub use decode::{DecodeOptions, FieldNaming};
pub use error::{Error, ErrorCode, Result};
pub use flatten::{FlatIndex, Flattener};
pub use node::{Mapping, Node, NodeKind};
pub use path::Path;
pub use registry::Registry;
pub use store::Store;
pub use typed::FromNode;
