//! The path-addressed configuration store.
//!
//! [`Store`] owns one root mapping behind a read/write lock. Every public
//! operation holds the lock for its whole duration: a write is never
//! observable half-done, and a merge is applied as one unit with respect to
//! other callers.
//!
//! Values leave the store as copies. [`Store::get`], [`Store::to_mapping`]
//! and [`Store::cut`] all clone, so callers never alias the live tree; use
//! [`Store::with_node`] to inspect a node without copying it.

use crate::error::Result;
use crate::flatten::{FlatIndex, Flattener};
use crate::merge;
use crate::node::{Mapping, Node};
use crate::path::{DEFAULT_DELIMITER, Path};
use crate::source::{self, Parser, Provider};
use crate::tree;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// An in-memory tree of configuration values addressed by delimited paths.
#[derive(Debug)]
pub struct Store {
    root: RwLock<Mapping>,
    delimiter: char,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            root: RwLock::new(self.to_mapping()),
            delimiter: self.delimiter,
        }
    }
}

impl Store {
    /// An empty store using `.` as the path delimiter.
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// An empty store with a custom path delimiter.
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            root: RwLock::new(Mapping::new()),
            delimiter,
        }
    }

    /// A store that takes ownership of `root`.
    pub fn from_mapping(root: Mapping) -> Self {
        Self {
            root: RwLock::new(root),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    // A panic while holding the lock cannot leave the tree half-written
    // (writes validate before mutating), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Mapping> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Mapping> {
        self.root.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse `path` with this store's delimiter.
    pub fn path(&self, path: &str) -> Result<Path> {
        Path::parse_with(path, self.delimiter)
    }

    // Ingestion

    /// Read and parse a document and ingest it at the root.
    ///
    /// Top-level keys that collide with existing ones are overwritten.
    pub fn load(&self, provider: &dyn Provider, parser: &dyn Parser) -> Result<()> {
        let data = source::read_mapping(provider, parser)?;
        debug!(keys = data.len(), "loaded config document");
        self.ingest(data);
        Ok(())
    }

    /// Read and parse a document and write it at `path`.
    ///
    /// Whatever `path` held before is replaced by the document as a whole.
    /// Use [`Store::merge_at`] to combine leaf by leaf instead.
    pub fn load_at(&self, path: &str, provider: &dyn Provider, parser: &dyn Parser) -> Result<()> {
        let base = self.path(path)?;
        let data = source::read_mapping(provider, parser)?;
        debug!(path = %base, keys = data.len(), "loaded config document");
        tree::set(&mut self.write(), &base, Node::Mapping(data))
    }

    /// Insert `data`'s top-level entries at the root, replacing collisions.
    pub fn ingest(&self, data: Mapping) {
        self.write().extend(data);
    }

    // Reads

    pub fn has(&self, path: &str) -> bool {
        self.path(path)
            .map(|path| tree::contains(&self.read(), &path))
            .unwrap_or(false)
    }

    /// A copy of the node at `path`.
    pub fn get(&self, path: &str) -> Result<Node> {
        self.with_node(path, Node::clone)
    }

    /// Run `f` on the node at `path` under the read lock.
    pub fn with_node<R>(&self, path: &str, f: impl FnOnce(&Node) -> R) -> Result<R> {
        let path = self.path(path)?;
        let root = self.read();
        tree::resolve(&root, &path).map(f)
    }

    /// Top-level keys.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Every leaf path, descending into sequences.
    pub fn paths(&self) -> Vec<String> {
        Flattener::new()
            .delimiter(self.delimiter)
            .paths(&self.read())
    }

    /// A flat snapshot of the tree. Goes stale on the next write.
    pub fn flat_index(&self) -> FlatIndex {
        Flattener::new()
            .delimiter(self.delimiter)
            .flatten(&self.read())
    }

    /// A copy of the root mapping.
    pub fn to_mapping(&self) -> Mapping {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Writes

    /// Write `value` at `path`. On error the store is unchanged.
    pub fn set(&self, path: &str, value: impl Into<Node>) -> Result<()> {
        let path = self.path(path)?;
        tree::set(&mut self.write(), &path, value.into())
    }

    /// Remove and return the subtree at `path`.
    pub fn delete(&self, path: &str) -> Result<Node> {
        let path = self.path(path)?;
        tree::delete(&mut self.write(), &path)
    }

    /// Drop every value.
    pub fn clear(&self) {
        self.write().clear();
    }

    // Composition

    /// A new, independent store holding a copy of the mapping at `path`.
    ///
    /// Empty when `path` does not resolve to a mapping. Writes to either
    /// store are not visible in the other.
    pub fn cut(&self, path: &str) -> Store {
        let root = match self.path(path) {
            Ok(path) => merge::cut(&self.read(), &path),
            Err(_) => Mapping::new(),
        };
        Store {
            root: RwLock::new(root),
            delimiter: self.delimiter,
        }
    }

    /// Merge every leaf of `other` into this store.
    ///
    /// Stops at the first failing write, keeping what was already merged.
    pub fn merge(&self, other: &Store) -> Result<()> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        // Snapshot first so the two locks are never held together.
        let source = other.to_mapping();
        self.merge_mapping(&source)
    }

    /// Merge a raw mapping into this store.
    pub fn merge_mapping(&self, source: &Mapping) -> Result<()> {
        merge::merge(&mut self.write(), source, self.delimiter)
    }

    /// Merge every leaf of `other` under `path`.
    pub fn merge_at(&self, path: &str, other: &Store) -> Result<()> {
        let base = self.path(path)?;
        // Snapshot first; `other` may be `self`.
        let source = other.to_mapping();
        merge::merge_at(&mut self.write(), &base, &source)
    }
}

impl From<Mapping> for Store {
    fn from(root: Mapping) -> Self {
        Self::from_mapping(root)
    }
}
