//! A set of named stores addressed through one path space.
//!
//! The first path segment picks the store and the rest is resolved inside
//! it, so `db.primary.host` reads `primary.host` from the store named `db`.

use crate::decode::{DecodeOptions, decode_node};
use crate::error::{Error, Result};
use crate::node::{Mapping, Node};
use crate::path::{DEFAULT_DELIMITER, Path};
use crate::store::Store;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Named stores sharing one path namespace.
#[derive(Debug)]
pub struct Registry {
    stores: RwLock<BTreeMap<String, Arc<Store>>>,
    delimiter: char,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry path split into store name and in-store remainder.
struct Target {
    name: String,
    rest: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// Stores created implicitly by [`Registry::set`] use `delimiter` too.
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            stores: RwLock::new(BTreeMap::new()),
            delimiter,
        }
    }

    fn split(&self, path: &str) -> Result<Target> {
        let path = Path::parse_with(path, self.delimiter)?;
        let (name, rest) = path.segments().split_first().ok_or(Error::EmptyPath)?;
        let rest = (!rest.is_empty()).then(|| rest.join(&self.delimiter.to_string()));
        Ok(Target {
            name: name.clone(),
            rest,
        })
    }

    /// Register `store` under `name`, returning the one it replaces.
    pub fn insert(&self, name: impl Into<String>, store: Arc<Store>) -> Option<Arc<Store>> {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), store)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Store>> {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn store(&self, name: &str) -> Option<Arc<Store>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Store names in order.
    pub fn names(&self) -> Vec<String> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn required(&self, name: &str) -> Result<Arc<Store>> {
        self.store(name).ok_or_else(|| Error::not_found(name))
    }

    pub fn has(&self, path: &str) -> bool {
        let Ok(target) = self.split(path) else {
            return false;
        };
        match (self.store(&target.name), target.rest) {
            (Some(_), None) => true,
            (Some(store), Some(rest)) => store.has(&rest),
            (None, _) => false,
        }
    }

    /// A bare store name yields a copy of that store's whole root.
    pub fn get(&self, path: &str) -> Result<Node> {
        let target = self.split(path)?;
        let store = self.required(&target.name)?;
        match target.rest {
            None => Ok(Node::Mapping(store.to_mapping())),
            Some(rest) => store.get(&rest),
        }
    }

    /// Write into the named store, creating it when unknown.
    ///
    /// A bare store name replaces that store with the given mapping; any
    /// other value is a `ConflictingType`.
    pub fn set(&self, path: &str, value: impl Into<Node>) -> Result<()> {
        let target = self.split(path)?;
        let value = value.into();
        let Some(rest) = target.rest else {
            return match value {
                Node::Mapping(map) => {
                    let store = Store::with_delimiter(self.delimiter);
                    store.ingest(map);
                    self.insert(target.name, Arc::new(store));
                    Ok(())
                }
                other => Err(Error::conflicting(target.name, other.kind().as_str(), "mapping")),
            };
        };

        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(&target.name) {
            return store.set(&rest, value);
        }
        let store = Store::with_delimiter(self.delimiter);
        store.set(&rest, value)?;
        stores.insert(target.name, Arc::new(store));
        Ok(())
    }

    /// Every store's root, keyed by store name.
    pub fn all(&self) -> Mapping {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, store)| (name.clone(), Node::Mapping(store.to_mapping())))
            .collect()
    }

    /// Decode the combined view of every store.
    pub fn decode<T: DeserializeOwned>(&self, options: &DecodeOptions) -> Result<T> {
        decode_node(&Node::Mapping(self.all()), options)
    }

    /// Decode the subtree at `path` into `target`; a no-op when the store
    /// or the path inside it is missing.
    pub fn decode_into<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &mut T,
        options: &DecodeOptions,
    ) -> Result<()> {
        let split = self.split(path)?;
        let Some(store) = self.store(&split.name) else {
            return Ok(());
        };
        match split.rest {
            None => {
                *target = store.decode_root(options)?;
                Ok(())
            }
            Some(rest) => store.decode_into(&rest, target, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn store(value: serde_json::Value) -> Arc<Store> {
        match Node::from(value) {
            Node::Mapping(map) => Arc::new(Store::from_mapping(map)),
            other => panic!("fixture must be a mapping, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_first_segment_selects_store() {
        let registry = Registry::new();
        registry.insert("db", store(json!({"host": "h", "port": 5432})));

        assert!(registry.has("db"));
        assert!(registry.has("db.port"));
        assert!(!registry.has("db.missing"));
        assert!(!registry.has("cache"));
        assert_eq!(registry.get("db.port").unwrap(), Node::Int(5432));
        assert_eq!(registry.get("db").unwrap(), Node::from(json!({"host": "h", "port": 5432})));
    }

    #[test]
    fn test_missing_store_is_not_found() {
        let registry = Registry::new();
        match registry.get("cache.ttl") {
            Err(Error::NotFound { path }) => assert_eq!(path, "cache"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_set_creates_store() {
        let registry = Registry::new();
        registry.set("cache.ttl", 30i64).unwrap();
        registry.set("cache.size", 10i64).unwrap();
        assert_eq!(registry.names(), vec!["cache"]);
        assert_eq!(registry.store("cache").unwrap().int("ttl"), 30);
        assert_eq!(registry.get("cache.size").unwrap(), Node::Int(10));
    }

    #[test]
    fn test_set_bare_name_replaces_store() {
        let registry = Registry::new();
        registry.insert("db", store(json!({"old": true})));
        registry
            .set("db", Node::from(json!({"host": "new"})))
            .unwrap();
        assert!(!registry.has("db.old"));
        assert!(matches!(
            registry.set("db", 1i64),
            Err(Error::ConflictingType { .. })
        ));
    }

    #[test]
    fn test_stores_are_shared() {
        let registry = Registry::new();
        let db = store(json!({}));
        registry.insert("db", Arc::clone(&db));
        registry.set("db.port", 1i64).unwrap();
        assert_eq!(db.int("port"), 1);
    }

    #[derive(Debug, Default, Deserialize)]
    struct App {
        db: Db,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Db {
        port: u16,
    }

    #[test]
    fn test_all_and_decode() {
        let registry = Registry::new();
        registry.insert("db", store(json!({"port": 5432})));
        let all = registry.all();
        assert_eq!(all["db"], Node::from(json!({"port": 5432})));

        let app: App = registry.decode(&DecodeOptions::new()).unwrap();
        assert_eq!(app.db.port, 5432);

        let mut db = Db::default();
        registry.decode_into("db", &mut db, &DecodeOptions::new()).unwrap();
        assert_eq!(db.port, 5432);

        let mut untouched = Db { port: 7 };
        registry
            .decode_into("cache", &mut untouched, &DecodeOptions::new())
            .unwrap();
        assert_eq!(untouched.port, 7);
    }
}
