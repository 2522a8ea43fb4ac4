//! Integration tests for the path-addressed store.
//!
//! Covers the observable contract of `Store`:
//! - get/set/delete/has over nested mappings and sequences
//! - flatten and unflatten round trips
//! - merge, merge_at and cut
//! - soft-typed reads falling back to defaults

use pathconf::flatten::{flatten, unflatten};
use pathconf::{Error, ErrorCode, Mapping, Node, Store};
use serde_json::json;
use std::sync::Arc;
use std::thread;

/// Helper to build a store from a JSON literal.
fn store_from(value: serde_json::Value) -> Store {
    match Node::from(value) {
        Node::Mapping(map) => Store::from_mapping(map),
        other => panic!("fixture must be a mapping, got {:?}", other.kind()),
    }
}

/// Helper to turn a JSON literal into a root mapping.
fn mapping(value: serde_json::Value) -> Mapping {
    match Node::from(value) {
        Node::Mapping(map) => map,
        other => panic!("fixture must be a mapping, got {:?}", other.kind()),
    }
}

mod get_set_tests {
    use super::*;

    #[test]
    fn set_then_get_on_empty_store() {
        for path in ["a", "a.b", "x.y.z.w", "list.0", "deep.0.inner.2"] {
            let store = Store::new();
            store.set(path, "v").unwrap();
            assert_eq!(store.get(path).unwrap(), Node::from("v"), "path {path}");
            assert!(store.has(path), "path {path}");
        }
    }

    #[test]
    fn sequence_grows_with_empty_mapping_placeholders() {
        let store = Store::new();
        store.set("a.3", "x").unwrap();

        let seq = store.get("a").unwrap();
        let items = seq.as_sequence().expect("a should be a sequence");
        assert_eq!(items.len(), 4);
        for item in &items[..3] {
            assert_eq!(item, &Node::mapping());
        }
        assert_eq!(items[3], Node::from("x"));
    }

    #[test]
    fn get_through_scalar_is_type_mismatch() {
        let store = store_from(json!({"a": "leaf"}));
        let err = store.get("a.b").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn get_reports_index_errors() {
        let store = store_from(json!({"list": [1, 2]}));
        assert_eq!(store.get("list.name").unwrap_err().code(), ErrorCode::InvalidIndex);
        assert_eq!(store.get("list.5").unwrap_err().code(), ErrorCode::IndexOutOfRange);
        assert_eq!(store.get("nope").unwrap_err().code(), ErrorCode::NotFound);
    }

    #[test]
    fn empty_paths_and_segments_are_rejected() {
        let store = Store::new();
        assert!(matches!(store.set("", 1i64), Err(Error::EmptyPath)));
        assert!(matches!(store.set("a..b", 1i64), Err(Error::EmptySegment { .. })));
        assert!(matches!(store.delete(""), Err(Error::EmptyPath)));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_set_leaves_store_unchanged() {
        let store = store_from(json!({"a": {"b": "leaf"}, "list": [1]}));
        let before = store.to_mapping();

        assert!(matches!(
            store.set("a.b.c.d", 1i64),
            Err(Error::ConflictingType { .. })
        ));
        assert!(matches!(
            store.set("list.key.x", 1i64),
            Err(Error::ConflictingType { .. })
        ));
        assert_eq!(store.to_mapping(), before);
    }

    #[test]
    fn set_replaces_scalar_sequence_slot() {
        let store = store_from(json!({"list": ["scalar"]}));
        store.set("list.0.name", "n").unwrap();
        assert_eq!(store.get("list").unwrap(), Node::from(json!([{"name": "n"}])));
    }

    #[test]
    fn keys_and_paths() {
        let store = store_from(json!({"b": {"x": [1, 2]}, "a": 1}));
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.paths(), vec!["a", "b.x.0", "b.x.1"]);
    }
}

mod delete_tests {
    use super::*;

    #[test]
    fn delete_removes_exactly_the_subtree() {
        let store = Store::new();
        store.set("a.b.c", 1i64).unwrap();
        store.set("a.keep", true).unwrap();

        let removed = store.delete("a.b").unwrap();
        assert_eq!(removed, Node::from(json!({"c": 1})));
        assert!(!store.has("a.b.c"));
        assert!(store.has("a"));
        assert!(store.has("a.keep"));
    }

    #[test]
    fn delete_through_sequence_is_type_mismatch() {
        let store = store_from(json!({"list": [{"x": 1}]}));
        assert!(matches!(store.delete("list.0.x"), Err(Error::TypeMismatch { .. })));
        assert!(store.has("list.0.x"));
    }

    #[test]
    fn delete_missing_key_is_not_found() {
        let store = store_from(json!({"a": {}}));
        assert!(matches!(store.delete("a.b"), Err(Error::NotFound { .. })));
    }
}

mod flatten_tests {
    use super::*;

    #[test]
    fn unflatten_inverts_flatten() {
        let tree = mapping(json!({
            "server": {"host": "h", "ports": [80, 443], "tls": {"on": false}},
            "users": [{"name": "a", "roles": ["admin"]}, {"name": "b", "roles": []}],
            "empty": {}
        }));
        let index = flatten(&tree);
        assert_eq!(unflatten(index.values().clone(), '.').unwrap(), tree);
        assert_eq!(index.to_mapping(), tree);
    }

    #[test]
    fn flat_index_snapshot_matches_paths() {
        let store = store_from(json!({"a": {"b": 1, "c": [true]}}));
        let index = store.flat_index();
        let paths: Vec<&str> = index.paths().collect();
        assert_eq!(paths, store.paths());
        assert_eq!(index.get("a.c.0"), Some(&Node::Bool(true)));
    }

    #[test]
    fn numeric_mapping_keys_are_ambiguous_when_flat() {
        let tree = mapping(json!({"codes": {"0": "ok"}}));
        let rebuilt = unflatten(flatten(&tree).into_values(), '.').unwrap();
        assert_eq!(rebuilt, mapping(json!({"codes": ["ok"]})));
    }
}

mod merge_tests {
    use super::*;

    #[test]
    fn merge_overwrites_leaves() {
        let store = store_from(json!({"x": 0, "y": 2}));
        store.merge(&store_from(json!({"x": 1}))).unwrap();
        assert_eq!(store.to_mapping(), mapping(json!({"x": 1, "y": 2})));
    }

    #[test]
    fn merge_replaces_sequences_whole() {
        let store = store_from(json!({"list": [1, 2, 3], "nested": {"keep": 1}}));
        store
            .merge(&store_from(json!({"list": ["a"], "nested": {"add": 2}})))
            .unwrap();
        assert_eq!(
            store.to_mapping(),
            mapping(json!({"list": ["a"], "nested": {"keep": 1, "add": 2}}))
        );
    }

    #[test]
    fn merge_halts_on_first_failure() {
        let store = store_from(json!({"b": "scalar"}));
        let err = store
            .merge(&store_from(json!({"a": 1, "b": {"c": 2}, "d": 3})))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConflictingType);
        assert!(store.has("a"));
        assert!(!store.has("d"));
    }

    #[test]
    fn merge_at_prefixes_paths() {
        let store = store_from(json!({"services": {"api": {"port": 80}}}));
        store
            .merge_at("services.api", &store_from(json!({"port": 8080, "tls": true})))
            .unwrap();
        store
            .merge_at("services.web", &store_from(json!({"port": 3000})))
            .unwrap();
        assert_eq!(
            store.to_mapping(),
            mapping(json!({"services": {
                "api": {"port": 8080, "tls": true},
                "web": {"port": 3000}
            }}))
        );
    }
}

mod cut_tests {
    use super::*;

    #[test]
    fn cut_is_an_independent_copy() {
        let store = store_from(json!({"a": {"b": 1}}));
        let cut = store.cut("a");
        assert_eq!(cut.get("b").unwrap(), Node::Int(1));

        cut.set("b", 2i64).unwrap();
        cut.set("c", 3i64).unwrap();
        assert_eq!(store.get("a.b").unwrap(), Node::Int(1));
        assert!(!store.has("a.c"));

        store.set("a.b", 10i64).unwrap();
        assert_eq!(cut.int("b"), 2);
    }

    #[test]
    fn cut_of_non_mapping_is_empty() {
        let store = store_from(json!({"s": "x", "list": [1]}));
        assert!(store.cut("s").is_empty());
        assert!(store.cut("list").is_empty());
        assert!(store.cut("missing").is_empty());
    }

    #[test]
    fn to_mapping_is_a_copy() {
        let store = store_from(json!({"a": 1}));
        let mut copy = store.to_mapping();
        copy.insert("b".into(), Node::Int(2));
        assert!(!store.has("b"));
    }
}

mod typed_tests {
    use super::*;

    #[test]
    fn soft_reads_fall_back_silently() {
        let store = store_from(json!({"numericField": 12}));
        assert_eq!(store.string_or("missing", "fallback"), "fallback");
        assert_eq!(store.string("numericField"), "");
        assert_eq!(store.int("numericField"), 12);
        assert_eq!(store.int("numericField.x"), 0);
    }
}

mod concurrency_tests {
    use super::*;

    #[test]
    fn concurrent_writers_and_readers() {
        let store = Arc::new(Store::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..50i64 {
                        store.set(&format!("workers.w{i}.n{j}"), j).unwrap();
                        let _ = store.paths();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.paths().len(), 8 * 50);
        assert_eq!(store.int("workers.w3.n49"), 49);
    }
}
