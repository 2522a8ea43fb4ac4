//! Path resolution over a root mapping.
//!
//! These functions are the engine behind [`crate::Store`]. They operate on a
//! bare [`Mapping`] and do no locking.
//!
//! # Write semantics
//!
//! [`set`] walks the existing tree and only mutates once it leaves it:
//! either by inserting a freshly built subtree, padding a sequence, or
//! overwriting the terminal slot. Every failure is detected before any of
//! those happen, so a failed write leaves the tree unchanged.
//!
//! Missing intermediates are synthesized as mappings, or as sequences when
//! the following segment is an index. Sequences grow on write, padding with
//! empty mappings. An existing sequence element that cannot hold the next
//! segment is replaced (a scalar, a sequence followed by a key, or an empty
//! placeholder mapping followed by an index). A scalar reached through a
//! mapping is never replaced; that fails with `ConflictingType`.

use crate::error::{Error, Result};
use crate::node::{Mapping, Node};
use crate::path::{Path, parse_index};

/// Resolve `path` to the node it addresses.
///
/// # Errors
/// - `NotFound` when a mapping lacks the segment
/// - `InvalidIndex` when a sequence is addressed with a non-integer segment
/// - `IndexOutOfRange` when the index is past the end of a sequence
/// - `TypeMismatch` when segments remain after reaching a scalar
pub fn resolve<'a>(root: &'a Mapping, path: &Path) -> Result<&'a Node> {
    let segments = path.segments();
    let (first, rest) = segments.split_first().ok_or(Error::EmptyPath)?;
    let mut current = root
        .get(first)
        .ok_or_else(|| Error::not_found(path.prefix(1)))?;

    for (i, segment) in rest.iter().enumerate() {
        // `current` sits at depth i + 1; the step lands at depth i + 2.
        let depth = i + 1;
        current = match current {
            Node::Mapping(map) => map
                .get(segment)
                .ok_or_else(|| Error::not_found(path.prefix(depth + 1)))?,
            Node::Sequence(items) => {
                let index = parse_index(segment).ok_or_else(|| Error::InvalidIndex {
                    path: path.prefix(depth),
                    segment: segment.clone(),
                })?;
                items.get(index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.prefix(depth),
                    index,
                    len: items.len(),
                })?
            }
            scalar => return Err(Error::type_mismatch(path.prefix(depth), scalar.kind().as_str())),
        };
    }

    Ok(current)
}

/// Mutable counterpart of [`resolve`], with the same errors.
pub fn resolve_mut<'a>(root: &'a mut Mapping, path: &Path) -> Result<&'a mut Node> {
    let segments = path.segments();
    let (first, rest) = segments.split_first().ok_or(Error::EmptyPath)?;
    let mut current = root
        .get_mut(first)
        .ok_or_else(|| Error::not_found(path.prefix(1)))?;

    for (i, segment) in rest.iter().enumerate() {
        let depth = i + 1;
        current = match current {
            Node::Mapping(map) => map
                .get_mut(segment)
                .ok_or_else(|| Error::not_found(path.prefix(depth + 1)))?,
            Node::Sequence(items) => {
                let index = parse_index(segment).ok_or_else(|| Error::InvalidIndex {
                    path: path.prefix(depth),
                    segment: segment.clone(),
                })?;
                let len = items.len();
                items.get_mut(index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.prefix(depth),
                    index,
                    len,
                })?
            }
            scalar => return Err(Error::type_mismatch(path.prefix(depth), scalar.kind().as_str())),
        };
    }

    Ok(current)
}

/// True when `path` resolves.
pub fn contains(root: &Mapping, path: &Path) -> bool {
    resolve(root, path).is_ok()
}

/// Largest index a write may grow a sequence to.
pub const MAX_SEQUENCE_INDEX: usize = 65_535;

/// Write `value` at `path`, synthesizing intermediate containers.
///
/// The terminal slot is overwritten unconditionally. Sibling keys are never
/// removed.
///
/// # Errors
/// - `ConflictingType` when an existing node cannot be descended into
/// - `IndexLimit` when a sequence would grow past [`MAX_SEQUENCE_INDEX`]
///
/// The tree is unchanged on error.
pub fn set(root: &mut Mapping, path: &Path, value: Node) -> Result<()> {
    set_in_mapping(root, path, 0, value)
}

/// Container to synthesize for a slot whose next segment is `next`.
fn synthesize(next: &str) -> Node {
    if parse_index(next).is_some() {
        Node::sequence()
    } else {
        Node::mapping()
    }
}

fn expected_for(next: &str) -> &'static str {
    if parse_index(next).is_some() {
        "sequence"
    } else {
        "mapping"
    }
}

/// Apply `segments[depth..]` inside `node`, which sits at `prefix(depth)`.
fn descend(node: &mut Node, path: &Path, depth: usize, value: Node) -> Result<()> {
    match node {
        Node::Mapping(map) => set_in_mapping(map, path, depth, value),
        Node::Sequence(items) => set_in_sequence(items, path, depth, value),
        scalar => Err(Error::conflicting(
            path.prefix(depth),
            scalar.kind().as_str(),
            expected_for(&path.segments()[depth]),
        )),
    }
}

fn set_in_mapping(map: &mut Mapping, path: &Path, depth: usize, value: Node) -> Result<()> {
    let segments = path.segments();
    let key = &segments[depth];

    if depth + 1 == segments.len() {
        map.insert(key.clone(), value);
        return Ok(());
    }

    match map.get_mut(key) {
        Some(child) => descend(child, path, depth + 1, value),
        None => {
            let mut child = synthesize(&segments[depth + 1]);
            descend(&mut child, path, depth + 1, value)?;
            map.insert(key.clone(), child);
            Ok(())
        }
    }
}

fn set_in_sequence(items: &mut Vec<Node>, path: &Path, depth: usize, value: Node) -> Result<()> {
    let segments = path.segments();
    let index = parse_index(&segments[depth])
        .ok_or_else(|| Error::conflicting(path.prefix(depth), "sequence", "mapping"))?;
    if index >= items.len() && index > MAX_SEQUENCE_INDEX {
        return Err(Error::IndexLimit {
            path: path.prefix(depth + 1),
            index,
            max: MAX_SEQUENCE_INDEX,
        });
    }

    if depth + 1 == segments.len() {
        pad(items, index);
        if index < items.len() {
            items[index] = value;
        } else {
            items.push(value);
        }
        return Ok(());
    }

    let next = &segments[depth + 1];
    if index < items.len() {
        let slot = &mut items[index];
        let fits = match slot {
            Node::Mapping(map) => !(map.is_empty() && parse_index(next).is_some()),
            Node::Sequence(_) => parse_index(next).is_some(),
            _ => false,
        };
        if !fits {
            *slot = synthesize(next);
        }
        descend(slot, path, depth + 1, value)
    } else {
        let mut child = synthesize(next);
        descend(&mut child, path, depth + 1, value)?;
        pad(items, index);
        items.push(child);
        Ok(())
    }
}

/// Grow `items` with empty mappings until it has `len` elements.
fn pad(items: &mut Vec<Node>, len: usize) {
    while items.len() < len {
        items.push(Node::mapping());
    }
}

/// Remove the node at `path` and return it.
///
/// Every intermediate must be a mapping; deleting through a sequence is not
/// supported.
///
/// # Errors
/// - `NotFound` when an intermediate or the terminal key is absent
/// - `TypeMismatch` when an intermediate is not a mapping
pub fn delete(root: &mut Mapping, path: &Path) -> Result<Node> {
    let segments = path.segments();
    let (last, parents) = segments.split_last().ok_or(Error::EmptyPath)?;

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        current = match current.get_mut(segment) {
            Some(Node::Mapping(map)) => map,
            Some(other) => {
                return Err(Error::type_mismatch(path.prefix(i + 1), other.kind().as_str()));
            }
            None => return Err(Error::not_found(path.prefix(i + 1))),
        };
    }

    current
        .remove(last)
        .ok_or_else(|| Error::not_found(path.to_string()))
}
