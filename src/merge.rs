//! Merging trees and extracting subtrees.
//!
//! Merge is leaf-wise: every leaf path of the source is written into the
//! destination with [`tree::set`]. Sequences count as leaves, so a source
//! sequence replaces the destination's value wholesale instead of being
//! merged index by index. An empty source mapping only ensures a mapping
//! exists at its path; it does not wipe a populated one.
//!
//! Merge stops at the first failing write. Entries already written stay
//! written; there is no rollback.

use crate::error::Result;
use crate::flatten::Flattener;
use crate::node::{Mapping, Node};
use crate::path::Path;
use crate::tree;

/// Merge `source` into `dest`, source values winning.
///
/// # Example
/// ```
/// use pathconf::merge::merge;
/// use pathconf::node::{Mapping, Node};
///
/// let mut dest = Mapping::new();
/// dest.insert("x".into(), Node::Int(0));
/// dest.insert("y".into(), Node::Int(2));
/// let mut source = Mapping::new();
/// source.insert("x".into(), Node::Int(1));
///
/// merge(&mut dest, &source, '.')?;
/// assert_eq!(dest["x"], Node::Int(1));
/// assert_eq!(dest["y"], Node::Int(2));
/// # Ok::<(), pathconf::Error>(())
/// ```
pub fn merge(dest: &mut Mapping, source: &Mapping, delimiter: char) -> Result<()> {
    for (segments, value) in leaves(source) {
        let path = Path::from_segments(segments, delimiter)?;
        write_leaf(dest, &path, value)?;
    }
    Ok(())
}

/// Merge `source` under `base`.
///
/// When `base` does not resolve in `dest`, the whole source is written there
/// as one mapping.
pub fn merge_at(dest: &mut Mapping, base: &Path, source: &Mapping) -> Result<()> {
    if !tree::contains(dest, base) {
        return tree::set(dest, base, Node::Mapping(source.clone()));
    }
    for (segments, value) in leaves(source) {
        let path = base.join(&Path::from_segments(segments, base.delimiter())?);
        write_leaf(dest, &path, value)?;
    }
    Ok(())
}

/// Copy of the mapping at `path`, or an empty mapping when `path` does not
/// resolve to one.
pub fn cut(root: &Mapping, path: &Path) -> Mapping {
    match tree::resolve(root, path) {
        Ok(Node::Mapping(map)) => map.clone(),
        _ => Mapping::new(),
    }
}

/// Leaf entries of `source` with sequences kept whole.
fn leaves(source: &Mapping) -> Vec<(Vec<String>, Node)> {
    let mut out = Vec::new();
    Flattener::new()
        .descend_sequences(false)
        .walk(source, |steps, leaf| {
            out.push((steps.iter().map(|s| s.segment()).collect(), leaf.clone()));
        });
    out
}

fn write_leaf(dest: &mut Mapping, path: &Path, value: Node) -> Result<()> {
    if let Node::Mapping(map) = &value
        && map.is_empty()
        && matches!(tree::resolve(dest, path), Ok(Node::Mapping(_)))
    {
        return Ok(());
    }
    tree::set(dest, path, value)
}
