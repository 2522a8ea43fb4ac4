//! Conversion between the nested tree and flat `path -> leaf` mappings.
//!
//! [`Flattener::flatten`] enumerates every leaf depth-first. Empty mappings
//! and empty sequences count as leaves so that nothing is lost. Sequence
//! indices are rendered in decimal and look exactly like numeric mapping
//! keys; [`FlatIndex`] keeps the [`Step`] list for every path so the exact
//! container kinds can still be rebuilt with [`FlatIndex::to_mapping`].
//!
//! The free [`unflatten`] only sees strings and rebuilds containers with the
//! normal write rules, so a mapping key like `"0"` comes back as a sequence
//! index.

use crate::error::Result;
use crate::node::{Mapping, Node};
use crate::path::{DEFAULT_DELIMITER, Path, Step, join_steps};
use crate::tree;
use std::collections::BTreeMap;

/// Configurable leaf enumerator.
#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    delimiter: char,
    descend_sequences: bool,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            descend_sequences: true,
        }
    }
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delimiter used to join segments.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Whether sequences are walked into (default) or treated as leaves.
    pub fn descend_sequences(mut self, descend: bool) -> Self {
        self.descend_sequences = descend;
        self
    }

    /// Visit every leaf with its step list, without building an index.
    pub fn walk<F>(&self, root: &Mapping, mut visit: F)
    where
        F: FnMut(&[Step], &Node),
    {
        let mut steps = Vec::new();
        for (key, child) in root {
            steps.push(Step::Key(key.clone()));
            self.walk_node(child, &mut steps, &mut visit);
            steps.pop();
        }
    }

    fn walk_node<F>(&self, node: &Node, steps: &mut Vec<Step>, visit: &mut F)
    where
        F: FnMut(&[Step], &Node),
    {
        match node {
            Node::Mapping(map) if !map.is_empty() => {
                for (key, child) in map {
                    steps.push(Step::Key(key.clone()));
                    self.walk_node(child, steps, visit);
                    steps.pop();
                }
            }
            Node::Sequence(items) if self.descend_sequences && !items.is_empty() => {
                for (index, child) in items.iter().enumerate() {
                    steps.push(Step::Index(index));
                    self.walk_node(child, steps, visit);
                    steps.pop();
                }
            }
            leaf => visit(steps, leaf),
        }
    }

    /// Build the flat index of `root`.
    pub fn flatten(&self, root: &Mapping) -> FlatIndex {
        let mut index = FlatIndex {
            delimiter: self.delimiter,
            values: BTreeMap::new(),
            steps: BTreeMap::new(),
        };
        self.walk(root, |steps, leaf| {
            let path = join_steps(steps, self.delimiter);
            index.values.insert(path.clone(), leaf.clone());
            index.steps.insert(path, steps.to_vec());
        });
        index
    }

    /// Just the joined leaf paths.
    pub fn paths(&self, root: &Mapping) -> Vec<String> {
        let mut paths = Vec::new();
        self.walk(root, |steps, _| paths.push(join_steps(steps, self.delimiter)));
        paths
    }
}

/// A flattened projection of a tree.
///
/// Not a second source of truth: it is a snapshot and goes stale as soon as
/// the tree it was built from changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatIndex {
    delimiter: char,
    values: BTreeMap<String, Node>,
    steps: BTreeMap<String, Vec<Step>>,
}

impl FlatIndex {
    /// Full path to leaf.
    pub fn values(&self) -> &BTreeMap<String, Node> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, Node> {
        self.values
    }

    /// Full path to its typed steps.
    pub fn steps(&self) -> &BTreeMap<String, Vec<Step>> {
        &self.steps
    }

    /// Full path to its segment strings.
    pub fn segments(&self, path: &str) -> Option<Vec<String>> {
        self.steps
            .get(path)
            .map(|steps| steps.iter().map(Step::segment).collect())
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        self.values.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Rebuild the tree, restoring the original container kind at every step.
    pub fn to_mapping(&self) -> Mapping {
        let mut root = Mapping::new();
        for (path, steps) in &self.steps {
            if let Some(value) = self.values.get(path) {
                insert_steps(&mut root, steps, value.clone());
            }
        }
        root
    }
}

/// Container that can hold `step`.
fn container_for(step: &Step) -> Node {
    match step {
        Step::Key(_) => Node::mapping(),
        Step::Index(_) => Node::sequence(),
    }
}

fn insert_steps(root: &mut Mapping, steps: &[Step], value: Node) {
    let Some((Step::Key(first), rest)) = steps.split_first() else {
        return;
    };
    match rest.first() {
        None => {
            root.insert(first.clone(), value);
        }
        Some(next) => {
            let slot = root
                .entry(first.clone())
                .or_insert_with(|| container_for(next));
            insert_into(slot, rest, value);
        }
    }
}

fn insert_into(node: &mut Node, steps: &[Step], value: Node) {
    let Some((step, rest)) = steps.split_first() else {
        *node = value;
        return;
    };
    let holds = matches!(
        (&*node, step),
        (Node::Mapping(_), Step::Key(_)) | (Node::Sequence(_), Step::Index(_))
    );
    if !holds {
        *node = container_for(step);
    }
    match (node, step) {
        (Node::Mapping(map), Step::Key(key)) => {
            let slot = map.entry(key.clone()).or_insert(Node::Null);
            insert_into(slot, rest, value);
        }
        (Node::Sequence(items), Step::Index(index)) => {
            // Indices arrive in string order ("10" before "2"); pad with
            // nulls that a later entry fills in.
            while items.len() <= *index {
                items.push(Node::Null);
            }
            insert_into(&mut items[*index], rest, value);
        }
        _ => {}
    }
}

/// Flatten with the default delimiter, descending into sequences.
pub fn flatten(root: &Mapping) -> FlatIndex {
    Flattener::new().flatten(root)
}

/// Rebuild a tree from `path -> value` entries by writing each one.
///
/// Lossy for numeric mapping keys: they are rebuilt as sequence indices.
pub fn unflatten<I, K>(entries: I, delimiter: char) -> Result<Mapping>
where
    I: IntoIterator<Item = (K, Node)>,
    K: AsRef<str>,
{
    let mut root = Mapping::new();
    for (key, value) in entries {
        let path = Path::parse_with(key.as_ref(), delimiter)?;
        tree::set(&mut root, &path, value)?;
    }
    Ok(root)
}
