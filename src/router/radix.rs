//! Segment trie over registered path templates.
//!
//! An alternative to the linear scan that gives the same answer. Each node is
//! one path segment:
//! - literal segments (e.g. `users`) match exactly
//! - one wildcard child stands for every `{param}` at that depth
//! - terminal nodes store `(verb, registration index)` for each entry ending there
//!
//! Literal and wildcard children can both match the same request segment, so
//! the search walks every branch that matches and keeps the smallest
//! registration index it sees. That index is the entry a linear scan would
//! have returned first, whatever the specificity of the competing templates.

use super::pattern::{split_request_path, Segment};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
struct RadixNode {
    /// Literal child segments.
    children: HashMap<Arc<str>, RadixNode>,
    /// Shared child for every parameter segment at this depth.
    param_child: Option<Box<RadixNode>>,
    /// Entries whose template ends at this node.
    routes: Vec<(Arc<str>, usize)>,
}

impl RadixNode {
    fn insert(&mut self, segments: &[Segment], verb: Arc<str>, index: usize) {
        let Some((first, remaining)) = segments.split_first() else {
            self.routes.push((verb, index));
            return;
        };

        let child = match first {
            Segment::Literal(lit) => self.children.entry(Arc::clone(lit)).or_default(),
            Segment::Param(_) => self.param_child.get_or_insert_with(Box::default).as_mut(),
        };
        child.insert(remaining, verb, index);
    }

    fn search(&self, segments: &[&str], verb: &str, best: &mut Option<usize>) {
        let Some((first, remaining)) = segments.split_first() else {
            let found = self
                .routes
                .iter()
                .filter(|(v, _)| v.eq_ignore_ascii_case(verb))
                .map(|(_, idx)| *idx)
                .min();
            if let Some(idx) = found {
                *best = Some(best.map_or(idx, |b| b.min(idx)));
            }
            return;
        };

        if let Some(child) = self.children.get(*first) {
            child.search(remaining, verb, best);
        }
        if let Some(param_child) = &self.param_child {
            param_child.search(remaining, verb, best);
        }
    }

    fn count(&self) -> usize {
        self.routes.len()
            + self.children.values().map(RadixNode::count).sum::<usize>()
            + self.param_child.as_ref().map_or(0, |c| c.count())
    }
}

/// Trie index from request path to the earliest-registered matching entry.
#[derive(Clone, Default)]
pub struct RadixIndex {
    root: RadixNode,
}

impl RadixIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an entry's template segments under its registration index.
    pub(crate) fn insert(&mut self, segments: &[Segment], verb: Arc<str>, index: usize) {
        self.root.insert(segments, verb, index);
    }

    /// Registration index of the first entry accepting `verb` and `path`.
    #[must_use]
    pub fn lookup(&self, verb: &str, path: &str) -> Option<usize> {
        let segments = split_request_path(path)?;
        let mut best = None;
        self.root.search(&segments, verb, &mut best);
        best
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RadixIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixIndex")
            .field("entries", &self.len())
            .finish()
    }
}
