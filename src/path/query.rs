//! Path query evaluation
//!
//! Depth-first matching of parsed segments against the element tree.
//! Element names compare ASCII case-insensitively; predicate keys and
//! values compare as exact bytes against the element's attributes.

use super::segment::{first_segment, last_segment, Predicate, Segment};
use crate::tree::{Document, NodeId};

impl Document {
    /// Find the first element under `from` matching `path`, in document
    /// order.
    ///
    /// Each segment selects among the children of the previous match;
    /// the search backtracks across siblings, so the overall result is
    /// the first complete match in pre-order.
    pub fn find(&self, from: NodeId, path: &str) -> Option<NodeId> {
        self.find_in(from, path.as_bytes())
    }

    fn find_in(&self, from: NodeId, path: &[u8]) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        let (segment, rest) = first_segment(path);

        for child in self.children(from) {
            if !self.segment_match(child, &segment) {
                continue;
            }
            match rest {
                None => return Some(child),
                Some(rest) => {
                    if let Some(found) = self.find_in(child, rest) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Resume enumeration after an element returned by [`Document::find`]
    /// or an earlier `find_next`.
    ///
    /// Matching is keyed on `last`'s own key plus the predicates of the
    /// deepest segment of `path` (when given): following siblings are
    /// scanned first, then the walk climbs to the parent, advances it
    /// with the previous segment, and descends into the next subtree.
    /// Ancestor segments are not re-validated on resumption; callers
    /// that need strict ancestor checking must issue fresh `find` calls
    /// and skip prior hits.
    pub fn find_next(&self, last: NodeId, path: Option<&str>) -> Option<NodeId> {
        self.find_next_from(last, path.map(str::as_bytes), None)
    }

    fn find_next_from(
        &self,
        last: NodeId,
        path: Option<&[u8]>,
        before: Option<usize>,
    ) -> Option<NodeId> {
        let last_key = self.key(last)?;

        let (segment, prev) = match path {
            Some(p) => {
                let (segment, prev) = last_segment(p, before.unwrap_or(p.len()));
                (Some(segment), Some(prev))
            }
            None => (None, None),
        };
        let matches = |id: NodeId| self.resumed_match(id, last_key, segment.as_ref());

        // the rest of the current sibling run
        let mut next = self.node(last).next_sibling;
        while let Some(id) = next {
            if matches(id) {
                return Some(id);
            }
            next = self.node(id).next_sibling;
        }

        // climb, advance the ancestor, and search the fresh subtree
        let mut parent = self.node(last).parent;
        while let Some(p) = parent {
            if self.key(p).is_none() {
                break;
            }
            let advanced = self.find_next_from(p, path, prev)?;
            let mut child = self.node(advanced).first_child;
            while let Some(id) = child {
                if matches(id) {
                    return Some(id);
                }
                child = self.node(id).next_sibling;
            }
            parent = Some(advanced);
        }
        None
    }

    fn resumed_match(&self, id: NodeId, last_key: &[u8], segment: Option<&Segment<'_>>) -> bool {
        match self.key(id) {
            Some(key) => {
                key.eq_ignore_ascii_case(last_key)
                    && segment.map_or(true, |s| self.predicates_match(id, &s.predicates))
            }
            None => false,
        }
    }

    fn segment_match(&self, id: NodeId, segment: &Segment<'_>) -> bool {
        match self.key(id) {
            Some(key) => {
                key.len() == segment.name.len()
                    && key.eq_ignore_ascii_case(segment.name)
                    && self.predicates_match(id, &segment.predicates)
            }
            None => false,
        }
    }

    /// Every predicate must be satisfied by some attribute of `id`
    fn predicates_match(&self, id: NodeId, predicates: &[Predicate<'_>]) -> bool {
        predicates.iter().all(|p| {
            self.node(id).attributes().any(|a| {
                a.name == p.key
                    && match p.value {
                        None => true,
                        Some(v) => a.value == Some(v),
                    }
            })
        })
    }

    /// Iterate every element matching `path` under `from`, in document
    /// order, by chaining `find` and `find_next`.
    pub fn find_all<'d, 'p>(&'d self, from: NodeId, path: &'p str) -> FindAll<'d, 'p> {
        FindAll {
            doc: self,
            path,
            next: self.find(from, path),
        }
    }
}

/// Iterator returned by [`Document::find_all`]
pub struct FindAll<'d, 'p> {
    doc: &'d Document,
    path: &'p str,
    next: Option<NodeId>,
}

impl<'d, 'p> Iterator for FindAll<'d, 'p> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.find_next(id, Some(self.path));
        Some(id)
    }
}
