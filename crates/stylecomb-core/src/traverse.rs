//! Traversal and splice primitives over the stylesheet tree
//!
//! Visits run depth-first in document order and never include the node they
//! start from. A callback may reshape the children of the node it receives;
//! the walk re-reads child counts after every callback so the new shape is
//! what gets descended into. Splicing a parent's child list while iterating
//! it by index is the caller's bookkeeping: after `remove(i)` the next child
//! lives at `i`, after `insert(i, _)` the current one moved to `i + 1`.

use crate::node::{Node, NodeContent, NodeKind};

impl Node {
    /// Visit every descendant, passing `(node, index_in_parent, parent)`
    pub fn traverse<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a Node, usize, &'a Node),
    {
        walk(self, None, &mut f);
    }

    /// Visit every descendant of the given kind, passing `(node, index_in_parent, parent)`
    pub fn traverse_by_kind<'a, F>(&'a self, kind: NodeKind, mut f: F)
    where
        F: FnMut(&'a Node, usize, &'a Node),
    {
        walk(self, Some(kind), &mut f);
    }

    /// Visit every descendant of the given kind mutably, passing `(node, index_in_parent)`
    pub fn traverse_by_kind_mut<F>(&mut self, kind: NodeKind, mut f: F)
    where
        F: FnMut(&mut Node, usize),
    {
        walk_mut(self, kind, &mut f);
    }

    /// Direct children of the given kind with their indices, in order
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.children()
            .iter()
            .enumerate()
            .filter(move |(_, child)| child.kind == kind)
    }

    /// First direct child of the given kind
    pub fn first(&self, kind: NodeKind) -> Option<&Node> {
        self.children().iter().find(|child| child.kind == kind)
    }

    pub fn first_index(&self, kind: NodeKind) -> Option<usize> {
        self.children().iter().position(|child| child.kind == kind)
    }

    pub fn last_index(&self, kind: NodeKind) -> Option<usize> {
        self.children().iter().rposition(|child| child.kind == kind)
    }

    /// Insert a child at `index`, shifting later siblings right
    ///
    /// Indices past the end append. Leaves have no child list and ignore the call.
    pub fn insert(&mut self, index: usize, node: Node) {
        if let NodeContent::Children(children) = &mut self.content {
            let index = index.min(children.len());
            children.insert(index, node);
        }
    }

    /// Remove the child at `index`, shifting later siblings left
    pub fn remove(&mut self, index: usize) -> Option<Node> {
        match &mut self.content {
            NodeContent::Children(children) if index < children.len() => Some(children.remove(index)),
            _ => None,
        }
    }

    /// Keep only the direct children for which `f` returns true
    pub fn retain_children<F>(&mut self, f: F)
    where
        F: FnMut(&Node) -> bool,
    {
        if let NodeContent::Children(children) = &mut self.content {
            children.retain(f);
        }
    }
}

fn walk<'a, F>(parent: &'a Node, kind: Option<NodeKind>, f: &mut F)
where
    F: FnMut(&'a Node, usize, &'a Node),
{
    for (index, child) in parent.children().iter().enumerate() {
        if kind.map_or(true, |k| child.kind == k) {
            f(child, index, parent);
        }
        walk(child, kind, f);
    }
}

fn walk_mut<F>(parent: &mut Node, kind: NodeKind, f: &mut F)
where
    F: FnMut(&mut Node, usize),
{
    let mut index = 0;
    while index < parent.len() {
        if let Some(child) = parent.get_mut(index) {
            if child.kind == kind {
                f(&mut *child, index);
            }
            walk_mut(child, kind, f);
        }
        index += 1;
    }
}
