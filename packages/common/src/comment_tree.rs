//! Threaded comments kept as an arena indexed by id.
//!
//! Replies point at their parent through an optional id; nothing owns
//! anything else, so building feeds and collecting deletion cascades never
//! has to follow owning pointers.

use std::collections::{HashMap, HashSet};

/// One comment as stored, plus whatever payload the caller wants to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode<T> {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub is_approved: bool,
    pub data: T,
}

/// A comment with its visible replies.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread<T> {
    pub comment: T,
    pub replies: Vec<Thread<T>>,
}

#[derive(Debug)]
pub struct CommentArena<T> {
    nodes: HashMap<i32, CommentNode<T>>,
    children: HashMap<i32, Vec<i32>>,
    roots: Vec<i32>,
}

impl<T> CommentArena<T> {
    /// Build the arena. Sibling order follows input order.
    pub fn new(comments: impl IntoIterator<Item = CommentNode<T>>) -> Self {
        let mut nodes = HashMap::new();
        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut roots = Vec::new();

        for node in comments {
            match node.parent_id {
                Some(parent) => children.entry(parent).or_default().push(node.id),
                None => roots.push(node.id),
            }
            nodes.insert(node.id, node);
        }

        Self {
            nodes,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every reply below `id`, at any depth. `id` itself is excluded.
    pub fn descendants(&self, id: i32) -> Vec<i32> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            for &child in self.children.get(&current).into_iter().flatten() {
                if seen.insert(child) {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }

    /// `ids` together with all of their replies, deduplicated.
    pub fn subtree_ids(&self, ids: &[i32]) -> Vec<i32> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &id in ids {
            for candidate in std::iter::once(id).chain(self.descendants(id)) {
                if seen.insert(candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Approved top-level comments, each with its approved replies nested.
    ///
    /// An unapproved reply hides its whole subtree, even when its parent is
    /// approved.
    pub fn into_approved_feed(mut self) -> Vec<Thread<T>> {
        let roots = std::mem::take(&mut self.roots);
        roots
            .into_iter()
            .filter_map(|id| self.take_approved(id))
            .collect()
    }

    fn take_approved(&mut self, id: i32) -> Option<Thread<T>> {
        let node = self.nodes.remove(&id)?;
        if !node.is_approved {
            return None;
        }
        let child_ids = self.children.remove(&id).unwrap_or_default();
        let replies = child_ids
            .into_iter()
            .filter_map(|child| self.take_approved(child))
            .collect();
        Some(Thread {
            comment: node.data,
            replies,
        })
    }
}
