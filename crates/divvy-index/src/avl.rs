//! Height-balanced binary search tree
//!
//! This module provides the `BalancedIndex`, an AVL tree whose nodes live in a single arena
//! vector and reference their children by slot. Nodes are only ever appended (there is no
//! removal), so a slot stays valid for the whole life of the index.

use crate::{DivvyError, Result};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inline capacity of the insertion path. An AVL tree of height 32 holds millions of nodes;
/// deeper paths spill to the heap.
const PATH_INLINE: usize = 32;

/// Arena slot of a child node
type Link = Option<usize>;

/// Three-way comparison used for every descent in the tree
///
/// Returns `Less` when `a` sorts before `b`, `Equal` when they are the same key and
/// `Greater` otherwise. For the integer identifiers of this crate it is plain numeric order.
#[inline]
pub fn compare_keys<K: Ord>(a: &K, b: &K) -> Ordering {
    a.cmp(b)
}

/// A single entry of the tree
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    /// 0 for a leaf, 1 + the taller child otherwise
    height: isize,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    /// The key this node is stored under
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The stored value
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutable access to the stored value. The key cannot change, so ordering is preserved.
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Height of the subtree rooted here
    #[inline]
    pub fn height(&self) -> isize {
        self.height
    }
}

/// Size and shape summary of one index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexStats {
    /// Number of nodes
    pub count: usize,
    /// Height of the root, -1 when empty
    pub height: isize,
}

/// AVL tree mapping unique keys to values
#[derive(Debug, Clone)]
pub struct BalancedIndex<K, V> {
    /// Every node ever inserted, addressed by slot
    nodes: Vec<Node<K, V>>,
    /// Slot of the root node
    root: Link,
    /// Number of single rotations performed so far (a double rotation counts two)
    rotations: usize,
}

impl<K, V> Default for BalancedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BalancedIndex<K, V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            rotations: 0,
        }
    }

    /// Number of nodes
    #[inline]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the root, or -1 for an empty index
    #[inline]
    pub fn height(&self) -> isize {
        self.height_of(self.root)
    }

    /// Count and height together
    #[inline]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            count: self.count(),
            height: self.height(),
        }
    }

    /// Number of single rotations performed by all inserts so far
    #[inline]
    pub fn rotation_count(&self) -> usize {
        self.rotations
    }

    /// The root node, if any
    #[inline]
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.map(|id| &self.nodes[id])
    }

    /// Left child of `node`
    #[inline]
    pub fn left(&self, node: &Node<K, V>) -> Option<&Node<K, V>> {
        node.left.map(|id| &self.nodes[id])
    }

    /// Right child of `node`
    #[inline]
    pub fn right(&self, node: &Node<K, V>) -> Option<&Node<K, V>> {
        node.right.map(|id| &self.nodes[id])
    }

    /// Visit every entry in ascending key order
    pub fn for_each_in_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack: SmallVec<[usize; PATH_INLINE]> = SmallVec::new();
        let mut current = self.root;

        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id].left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            let node = &self.nodes[id];
            f(&node.key, &node.value);
            current = node.right;
        }
    }

    /// Consume the index, handing every entry to `release` in post-order
    ///
    /// Children are always released before their parent, which lets `release` tear down
    /// anything a value owns. Dropping the index releases everything as well; this is for
    /// callers that need to observe or account for each entry on the way out.
    pub fn destroy<F: FnMut(K, V)>(self, mut release: F) {
        let order = self.post_order_slots();
        let mut slots: Vec<Option<Node<K, V>>> = self.nodes.into_iter().map(Some).collect();

        for id in order {
            if let Some(node) = slots[id].take() {
                release(node.key, node.value);
            }
        }
    }

    /// Slots in post-order (left subtree, right subtree, node)
    fn post_order_slots(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }

        // Reverse of a (node, right, left) pre-order is (left, right, node) post-order
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.nodes[id];
            if let Some(left) = node.left {
                stack.push(left);
            }
            if let Some(right) = node.right {
                stack.push(right);
            }
        }

        order.reverse();
        order
    }

    #[inline]
    fn height_of(&self, link: Link) -> isize {
        link.map_or(-1, |id| self.nodes[id].height)
    }

    #[inline]
    fn update_height(&mut self, id: usize) {
        let node = &self.nodes[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = height;
    }

    /// Rotate right at `k2`, returning the new subtree root
    ///
    /// ```text
    ///       k2            k1
    ///      /  \          /  \
    ///     k1   Z   =>   X   k2
    ///    /  \              /  \
    ///   X    Y            Y    Z
    /// ```
    fn rotate_right(&mut self, k2: usize) -> usize {
        let Some(k1) = self.nodes[k2].left else {
            return k2;
        };
        let y = self.nodes[k1].right;

        self.nodes[k1].right = Some(k2);
        self.nodes[k2].left = y;

        self.update_height(k2);
        self.update_height(k1);
        self.rotations += 1;
        k1
    }

    /// Rotate left at `k1`, returning the new subtree root (mirror of `rotate_right`)
    fn rotate_left(&mut self, k1: usize) -> usize {
        let Some(k2) = self.nodes[k1].right else {
            return k1;
        };
        let y = self.nodes[k2].left;

        self.nodes[k2].left = Some(k1);
        self.nodes[k1].right = y;

        self.update_height(k1);
        self.update_height(k2);
        self.rotations += 1;
        k2
    }

    /// Restore balance at `pivot` and hang the rotated subtree back under `parent`
    fn rebalance(&mut self, pivot: usize, parent: Link) {
        let pivot_left = self.nodes[pivot].left;
        let pivot_right = self.nodes[pivot].right;

        let new_root = if self.height_of(pivot_left) > self.height_of(pivot_right) {
            if let Some(k) = pivot_left {
                let k_node = &self.nodes[k];
                if self.height_of(k_node.left) < self.height_of(k_node.right) {
                    tracing::trace!(pivot, "left-right rotation");
                    let rotated = self.rotate_left(k);
                    self.nodes[pivot].left = Some(rotated);
                } else {
                    tracing::trace!(pivot, "left-left rotation");
                }
            }
            self.rotate_right(pivot)
        } else {
            if let Some(k) = pivot_right {
                let k_node = &self.nodes[k];
                if self.height_of(k_node.left) > self.height_of(k_node.right) {
                    tracing::trace!(pivot, "right-left rotation");
                    let rotated = self.rotate_right(k);
                    self.nodes[pivot].right = Some(rotated);
                } else {
                    tracing::trace!(pivot, "right-right rotation");
                }
            }
            self.rotate_left(pivot)
        };

        match parent {
            None => self.root = Some(new_root),
            Some(p) if self.nodes[p].left == Some(pivot) => self.nodes[p].left = Some(new_root),
            Some(p) => self.nodes[p].right = Some(new_root),
        }
    }
}

impl<K: Ord, V> BalancedIndex<K, V> {
    /// Look up the node stored under `key`
    pub fn search(&self, key: &K) -> Option<&Node<K, V>> {
        self.find_slot(key).map(|id| &self.nodes[id])
    }

    /// Look up the node stored under `key` for an in-place value update
    pub fn search_mut(&mut self, key: &K) -> Option<&mut Node<K, V>> {
        self.find_slot(key).map(|id| &mut self.nodes[id])
    }

    /// Check if `key` is present
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    fn find_slot(&self, key: &K) -> Link {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match compare_keys(key, &node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }
}

impl<K: Ord + Debug, V> BalancedIndex<K, V> {
    /// Insert a new entry
    ///
    /// Fails with [`DivvyError::DuplicateKey`] when `key` is already present, in which case
    /// the tree is left exactly as it was. Otherwise the new node is attached as a leaf and
    /// the path back to the root is retraced, applying at most one single or double
    /// rotation at the deepest unbalanced ancestor.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        // Ancestor chain from the root down to the new leaf's parent
        let mut path: SmallVec<[usize; PATH_INLINE]> = SmallVec::new();
        let mut attach_left = false;
        let mut current = self.root;

        while let Some(id) = current {
            path.push(id);
            let node = &self.nodes[id];
            current = match compare_keys(&key, &node.key) {
                Ordering::Equal => {
                    return Err(DivvyError::DuplicateKey(format!("{key:?}")));
                }
                Ordering::Less => {
                    attach_left = true;
                    node.left
                }
                Ordering::Greater => {
                    attach_left = false;
                    node.right
                }
            };
        }

        let new_id = self.nodes.len();
        self.nodes.push(Node::leaf(key, value));
        match path.last() {
            None => self.root = Some(new_id),
            Some(&parent) if attach_left => self.nodes[parent].left = Some(new_id),
            Some(&parent) => self.nodes[parent].right = Some(new_id),
        }

        // Retrace: refresh heights until one stops changing or a node tips out of balance
        while let Some(id) = path.pop() {
            let node = &self.nodes[id];
            let left_height = self.height_of(node.left);
            let right_height = self.height_of(node.right);
            let new_height = 1 + left_height.max(right_height);

            if node.height == new_height {
                break;
            }
            if (left_height - right_height).abs() > 1 {
                self.rebalance(id, path.last().copied());
                break;
            }
            self.nodes[id].height = new_height;
        }

        Ok(())
    }
}
