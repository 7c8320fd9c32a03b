//! Pairing heap with stable node handles.
//!
//! A mergeable min-priority queue built from heap-ordered multiway trees.
//! Nodes live in an arena and are addressed by `NodeHandle`, so callers can
//! decrease keys or delete arbitrary entries without searching.
//!
//! The heap runs in one of two modes for its whole lifetime:
//! - `Dynamic`: the heap hands out handles from its own arena (`insert`).
//! - `Preallocated`: the caller owns the handle space `0..capacity` and picks
//!   the handle for every entry (`insert_at`). The cost field builder uses this
//!   with one handle per grid cell so relaxation never allocates.
//!
//! Using the wrong insert for the mode, re-inserting a queued handle, or
//! raising a key through `decrease_key` are contract violations and panic.

/// Stable reference to an entry in a `PairingHeap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// How node storage is managed for a heap instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapMode {
    Dynamic,
    Preallocated,
}

#[derive(Debug, Clone)]
struct Node<K, T> {
    key: K,
    payload: T,
    /// Parent when this is the first child, otherwise the left sibling
    prev: Option<usize>,
    next: Option<usize>,
    child: Option<usize>,
}

/// Min-ordered pairing heap keyed by `K` carrying payloads of type `T`.
#[derive(Debug, Clone)]
pub struct PairingHeap<K, T> {
    mode: HeapMode,
    nodes: Vec<Option<Node<K, T>>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl<K: Ord + Copy, T> PairingHeap<K, T> {
    /// Create an empty heap that manages its own node storage.
    pub fn new() -> Self {
        Self {
            mode: HeapMode::Dynamic,
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Create an empty heap whose handles `0..capacity` are chosen by the caller.
    pub fn preallocated(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        nodes.resize_with(capacity, || None);
        Self {
            mode: HeapMode::Preallocated,
            nodes,
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn mode(&self) -> HeapMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the handle currently refers to a queued entry.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        matches!(self.nodes.get(handle.0), Some(Some(_)))
    }

    /// Current key of a queued entry.
    pub fn key(&self, handle: NodeHandle) -> Option<K> {
        self.nodes.get(handle.0)?.as_ref().map(|n| n.key)
    }

    /// Payload of a queued entry.
    pub fn payload(&self, handle: NodeHandle) -> Option<&T> {
        self.nodes.get(handle.0)?.as_ref().map(|n| &n.payload)
    }

    /// Insert into a dynamic heap, returning the handle of the new entry.
    pub fn insert(&mut self, key: K, payload: T) -> NodeHandle {
        assert!(
            self.mode == HeapMode::Dynamic,
            "insert() called on a preallocated heap; use insert_at()"
        );

        let node = Some(Node {
            key,
            payload,
            prev: None,
            next: None,
            child: None,
        });
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.root = self.merge(self.root, Some(idx));
        self.len += 1;
        NodeHandle(idx)
    }

    /// Insert into a preallocated heap at a caller-chosen handle.
    pub fn insert_at(&mut self, handle: NodeHandle, key: K, payload: T) {
        assert!(
            self.mode == HeapMode::Preallocated,
            "insert_at() called on a dynamic heap; use insert()"
        );
        let idx = handle.0;
        assert!(idx < self.nodes.len(), "handle {} outside preallocated capacity", idx);
        assert!(self.nodes[idx].is_none(), "handle {} is already queued", idx);

        self.nodes[idx] = Some(Node {
            key,
            payload,
            prev: None,
            next: None,
            child: None,
        });
        self.root = self.merge(self.root, Some(idx));
        self.len += 1;
    }

    /// Smallest entry without removing it.
    pub fn peek_min(&self) -> Option<(K, &T)> {
        let node = self.node(self.root?);
        Some((node.key, &node.payload))
    }

    /// Handle of the smallest entry.
    pub fn peek_handle(&self) -> Option<NodeHandle> {
        self.root.map(NodeHandle)
    }

    /// Remove and return the smallest entry.
    pub fn extract_min(&mut self) -> Option<(K, T)> {
        let root = self.root?;
        self.root = self.two_pass_merge(root);
        self.len -= 1;
        Some(self.release(root))
    }

    /// Lower the key of a queued entry.
    ///
    /// Panics if the handle is not queued or `key` is larger than the current key.
    pub fn decrease_key(&mut self, handle: NodeHandle, key: K) {
        let idx = handle.0;
        assert!(self.contains(handle), "decrease_key() on handle {} that is not queued", idx);

        let node = self.node_mut(idx);
        assert!(key <= node.key, "decrease_key() would increase the key of handle {}", idx);
        node.key = key;

        if node.prev.is_some() {
            self.cut(idx);
            self.root = self.merge(self.root, Some(idx));
        }
    }

    /// Remove an arbitrary queued entry. Returns `None` if the handle is not queued.
    pub fn delete(&mut self, handle: NodeHandle) -> Option<(K, T)> {
        let idx = handle.0;
        if !self.contains(handle) {
            return None;
        }
        if self.root == Some(idx) {
            return self.extract_min();
        }

        self.cut(idx);
        let subtree = self.two_pass_merge(idx);
        self.root = self.merge(self.root, subtree);
        self.len -= 1;
        Some(self.release(idx))
    }

    /// Drop every entry. Preallocated heaps keep their capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.nodes {
            *slot = None;
        }
        if self.mode == HeapMode::Dynamic {
            self.nodes.clear();
        }
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    fn node(&self, idx: usize) -> &Node<K, T> {
        self.nodes[idx].as_ref().expect("heap link points at an empty slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, T> {
        self.nodes[idx].as_mut().expect("heap link points at an empty slot")
    }

    fn release(&mut self, idx: usize) -> (K, T) {
        let node = self.nodes[idx].take().expect("released an empty slot");
        if self.mode == HeapMode::Dynamic {
            self.free.push(idx);
        }
        (node.key, node.payload)
    }

    fn merge(&mut self, a: Option<usize>, b: Option<usize>) -> Option<usize> {
        match (a, b) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => Some(self.link(a, b)),
        }
    }

    /// Make the root with the larger key the first child of the other.
    /// Equal keys keep `a` on top.
    fn link(&mut self, a: usize, b: usize) -> usize {
        let (winner, loser) = if self.node(b).key < self.node(a).key {
            (b, a)
        } else {
            (a, b)
        };

        let old_child = self.node(winner).child;
        {
            let l = self.node_mut(loser);
            l.prev = Some(winner);
            l.next = old_child;
        }
        if let Some(c) = old_child {
            self.node_mut(c).prev = Some(loser);
        }

        let w = self.node_mut(winner);
        w.child = Some(loser);
        w.prev = None;
        w.next = None;
        winner
    }

    /// Splice a node (with its subtree) out of its sibling list.
    fn cut(&mut self, idx: usize) {
        let (prev, next) = {
            let n = self.node(idx);
            (n.prev.expect("cut() on a root node"), n.next)
        };

        if self.node(prev).child == Some(idx) {
            self.node_mut(prev).child = next;
        } else {
            self.node_mut(prev).next = next;
        }
        if let Some(nx) = next {
            self.node_mut(nx).prev = Some(prev);
        }

        let n = self.node_mut(idx);
        n.prev = None;
        n.next = None;
    }

    /// Detach the children of `idx` and combine them into a single tree.
    ///
    /// First pass merges children pairwise left to right, stacking the
    /// results; second pass folds the stack back into one root.
    fn two_pass_merge(&mut self, idx: usize) -> Option<usize> {
        let first = self.node_mut(idx).child.take()?;

        let mut stack: Option<usize> = None;
        let mut cursor = Some(first);
        while let Some(a) = cursor {
            let Some(b) = self.node(a).next else {
                break;
            };
            let rest = self.node(b).next;
            let merged = self.link(a, b);
            self.node_mut(merged).next = stack;
            stack = Some(merged);
            cursor = rest;
        }
        if let Some(odd) = cursor {
            self.node_mut(odd).next = stack;
            stack = Some(odd);
        }

        let mut acc = stack.expect("two_pass_merge() with at least one child");
        while let Some(b) = self.node(acc).next {
            let rest = self.node(b).next;
            acc = self.link(acc, b);
            self.node_mut(acc).next = rest;
        }

        let root = self.node_mut(acc);
        root.prev = None;
        root.next = None;
        Some(acc)
    }
}

impl<K: Ord + Copy, T> Default for PairingHeap<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
