//! The plain binary search tree underneath [`AvlMap`](crate::AvlMap).
//!
//! Nodes live in an arena (a `Vec` of slots) and refer to each other by [`NodeId`]. A node's
//! `parent` is only ever used to walk upwards; ownership of every node belongs to the arena, so
//! rotating or swapping nodes can never leave a dangling parent behind.
//!
//! Nothing in here knows how to keep the tree balanced. The only balancing-related thing a
//! node carries is its `balance` factor, which this layer stores but never interprets.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// The position of a node in a [`RawTree`]'s arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// `height(right) - height(left)`. A leaf has a balance of 0.
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            balance: 0,
        }
    }
}

/// An unbalanced binary search tree with parent links.
#[derive(Clone, Debug)]
pub(crate) struct RawTree<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    /// Slots emptied by [`RawTree::release`], reused before the arena grows.
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> Default for RawTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<NodeId> for RawTree<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.0]
            .as_ref()
            .expect("NodeId refers to a released node")
    }
}

impl<K, V> IndexMut<NodeId> for RawTree<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.0]
            .as_mut()
            .expect("NodeId refers to a released node")
    }
}

impl<K, V> RawTree<K, V> {
    pub(crate) fn new() -> Self {
        RawTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        if let Some(root) = root {
            self[root].parent = None;
        }
        self.root = root;
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Creates a detached node with a balance of 0. The caller is responsible for linking it
    /// into the tree.
    pub(crate) fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        let node = Node::new(key, value, parent);
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Destroys a node that has already been unlinked from the tree and hands back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let node = self.slots[id.0]
            .take()
            .expect("released a node twice");
        self.free.push(id);
        self.len -= 1;
        (node.key, node.value)
    }

    /// Locates the node holding `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self[id];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    pub(crate) fn is_left_child(&self, id: NodeId) -> bool {
        self[id]
            .parent
            .map_or(false, |parent| self[parent].left == Some(id))
    }

    /// Points whatever referenced `old` (its parent's child link, or the root) at `new`, and
    /// makes `new`'s parent `old`'s parent. `old`'s own links are left untouched.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self[old].parent;
        if let Some(new) = new {
            self[new].parent = parent;
        }
        match parent {
            None => self.root = new,
            Some(parent) if self[parent].left == Some(old) => self[parent].left = new,
            Some(parent) => self[parent].right = new,
        }
    }

    pub(crate) fn min_in(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn max_in(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    pub(crate) fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.min_in(root))
    }

    pub(crate) fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.max_in(root))
    }

    /// The node with the largest key smaller than `id`'s key.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self[id].left {
            return Some(self.max_in(left));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].right == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self[p].parent;
        }
        None
    }

    /// The node with the smallest key larger than `id`'s key.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self[id].right {
            return Some(self.min_in(right));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self[p].parent;
        }
        None
    }

    /// Exchanges the tree positions of `a` and `b`: each node takes over the other's parent and
    /// children (and the root, if either was the root). Keys, values and balance factors stay
    /// with their nodes, so this temporarily breaks the search tree ordering.
    ///
    /// Works for any two distinct nodes, including a parent and its direct child.
    pub(crate) fn swap(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }

        let (pa, la, ra) = (self[a].parent, self[a].left, self[a].right);
        let (pb, lb, rb) = (self[b].parent, self[b].left, self[b].right);
        let a_was_left = self.is_left_child(a);
        let b_was_left = self.is_left_child(b);

        // Links that pointed at one of the pair must now point at the other.
        let other = |link: Option<NodeId>| match link {
            Some(n) if n == a => Some(b),
            Some(n) if n == b => Some(a),
            link => link,
        };

        {
            let node = &mut self[a];
            node.parent = other(pb);
            node.left = other(lb);
            node.right = other(rb);
        }
        {
            let node = &mut self[b];
            node.parent = other(pa);
            node.left = other(la);
            node.right = other(ra);
        }

        for (id, was_left) in [(a, b_was_left), (b, a_was_left)] {
            let (left, right) = (self[id].left, self[id].right);
            for child in [left, right].into_iter().flatten() {
                self[child].parent = Some(id);
            }
            let parent = self[id].parent;
            match parent {
                None => self.root = Some(id),
                // Already relinked above.
                Some(parent) if parent == a || parent == b => {}
                Some(parent) if was_left => self[parent].left = Some(id),
                Some(parent) => self[parent].right = Some(id),
            }
        }
    }

    /// The number of levels below and including `id`; 0 for an empty subtree.
    #[cfg(test)]
    pub(crate) fn height_of(&self, id: Option<NodeId>) -> usize {
        match id {
            None => 0,
            Some(id) => {
                let node = &self[id];
                1 + self.height_of(node.left).max(self.height_of(node.right))
            }
        }
    }

    /// Checks whether every leaf sits at the same depth. An empty tree has no paths at all and
    /// does not count as having equal paths.
    pub(crate) fn leaves_at_equal_depth(&self) -> bool {
        fn check<K, V>(
            tree: &RawTree<K, V>,
            id: Option<NodeId>,
            depth: usize,
            leaf_depth: &mut Option<usize>,
        ) -> bool {
            let Some(id) = id else {
                return true;
            };
            let node = &tree[id];
            if node.left.is_none() && node.right.is_none() {
                return *leaf_depth.get_or_insert(depth) == depth;
            }
            check(tree, node.left, depth + 1, leaf_depth)
                && check(tree, node.right, depth + 1, leaf_depth)
        }

        self.root.is_some() && check(self, self.root, 0, &mut None)
    }
}
