//! A self-balancing ordered map (specifically, an AVL tree).
//!
//! # Examples
//!
//! ```
//! use avl_bst::AvlMap;
//!
//! let mut map = AvlMap::new();
//!
//! // Nothing in here yet.
//! assert_eq!(map.get(&1), None);
//!
//! map.insert(1, 2);
//! assert_eq!(map.get(&1), Some(&2));
//!
//! // Inserting a new value for the same key overwrites the value.
//! map.insert(1, 3);
//! assert_eq!(map.get(&1), Some(&3));
//!
//! // Removing a key hands back its value.
//! assert_eq!(map.remove(&1), Some(3));
//! assert_eq!(map.get(&1), None);
//!
//! // Removing it again does nothing.
//! assert_eq!(map.remove(&1), None);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::Index;

use log::{debug, trace};

use crate::error::{InvariantError, KeyError};
use crate::iter::{Iter, Keys, Values};
use crate::raw::{NodeId, RawTree};

/// An ordered map backed by an AVL tree. Every node keeps a balance factor
/// (`height(right) - height(left)`) which is kept within `-1..=1` after every insert and remove,
/// so lookups, inserts, and removes all take `O(lg N)` time.
#[derive(Clone)]
pub struct AvlMap<K, V> {
    tree: RawTree<K, V>,
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for AvlMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> AvlMap<K, V> {
    /// Generate a new, empty `AvlMap`.
    pub fn new() -> Self {
        Self {
            tree: RawTree::new(),
        }
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.root().is_none()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// The number of levels in the tree, 0 when the map is empty.
    ///
    /// This follows the taller child at every level, so it takes `O(lg N)` time.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::AvlMap;
    ///
    /// let map: AvlMap<_, _> = (1..=7).map(|k| (k, ())).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.tree.root();
        while let Some(id) = current {
            height += 1;
            let node = &self.tree[id];
            current = if node.balance > 0 {
                node.right
            } else {
                node.left
            };
        }
        height
    }

    /// Potentially finds the value associated with the given key. If no node has the
    /// corresponding key, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 2);
    ///
    /// assert_eq!(map.get(&1), Some(&2));
    /// assert_eq!(map.get(&42), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|id| &self.tree[id].value)
    }

    /// Like [`AvlMap::get`] but hands out a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.tree.find(key)?;
        Some(&mut self.tree[id].value)
    }

    /// Strict lookup: the key must be present.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the map does not contain `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::{AvlMap, KeyError};
    ///
    /// let mut map = AvlMap::new();
    /// map.insert("a", 1);
    ///
    /// assert_eq!(map.try_get("a"), Ok(&1));
    /// assert_eq!(map.try_get("b"), Err(KeyError));
    /// ```
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, KeyError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(KeyError)
    }

    /// Whether the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// The entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|id| {
            let node = &self.tree[id];
            (&node.key, &node.value)
        })
    }

    /// The entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|id| {
            let node = &self.tree[id];
            (&node.key, &node.value)
        })
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Iterates over the values in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Whether every leaf of the tree sits at the same depth. An empty map has no leaves and
    /// returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert!(!map.leaves_at_equal_depth());
    ///
    /// map.extend([(2, ()), (1, ()), (3, ())]);
    /// assert!(map.leaves_at_equal_depth());
    ///
    /// map.insert(4, ());
    /// assert!(!map.leaves_at_equal_depth());
    /// ```
    pub fn leaves_at_equal_depth(&self) -> bool {
        self.tree.leaves_at_equal_depth()
    }

    /// Inserts the given value into the map at the given key. Inserting a new value for an
    /// existing key overwrites its value and returns the old one; the shape of the tree does not
    /// change in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    ///
    /// assert_eq!(map.insert(1, 2), None);
    /// assert_eq!(map.get(&1), Some(&2));
    ///
    /// assert_eq!(map.insert(1, 3), Some(2));
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let Some(mut current) = self.tree.root() else {
            let root = self.tree.alloc(key, value, None);
            self.tree.set_root(Some(root));
            debug!("inserted {root:?} as the root");
            return None;
        };

        let (parent, ordering) = loop {
            let node = &mut self.tree[current];
            let ordering = key.cmp(&node.key);
            let next = match ordering {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
                Ordering::Greater => node.right,
            };
            match next {
                Some(next) => current = next,
                None => break (current, ordering),
            }
        };

        let new = self.tree.alloc(key, value, Some(parent));
        if ordering == Ordering::Less {
            self.tree[parent].left = Some(new);
        } else {
            self.tree[parent].right = Some(new);
        }
        trace!("attached {new:?} below {parent:?}");

        self.rebalance_insert(new);
        None
    }

    /// Removes the node containing the given key from the map and returns its value. If the map
    /// does not contain the key, nothing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_bst::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 2);
    ///
    /// assert_eq!(map.remove(&1), Some(2));
    /// assert_eq!(map.get(&1), None);
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Like [`AvlMap::remove`] but also hands back the stored key.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.tree.find(key)?;

        // Move the doomed node somewhere it has at most one child. Its predecessor is the
        // rightmost node of its left subtree and so has no right child.
        if self.tree[id].left.is_some() && self.tree[id].right.is_some() {
            let predecessor = self
                .tree
                .predecessor(id)
                .expect("a node with a left child has a predecessor");
            debug!("swapping {id:?} with its predecessor {predecessor:?} before removal");
            self.swap_nodes(id, predecessor);
        }

        let node = &self.tree[id];
        let child = node.left.or(node.right);
        let parent = node.parent;
        // The side we splice out gets shorter.
        let delta = if self.tree.is_left_child(id) { 1 } else { -1 };

        self.tree.replace_child(id, child);
        let entry = self.tree.release(id);
        debug!("released {id:?}");

        if parent.is_some() {
            self.rebalance_remove(parent, delta);
        }
        Some(entry)
    }

    /// Walks up from a freshly attached leaf, updating balance factors until either a subtree
    /// is found whose height did not change or a rotation restores the height it had before the
    /// insert.
    fn rebalance_insert(&mut self, mut node: NodeId) {
        let mut parent = self.tree[node].parent;

        while let Some(p) = parent {
            let delta = if self.tree[p].left == Some(node) { -1 } else { 1 };
            self.tree[p].balance += delta;
            let balance = self.tree[p].balance;
            trace!("insert walk: {p:?} now has balance {balance}");

            match balance {
                0 => break,
                -1 | 1 => {}
                -2 => {
                    if self.tree[node].balance == 1 {
                        self.rotate_left(node);
                    }
                    self.rotate_right(p);
                    break;
                }
                2 => {
                    if self.tree[node].balance == -1 {
                        self.rotate_right(node);
                    }
                    self.rotate_left(p);
                    break;
                }
                balance => unreachable!("balance factor {balance} during insert"),
            }

            node = p;
            parent = self.tree[p].parent;
        }
    }

    /// Walks up from the parent of a removed node. `delta` is `+1` if the left side of `node`
    /// got shorter and `-1` if the right side did.
    ///
    /// Unlike inserting, landing on a balance of 0 means the subtree lost a level and the walk
    /// has to keep going. It stops on ±1, or after a single rotation around a child that was
    /// itself balanced, since the subtree height is then unchanged.
    fn rebalance_remove(&mut self, mut node: Option<NodeId>, mut delta: i8) {
        while let Some(n) = node {
            self.tree[n].balance += delta;
            let balance = self.tree[n].balance;
            trace!("remove walk: {n:?} now has balance {balance}");

            // The root of this subtree once any rotation is done.
            let mut top = n;
            match balance {
                -2 => {
                    let left = self.tree[n].left.expect("balance -2 implies a left child");
                    let left_balance = self.tree[left].balance;
                    if left_balance <= 0 {
                        self.rotate_right(n);
                        if left_balance == 0 {
                            self.debug_assert_settled(left);
                            break;
                        }
                        top = left;
                    } else {
                        let pivot = self.tree[left]
                            .right
                            .expect("a left child with balance 1 has a right child");
                        self.rotate_left(left);
                        self.rotate_right(n);
                        top = pivot;
                    }
                }
                2 => {
                    let right = self.tree[n].right.expect("balance 2 implies a right child");
                    let right_balance = self.tree[right].balance;
                    if right_balance >= 0 {
                        self.rotate_left(n);
                        if right_balance == 0 {
                            self.debug_assert_settled(right);
                            break;
                        }
                        top = right;
                    } else {
                        let pivot = self.tree[right]
                            .left
                            .expect("a right child with balance -1 has a left child");
                        self.rotate_right(right);
                        self.rotate_left(n);
                        top = pivot;
                    }
                }
                0 => {}
                _ => break,
            }

            self.debug_assert_settled(top);
            node = self.tree[top].parent;
            if node.is_some() {
                delta = if self.tree.is_left_child(top) { 1 } else { -1 };
            }
        }
    }

    /// Rotate `x` to the left. This moves its right child `y` up vertically and `x` down
    /// vertically. It must only be called when there _is_ a right child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a right child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///   Option<parent>            Option<parent>
    ///      /                         /
    ///     x                         y
    ///    / \                       / \
    ///   a   y       rotate ->     x   c
    ///      / \                   / \
    ///     b   c                 a   b
    /// ```
    ///
    /// The balance factors are derived from the old ones rather than by measuring heights.
    /// `x`'s new balance is computed first because `y`'s depends on it.
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.tree[x].right.expect("Rotate left => right child");
        let y_left = self.tree[y].left;
        trace!("rotating {x:?} left under {y:?}");

        self.tree.replace_child(x, Some(y));
        self.tree[y].left = Some(x);
        self.tree[x].parent = Some(y);
        self.tree[x].right = y_left;
        if let Some(b) = y_left {
            self.tree[b].parent = Some(x);
        }

        let x_balance = self.tree[x].balance;
        let y_balance = self.tree[y].balance;
        let (x_balance, y_balance) = if y_balance <= 0 {
            (x_balance - 1, y_balance - 1)
        } else {
            let x_balance = x_balance - 1 - y_balance;
            (x_balance, y_balance - 1 + x_balance.min(0))
        };
        self.set_rotated_balances(x, x_balance, y, y_balance);
    }

    /// Mirror image of [`AvlMap::rotate_left`]: the left child `y` moves up.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// ```text
    ///      Option<parent>         Option<parent>
    ///         /                      /
    ///        x                      y
    ///       / \                    / \
    ///      y   c    rotate ->     a   x
    ///     / \                        / \
    ///    a   b                      b   c
    /// ```
    fn rotate_right(&mut self, x: NodeId) {
        let y = self.tree[x].left.expect("Rotate right => left child");
        let y_right = self.tree[y].right;
        trace!("rotating {x:?} right under {y:?}");

        self.tree.replace_child(x, Some(y));
        self.tree[y].right = Some(x);
        self.tree[x].parent = Some(y);
        self.tree[x].left = y_right;
        if let Some(b) = y_right {
            self.tree[b].parent = Some(x);
        }

        let x_balance = self.tree[x].balance;
        let y_balance = self.tree[y].balance;
        let (x_balance, y_balance) = if y_balance >= 0 {
            (x_balance + 1, y_balance + 1)
        } else {
            let x_balance = x_balance + 1 - y_balance;
            (x_balance, y_balance + 1 + x_balance.max(0))
        };
        self.set_rotated_balances(x, x_balance, y, y_balance);
    }

    fn set_rotated_balances(&mut self, x: NodeId, x_balance: i8, y: NodeId, y_balance: i8) {
        if cfg!(debug_assertions) {
            assert!((-2..=2).contains(&x_balance), "{x:?} rotated to {x_balance}");
            assert!((-2..=2).contains(&y_balance), "{y:?} rotated to {y_balance}");
        }
        self.tree[x].balance = x_balance;
        self.tree[y].balance = y_balance;
    }

    /// Swaps the positions of two nodes and then their balance factors, so each balance factor
    /// stays with the position it describes.
    fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        self.tree.swap(a, b);
        let a_balance = self.tree[a].balance;
        self.tree[a].balance = self.tree[b].balance;
        self.tree[b].balance = a_balance;
    }

    fn debug_assert_settled(&self, id: NodeId) {
        if cfg!(debug_assertions) {
            let balance = self.tree[id].balance;
            assert!((-1..=1).contains(&balance), "{id:?} left at balance {balance}");
        }
    }

    /// Walks the entire tree and reports the first broken invariant: key ordering, parent
    /// links, balance factors matching the measured subtree heights, and balance factors
    /// within `-1..=1`.
    ///
    /// This takes `O(N)` time and is meant for tests.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found, in key order.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: Ord,
    {
        let mut visited = 0;
        self.check_subtree(self.tree.root(), None, None, None, &mut visited)?;
        if visited != self.len() {
            return Err(InvariantError::Length {
                reachable: visited,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Returns the measured height of the subtree at `id`.
    fn check_subtree<'a>(
        &'a self,
        id: Option<NodeId>,
        parent: Option<NodeId>,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        visited: &mut usize,
    ) -> Result<isize, InvariantError>
    where
        K: Ord,
    {
        let Some(id) = id else {
            return Ok(0);
        };
        let node = &self.tree[id];

        let left_height =
            self.check_subtree(node.left, Some(id), lower, Some(&node.key), visited)?;
        let index = *visited;
        *visited += 1;

        if node.parent != parent {
            return Err(InvariantError::ParentLink(index));
        }
        if lower.map_or(false, |lower| node.key <= *lower)
            || upper.map_or(false, |upper| node.key >= *upper)
        {
            return Err(InvariantError::Ordering(index));
        }

        let right_height =
            self.check_subtree(node.right, Some(id), Some(&node.key), upper, visited)?;
        let measured = right_height - left_height;
        if measured != isize::from(node.balance) {
            return Err(InvariantError::BalanceMismatch {
                index,
                stored: node.balance,
                measured,
            });
        }
        if !(-1..=1).contains(&node.balance) {
            return Err(InvariantError::Unbalanced {
                index,
                balance: node.balance,
            });
        }

        Ok(1 + left_height.max(right_height))
    }
}

impl<K, Q, V> Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// ## Panics
    ///
    /// When the key is not in the map. Use [`AvlMap::try_get`] for a non-panicking lookup.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> Extend<(K, V)> for AvlMap<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for AvlMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
