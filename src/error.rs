//! Errors reported by [`AvlMap`](crate::AvlMap).

use thiserror::Error;

/// Returned by strict lookups such as [`AvlMap::try_get`](crate::AvlMap::try_get) when the
/// requested key is not in the map.
///
/// `insert` and `remove` never produce this: inserting always succeeds and removing an absent
/// key is a no-op.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("key not found")]
pub struct KeyError;

/// A structural problem found by [`AvlMap::check_invariants`](crate::AvlMap::check_invariants).
///
/// A correctly functioning map never produces one of these. Nodes are identified by their
/// position in an in-order walk of the tree (0 is the smallest key).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    /// A key is not strictly between the keys of its ancestors.
    #[error("node {0} breaks the search tree ordering")]
    Ordering(usize),
    /// A child does not point back at the node that owns it.
    #[error("node {0} has a parent link that does not match its position")]
    ParentLink(usize),
    /// The stored balance factor disagrees with the measured subtree heights.
    #[error("node {index} stores balance {stored} but its subtrees measure {measured}")]
    BalanceMismatch {
        /// In-order position of the node.
        index: usize,
        /// The balance factor kept in the node.
        stored: i8,
        /// `height(right) - height(left)` as measured.
        measured: isize,
    },
    /// The balance factor is outside of `-1..=1`.
    #[error("node {index} is unbalanced ({balance})")]
    Unbalanced {
        /// In-order position of the node.
        index: usize,
        /// The offending balance factor.
        balance: i8,
    },
    /// The number of reachable nodes disagrees with the tracked length.
    #[error("{reachable} nodes are reachable from the root but the map holds {len}")]
    Length {
        /// Nodes found by walking from the root.
        reachable: usize,
        /// Entries the map believes it holds.
        len: usize,
    },
}
