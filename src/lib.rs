//! An ordered map built on a self-balancing Binary Search Tree (BST), specifically an AVL tree.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for keys in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`).
//!
//! ## AVL trees
//!
//! An AVL tree additionally records a _balance factor_ in every `Node`: the height of its right
//! subtree minus the height of its left subtree. After every insert and delete the tree is
//! repaired with rotations so that every balance factor is -1, 0, or 1. That keeps the height
//! below roughly `1.44 * lg(N + 2)` for `N` nodes, so every operation is `O(lg N)`.
//!
//! # Examples
//!
//! ```
//! use avl_bst::AvlMap;
//!
//! let mut map = AvlMap::new();
//! for key in 1..=7 {
//!     map.insert(key, key * 10);
//! }
//!
//! // Ascending inserts still give a tree of height 3.
//! assert_eq!(map.height(), 3);
//! assert_eq!(map.remove(&4), Some(40));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 5, 6, 7]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod error;
pub mod iter;
mod raw;


pub use avl::AvlMap;
pub use error::{InvariantError, KeyError};
