//! A generalized suffix tree over sequences of arbitrary hashable
//! symbols.
//!
//! The tree indexes any number of labeled sequences at once: a unique
//! end-marker is appended to each, and every suffix of every sequence is
//! a root-to-leaf path. On top of that single structure the crate
//! answers substring queries, longest-common-substring tables, maximal
//! repeats, and constant-time lowest-common-ancestor queries.
//!
//! Three construction algorithms are provided and build identical trees:
//! McCreight (the default) and Ukkonen in linear time, plus a quadratic
//! naive builder kept as a testing oracle. See [`BuilderKind`].
//!
//! Symbols only need `Eq + Hash + Clone`; sequences of `char`, bytes,
//! integers, or any custom type work alike.
//!
//! ```
//! use gstree::Tree;
//!
//! let mut tree = Tree::new();
//! tree.add("A", "xabxac".chars()).unwrap();
//! tree.add("B", "awyawxawxz".chars()).unwrap();
//!
//! assert!(tree.find("abx".chars()));
//! assert!(!tree.find("abc".chars()));
//!
//! // every occurrence of "xa", as (id, suffix path) pairs
//! let mut hits: Vec<String> = tree
//!     .find_all("xa".chars())
//!     .map(|(id, path)| format!("{}: {}", id, path))
//!     .collect();
//! hits.sort();
//! assert_eq!(hits, [
//!     "A: x a b x a c $",
//!     "A: x a c $",
//!     "B: x a w x z $",
//! ]);
//! ```
//!
//! Building from a mapping and asking for the longest substrings common
//! to at least `k` of the sequences:
//!
//! ```
//! use gstree::Tree;
//!
//! let tree = Tree::from_mapping([
//!     ("A", "sandollar".chars()),
//!     ("B", "sandlot".chars()),
//!     ("C", "handler".chars()),
//!     ("D", "grand".chars()),
//!     ("E", "pantry".chars()),
//! ])
//! .unwrap();
//!
//! let lengths: Vec<(usize, usize)> = tree
//!     .common_substrings(2)
//!     .map(|(k, len, _path)| (k, len))
//!     .collect();
//! assert_eq!(lengths, [(2, 4), (3, 3), (4, 3), (5, 2)]);
//! ```

pub mod builder;
pub mod error;
pub mod node;
pub mod path;
pub mod tree;

mod display;
mod lca;
mod util;

pub use crate::builder::BuilderKind;
pub use crate::error::Error;
pub use crate::node::{Node, NodeId, NodeKind};
pub use crate::path::{Path, Symbol};
pub use crate::tree::Tree;
