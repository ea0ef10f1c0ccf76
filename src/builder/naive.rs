//! Quadratic-time construction.
//!
//! Every suffix is located by scanning from the root, splitting the edge
//! the match ends inside of and attaching a new leaf. No suffix links
//! are built or used. This is the oracle the linear-time builders are
//! tested against.

use std::hash::Hash;
use std::rc::Rc;

use log::debug;

use crate::node::ROOT;
use crate::path::Path;
use crate::tree::Tree;

pub(crate) fn build<I, S>(tree: &mut Tree<I, S>, seq: usize)
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    let buf = Rc::clone(&tree.seqs[seq].buf);
    let id = tree.seqs[seq].id.clone();
    let end = buf.len();

    for start in 0..end {
        let (node, matched, child) = tree.find_path(ROOT, &buf, start);
        let node = match child {
            Some(child) => tree.split_edge(node, matched, child),
            None => node,
        };
        // the end-marker guarantees no suffix is a prefix of another, so
        // there is always an unmatched remainder to hang the leaf on
        debug_assert!(start + matched < end);
        let leaf = tree.new_leaf(
            node,
            id.clone(),
            Path::closed(Rc::clone(&buf), seq, start, end),
        );
        tree.add_child(node, leaf);
        debug!("attached leaf {} for suffix {} below node {}", leaf, start, node);
    }
}
