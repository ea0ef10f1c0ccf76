//! McCreight's linear-time construction.
//!
//! Suffixes are inserted longest first. Step `i` scans suffix `i` not
//! from the root but from the suffix-link target of the previous head
//! (the node spelling the previous head minus its first symbol), which is
//! guaranteed to be a prefix of the current head. After the new leaf is
//! attached, the head's own suffix link is resolved by hopping to the
//! parent's link target and *rescanning*: walking down by edge lengths
//! alone, since every symbol on that stretch is already known to be in
//! the tree. Only the final scan compares symbols.

use std::hash::Hash;
use std::rc::Rc;

use log::debug;

use crate::node::{NodeId, AUX, ROOT};
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

    // locus the next scan starts from; its string is a known prefix of
    // the suffix about to be inserted
    let mut node = ROOT;

    for start in 0..end {
        let (found, matched, mid_edge) = tree.find_path(node, &buf, start);
        let head = match mid_edge {
            Some(child) => tree.split_edge(found, matched, child),
            None => found,
        };

        let leaf = tree.new_leaf(
            head,
            id.clone(),
            Path::closed(Rc::clone(&buf), seq, start, end),
        );
        tree.add_child(head, leaf);
        debug!("suffix {}: head {} (depth {}), leaf {}", start, head, matched, leaf);

        let link = match tree.suffix_link(head) {
            Some(link) => link,
            None => {
                let target = rescan_link(tree, head);
                tree.set_suffix_link(head, target);
                target
            }
        };
        node = if link == AUX { ROOT } else { link };
    }
}

/// Resolve the suffix link of a freshly found head.
///
/// Hop to the parent's link target and walk back down to one less than
/// the head's depth. The walk compares edge *lengths* only, branching by
/// the single symbol of the head's path at each node. If the target
/// depth falls inside an edge, that edge is split and the new node is
/// the link target.
fn rescan_link<I, S>(tree: &mut Tree<I, S>, head: NodeId) -> NodeId
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    let target_depth = tree.string_depth(head) - 1;
    let parent = tree.node(head).parent.expect("head is below the root");
    let mut f = tree
        .suffix_link(parent)
        .expect("all earlier heads have resolved suffix links");
    if f == AUX {
        // from aux, any symbol leads back to the root
        f = ROOT;
    }
    while tree.string_depth(f) < target_depth {
        let branch = tree.node(head).path.get(tree.string_depth(f) + 1).clone();
        f = *tree
            .node(f)
            .children()
            .expect("rescan stays on internal nodes")
            .get(&branch)
            .expect("rescanned symbols are present in the tree");
    }
    if tree.string_depth(f) > target_depth {
        let above = tree.node(f).parent.expect("overshot node has a parent");
        f = tree.split_edge(above, target_depth, f);
    }
    debug!("rescan for head {} ended at {}", head, f);
    f
}
