//! Debug-build structural validation.
//!
//! After every `add`, debug builds walk the whole tree and abort with a
//! diagnostic if any structural property no longer holds. Release builds
//! never run these checks.

use std::hash::Hash;

use hashbrown::HashSet;

use crate::builder::BuilderKind;
use crate::node::{AUX, ROOT};
use crate::tree::Tree;

/// Panic if any structural property of the tree is violated.
pub(crate) fn validate<I, S>(tree: &Tree<I, S>)
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    assert_eq!(
        tree.node(ROOT).suffix_link(),
        Some(AUX),
        "root suffix link must point to aux"
    );

    let mut reachable = Vec::new();
    tree.pre_order(ROOT, |n| reachable.push(n));

    for &n in &reachable {
        let node = tree.node(n);
        let depth = node.string_depth();

        if let Some(children) = node.children() {
            if n != ROOT && children.len() < 2 {
                panic!("internal node {} has fewer than two children", n);
            }
            for (key, &child) in children {
                let child_node = tree.node(child);
                if child_node.string_depth() <= depth {
                    panic!("child {} of node {} is not deeper than its parent", child, n);
                }
                if child_node.path.get(depth) != key {
                    panic!(
                        "child {} of node {} is keyed by a symbol that is not its edge head",
                        child, n
                    );
                }
                if child_node.parent != Some(n) {
                    panic!("parent back-reference of {} does not point to {}", child, n);
                }
                for d in 0..depth {
                    if child_node.path.get(d) != node.path.get(d) {
                        panic!(
                            "representative path of {} diverges from its parent {} at depth {}",
                            child, n, d
                        );
                    }
                }
            }
            if n != ROOT {
                // internal node strings never contain an end-marker
                for d in 0..depth {
                    if node.path.get(d).is_marker() {
                        panic!("internal node {} spells an end-marker at depth {}", n, d);
                    }
                }
                // the naive builder maintains no suffix links; the
                // linear-time builders must leave none dangling
                match node.suffix_link() {
                    Some(link) => {
                        let target = tree.node(link);
                        if target.string_depth() + 1 != depth {
                            panic!("suffix link of node {} lands at the wrong depth", n);
                        }
                        for d in 0..target.string_depth() {
                            if target.path.get(d) != node.path.get(d + 1) {
                                panic!("suffix link of node {} points to the wrong string", n);
                            }
                        }
                    }
                    None if tree.builder != BuilderKind::Naive => {
                        panic!("internal node {} has no suffix link", n)
                    }
                    None => {}
                }
            }
        }
    }

    // one leaf per (sequence, position), spelling the suffix plus marker
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for &n in &reachable {
        let node = tree.node(n);
        if node.is_leaf() && !seen.insert((node.path.seq, node.path.start)) {
            panic!(
                "duplicate leaf for sequence {} position {}",
                node.path.seq, node.path.start
            );
        }
    }
    let total: usize = tree.seqs.iter().map(|s| s.buf.len()).sum();
    if seen.len() != total {
        panic!(
            "leaf coverage broken: {} leaves for {} suffix positions",
            seen.len(),
            total
        );
    }
    for (ord, entry) in tree.seqs.iter().enumerate() {
        for i in 0..entry.buf.len() {
            let (node, matched, mid_edge) = tree.find_path(ROOT, &entry.buf, i);
            if matched != entry.buf.len() - i {
                panic!("suffix {} of sequence {} is not spelled by the tree", i, ord);
            }
            if mid_edge.is_some() || !tree.node(node).is_leaf() {
                panic!("suffix {} of sequence {} does not end at a leaf", i, ord);
            }
        }
    }

    if tree.node_count() > 2 * total {
        panic!(
            "node count {} exceeds twice the total sequence length {}",
            tree.node_count(),
            2 * total
        );
    }
}
