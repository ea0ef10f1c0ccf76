//! Constant-time lowest common ancestor queries.
//!
//! The tree LCA problem reduces to range-minimum over the depth sequence
//! of an Euler tour: a DFS that records a node when it is entered and
//! again after each child returns. The LCA of two nodes is the shallowest
//! tour entry between their first occurrences. A sparse table over the
//! tour depths answers that range query in O(1) after O(N log N)
//! preprocessing.

use std::hash::Hash;

use log::debug;

use crate::node::{NodeId, ROOT};
use crate::tree::Tree;

#[derive(Debug)]
pub(crate) struct Lca {
    /// Euler tour of the tree, length `2N - 1`.
    tour: Vec<NodeId>,
    /// Tree depth (edges from the root) at each tour position.
    depth: Vec<u32>,
    /// First tour position of each node, indexed by `NodeId`.
    first: Vec<usize>,
    /// `sparse[j][i]` is the tour position of the minimum depth in
    /// `[i, i + 2^j)`.
    sparse: Vec<Vec<usize>>,
}

struct Frame {
    node: NodeId,
    depth: u32,
    children: Vec<NodeId>,
    next: usize,
}

impl Lca {
    pub(crate) fn prepare<I, S>(tree: &Tree<I, S>) -> Self
    where
        I: Eq + Hash + Clone,
        S: Eq + Hash + Clone,
    {
        let slots = tree.nodes.len();
        let mut first = vec![usize::MAX; slots];
        let mut tour = Vec::with_capacity(2 * slots);
        let mut depth = Vec::with_capacity(2 * slots);

        let mut emit = |n: NodeId, d: u32, tour: &mut Vec<NodeId>, depths: &mut Vec<u32>| {
            if first[n] == usize::MAX {
                first[n] = tour.len();
            }
            tour.push(n);
            depths.push(d);
        };

        let collect = |n: NodeId| -> Vec<NodeId> {
            tree.node(n)
                .children()
                .map(|c| c.values().copied().collect())
                .unwrap_or_default()
        };

        emit(ROOT, 0, &mut tour, &mut depth);
        let mut stack = vec![Frame {
            node: ROOT,
            depth: 0,
            children: collect(ROOT),
            next: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.children.len() {
                let child = frame.children[frame.next];
                frame.next += 1;
                let d = frame.depth + 1;
                emit(child, d, &mut tour, &mut depth);
                stack.push(Frame {
                    node: child,
                    depth: d,
                    children: collect(child),
                    next: 0,
                });
            } else {
                stack.pop();
                if let Some(parent) = stack.last() {
                    emit(parent.node, parent.depth, &mut tour, &mut depth);
                }
            }
        }
        debug!("euler tour of {} entries over {} nodes", tour.len(), slots - 1);

        let sparse = build_sparse(&tour, &depth);
        Lca {
            tour,
            depth,
            first,
            sparse,
        }
    }

    /// The lowest common ancestor of `x` and `y`. Both must be reachable
    /// from the root.
    pub(crate) fn query(&self, x: NodeId, y: NodeId) -> NodeId {
        if x == y {
            return x;
        }
        let (mut lo, mut hi) = (self.first[x], self.first[y]);
        debug_assert!(
            lo != usize::MAX && hi != usize::MAX,
            "lca query on a node outside the tree"
        );
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let span = hi - lo + 1;
        let j = (usize::BITS - 1 - span.leading_zeros()) as usize;
        let a = self.sparse[j][lo];
        let b = self.sparse[j][hi + 1 - (1 << j)];
        self.tour[if self.depth[a] <= self.depth[b] { a } else { b }]
    }
}

fn build_sparse(tour: &[NodeId], depth: &[u32]) -> Vec<Vec<usize>> {
    let len = tour.len();
    let mut sparse = vec![(0..len).collect::<Vec<usize>>()];
    let mut j = 1;
    while (1usize << j) <= len {
        let width = 1usize << j;
        let prev = &sparse[j - 1];
        let mut level = Vec::with_capacity(len - width + 1);
        for i in 0..=(len - width) {
            let a = prev[i];
            let b = prev[i + width / 2];
            level.push(if depth[a] <= depth[b] { a } else { b });
        }
        sparse.push(level);
        j += 1;
    }
    sparse
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::Tree;

    #[test]
    fn test_consecutive_tour_depths_differ_by_one() {
        let mut tree = Tree::new();
        tree.add("A", "xabxac".chars()).unwrap();
        tree.add("B", "awyawxawxz".chars()).unwrap();
        let lca = Lca::prepare(&tree);
        assert_eq!(lca.tour.len(), 2 * tree.node_count() - 1);
        for w in lca.depth.windows(2) {
            let diff = w[0].abs_diff(w[1]);
            assert_eq!(diff, 1, "tour depths must change by exactly one");
        }
    }

    #[test]
    fn test_query_against_parent_walk() {
        let mut tree = Tree::new();
        tree.add("A", "xabxac".chars()).unwrap();
        let lca = Lca::prepare(&tree);
        // collect every reachable node
        let mut nodes = Vec::new();
        tree.pre_order(tree.root(), |n| nodes.push(n));
        for &x in &nodes {
            for &y in &nodes {
                let expected = slow_lca(&tree, x, y);
                assert_eq!(lca.query(x, y), expected, "lca({}, {})", x, y);
            }
        }
    }

    fn ancestors<I, S>(tree: &Tree<I, S>, mut n: NodeId) -> Vec<NodeId>
    where
        I: Eq + std::hash::Hash + Clone,
        S: Eq + std::hash::Hash + Clone,
    {
        let mut chain = vec![n];
        while let Some(p) = tree.node(n).parent {
            chain.push(p);
            n = p;
        }
        chain
    }

    fn slow_lca<I, S>(tree: &Tree<I, S>, x: NodeId, y: NodeId) -> NodeId
    where
        I: Eq + std::hash::Hash + Clone,
        S: Eq + std::hash::Hash + Clone,
    {
        let up: Vec<NodeId> = ancestors(tree, x);
        let seen: std::collections::HashSet<NodeId> = up.into_iter().collect();
        for a in ancestors(tree, y) {
            if seen.contains(&a) {
                return a;
            }
        }
        unreachable!("both nodes hang below the root")
    }
}
