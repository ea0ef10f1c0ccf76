//! Ukkonen's on-line linear-time construction.
//!
//! The tree is extended one symbol per phase. The state between phases
//! is the active point, kept as Ukkonen's canonical reference pair
//! `(s, span)`: the closest explicit ancestor `s` plus the span of
//! symbols leading from it to the point where the next extension starts.
//! Leaves are created with an open end that tracks the shared phase
//! counter, so every existing leaf is extended by a single store per
//! phase; once the end-marker has been fed, the open ends are frozen and
//! the implicit tree is a true suffix tree.

use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

use log::debug;

use crate::node::{NodeId, AUX, ROOT};
use crate::path::{Path, Symbol};
use crate::tree::Tree;

/// Half-open range over the sequence currently being inserted.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub(crate) fn build<I, S>(tree: &mut Tree<I, S>, seq: usize)
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    let buf = Rc::clone(&tree.seqs[seq].buf);
    let id = tree.seqs[seq].id.clone();
    Ukkonen {
        tree,
        seq,
        id,
        e: Rc::new(Cell::new(0)),
        buf,
    }
    .run()
}

struct Ukkonen<'t, I, S> {
    tree: &'t mut Tree<I, S>,
    seq: usize,
    buf: Rc<Vec<Symbol<S>>>,
    id: I,
    /// The phase counter shared by all open leaf ends (Trick 3).
    e: Rc<Cell<usize>>,
}

impl<I, S> Ukkonen<'_, I, S>
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
{
    fn run(mut self) {
        let len = self.buf.len();
        let mut s = ROOT;
        let mut span = Span { start: 0, end: 1 };
        loop {
            self.e.set(span.end);
            (s, span) = self.update(s, span);
            (s, span) = self.canonize(s, span);
            if span.end == len {
                break;
            }
            span.end += 1;
        }
        self.tree.freeze_open_ends(len);
    }

    /// The transition from `s` that starts with the symbol at `k`,
    /// returned together with its edge viewed as a path. From aux, any
    /// symbol leads to the root while consuming itself.
    fn transition(&self, s: NodeId, k: usize) -> (NodeId, Path<S>) {
        if s == AUX {
            return (
                ROOT,
                Path::closed(Rc::clone(&self.buf), self.seq, k, k + 1),
            );
        }
        let child = *self
            .tree
            .node(s)
            .children()
            .expect("active node is internal")
            .get(&self.buf[k])
            .expect("transition taken during construction exists");
        let depth = self.tree.string_depth(s);
        (child, self.tree.node(child).path.from_depth(depth))
    }

    /// Canonize the reference pair: descend while whole edges fit into
    /// the span, so that the span is shorter than the next edge.
    fn canonize(&self, mut s: NodeId, mut span: Span) -> (NodeId, Span) {
        loop {
            if span.is_empty() {
                return (s, span);
            }
            let (next, edge) = self.transition(s, span.start);
            if edge.len() > span.len() {
                return (s, span);
            }
            span.start += edge.len();
            s = next;
        }
    }

    /// Test whether the canonical pair `(s, span)` is the endpoint, i.e.
    /// already has a `t`-transition. If not, make the state explicit by
    /// splitting the active edge when the span ends inside it, and
    /// return the explicit node.
    fn test_and_split(&mut self, s: NodeId, span: Span, t: &Symbol<S>) -> (bool, NodeId) {
        if !span.is_empty() {
            let (next, edge) = self.transition(s, span.start);
            if edge.get(span.len()) == t {
                return (true, s);
            }
            let depth = self.tree.string_depth(s) + span.len();
            let split = self.tree.split_edge(s, depth, next);
            (false, split)
        } else if s == AUX {
            (true, s)
        } else {
            let present = self
                .tree
                .node(s)
                .children()
                .map_or(false, |c| c.contains_key(t));
            (present, s)
        }
    }

    /// One phase: insert the transitions for symbol `span.end - 1` along
    /// the boundary path until the endpoint is reached (Trick 2), wiring
    /// suffix links between the internal nodes created on the way.
    fn update(&mut self, mut s: NodeId, span: Span) -> (NodeId, Span) {
        let t = self.buf[span.end - 1].clone();
        let mut act = Span {
            start: span.start,
            end: span.end - 1,
        };
        debug!("phase {}: extending at node {}", span.end - 1, s);

        let mut prev_split = ROOT;
        let (mut is_endpoint, mut r) = self.test_and_split(s, act, &t);
        while !is_endpoint {
            let leaf_start = (span.end - 1) - self.tree.string_depth(r);
            let path = Path::open(Rc::clone(&self.buf), self.seq, leaf_start, Rc::clone(&self.e));
            let leaf = self.tree.new_leaf(r, self.id.clone(), path);
            self.tree.add_child(r, leaf);
            debug!("added open leaf {} for suffix {} below {}", leaf, leaf_start, r);

            if prev_split != ROOT {
                self.tree.set_suffix_link(prev_split, r);
            }
            prev_split = r;

            let link = self
                .tree
                .suffix_link(s)
                .expect("active node carries a suffix link");
            (s, act) = self.canonize(link, act);
            (is_endpoint, r) = self.test_and_split(s, act, &t);
        }
        if prev_split != ROOT {
            self.tree.set_suffix_link(prev_split, s);
        }
        (
            s,
            Span {
                start: act.start,
                end: span.end,
            },
        )
    }
}
