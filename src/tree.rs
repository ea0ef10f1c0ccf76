use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::builder::{self, BuilderKind};
use crate::error::Error;
use crate::lca::Lca;
use crate::node::{Node, NodeKind, NodeId, AUX, ROOT};
use crate::path::{Path, Symbol};
use crate::util;

/// One stored sequence: the client id plus the shared symbol buffer with
/// the end-marker appended.
#[derive(Debug)]
pub(crate) struct SeqEntry<I, S> {
    pub id: I,
    pub buf: Rc<Vec<Symbol<S>>>,
}

/// A generalized suffix tree over sequences of hashable symbols.
///
/// Paths from the root spell every suffix of every added sequence, each
/// terminated by a per-sequence end-marker. The tree answers substring
/// queries (`find`, `find_id`, `find_all`), common-substring and
/// maximal-repeat queries, and constant-time LCA queries after a one-off
/// preparation.
///
/// ```
/// use gstree::Tree;
///
/// let mut tree = Tree::new();
/// tree.add("A", "xabxac".chars()).unwrap();
/// assert!(tree.find("abx".chars()));
/// assert!(!tree.find("abc".chars()));
/// ```
#[derive(Debug)]
pub struct Tree<I, S> {
    pub(crate) builder: BuilderKind,
    pub(crate) nodes: Vec<Node<I, S>>,
    pub(crate) seqs: Vec<SeqEntry<I, S>>,
    ids: HashMap<I, usize>,
    lca: Option<Lca>,
}

impl<I, S> Tree<I, S>
where
    I: Eq + std::hash::Hash + Clone,
    S: Eq + std::hash::Hash + Clone,
{
    /// An empty tree using the default builder (McCreight).
    pub fn new() -> Self {
        Self::with_builder(BuilderKind::default())
    }

    /// An empty tree using the given construction algorithm.
    pub fn with_builder(builder: BuilderKind) -> Self {
        let mut root = Node::internal(None, Path::empty());
        root.name = "root";
        let mut aux = Node::internal(None, Path::empty());
        aux.name = "aux";
        let mut nodes = vec![root, aux];
        nodes[ROOT].set_suffix_link(AUX);
        Tree {
            builder,
            nodes,
            seqs: Vec::new(),
            ids: HashMap::new(),
            lca: None,
        }
    }

    /// Build a tree from an `(id, sequence)` mapping with the default
    /// builder.
    pub fn from_mapping<M, T>(mapping: M) -> Result<Self, Error>
    where
        M: IntoIterator<Item = (I, T)>,
        T: IntoIterator<Item = S>,
    {
        Self::from_mapping_with(mapping, BuilderKind::default())
    }

    /// Build a tree from an `(id, sequence)` mapping with the given
    /// builder.
    pub fn from_mapping_with<M, T>(mapping: M, builder: BuilderKind) -> Result<Self, Error>
    where
        M: IntoIterator<Item = (I, T)>,
        T: IntoIterator<Item = S>,
    {
        let mut tree = Self::with_builder(builder);
        for (id, seq) in mapping {
            tree.add(id, seq)?;
        }
        Ok(tree)
    }

    /// Add a labeled sequence to the tree.
    ///
    /// The sequence is copied once, a unique end-marker is appended, and
    /// all of its suffixes are inserted by the configured builder. Any
    /// previous LCA preparation is invalidated.
    pub fn add<T: IntoIterator<Item = S>>(&mut self, id: I, seq: T) -> Result<(), Error> {
        if self.ids.contains_key(&id) {
            return Err(Error::DuplicateId);
        }
        let mut syms: Vec<Symbol<S>> = seq.into_iter().map(Symbol::Item).collect();
        if syms.is_empty() {
            return Err(Error::EmptySequence);
        }
        let ord = self.seqs.len();
        syms.push(Symbol::Marker(ord));
        let buf = Rc::new(syms);
        debug!("adding sequence {} ({} symbols)", ord, buf.len());
        self.seqs.push(SeqEntry {
            id: id.clone(),
            buf,
        });
        self.ids.insert(id, ord);

        let kind = self.builder;
        builder::build(self, kind, ord);

        self.lca = None;
        if cfg!(debug_assertions) {
            util::validate(self);
        }
        Ok(())
    }

    /// True iff `needle` is a substring of any stored sequence.
    pub fn find<T: IntoIterator<Item = S>>(&self, needle: T) -> bool {
        let needle: Vec<Symbol<S>> = needle.into_iter().map(Symbol::Item).collect();
        let (_, matched, _) = self.find_path(ROOT, &needle, 0);
        matched == needle.len()
    }

    /// True iff `needle` is a substring of the sequence stored under
    /// `id`. Errors if `id` was never added.
    pub fn find_id<T: IntoIterator<Item = S>>(&self, id: &I, needle: T) -> Result<bool, Error> {
        if !self.ids.contains_key(id) {
            return Err(Error::UnknownId);
        }
        let needle: Vec<Symbol<S>> = needle.into_iter().map(Symbol::Item).collect();
        let (node, matched, child) = self.find_path(ROOT, &needle, 0);
        if matched < needle.len() {
            return Ok(false);
        }
        let mut found = false;
        self.pre_order(child.unwrap_or(node), |n| {
            if !found {
                if let Some(leaf_id) = self.nodes[n].leaf_id() {
                    found = leaf_id == id;
                }
            }
        });
        Ok(found)
    }

    /// Every occurrence of `needle`, as `(sequence id, full suffix path)`
    /// pairs, one per leaf below the end of the match. The result is
    /// materialized, so it stays valid across later `add` calls.
    pub fn find_all<T: IntoIterator<Item = S>>(
        &self,
        needle: T,
    ) -> impl Iterator<Item = (I, Path<S>)> {
        let needle: Vec<Symbol<S>> = needle.into_iter().map(Symbol::Item).collect();
        let (node, matched, child) = self.find_path(ROOT, &needle, 0);
        let hits = if matched < needle.len() {
            Vec::new()
        } else {
            self.leaves_below(child.unwrap_or(node))
        };
        hits.into_iter()
    }

    /// For each `k` between `min_k` and the number of stored sequences,
    /// the longest substring occurring in at least `k` distinct
    /// sequences, as `(k, length, path)`.
    ///
    /// Candidates of equal depth are resolved by first-symbol-ascending
    /// pre-order: the first strictly deeper node wins. Entries for which
    /// no non-empty common substring exists are omitted.
    pub fn common_substrings(&self, min_k: usize) -> impl Iterator<Item = (usize, usize, Path<S>)>
    where
        S: Ord,
    {
        let min_k = min_k.max(2);
        let k_max = self.seqs.len();
        let c = self.compute_c();

        // deepest node per exact C value
        let mut best: HashMap<usize, (usize, Path<S>)> = HashMap::new();
        self.pre_order_sorted(ROOT, |n| {
            let node = &self.nodes[n];
            if n != ROOT && node.is_internal() {
                let sd = node.string_depth();
                let entry = best.entry(c[n]).or_insert_with(|| (0, Path::empty()));
                if sd > entry.0 {
                    *entry = (sd, node.path.clone());
                }
            }
        });

        // a substring common to k sequences is common to any k' < k, so
        // accumulate the maximum while walking k downwards
        let mut table = Vec::new();
        let mut max_len = 0;
        let mut max_path: Option<Path<S>> = None;
        for k in (min_k..=k_max).rev() {
            if let Some((len, path)) = best.get(&k) {
                if *len > max_len {
                    max_len = *len;
                    max_path = Some(path.clone());
                }
            }
            if let Some(path) = &max_path {
                table.push((k, max_len, path.clone()));
            }
        }
        table.reverse();
        table.into_iter()
    }

    /// All maximal repeats: `(C, path)` for every left-diverse internal
    /// node, where `C` is the number of distinct sequences below it.
    /// Order is unspecified.
    pub fn maximal_repeats(&self) -> impl Iterator<Item = (usize, Path<S>)> {
        let c = self.compute_c();
        let diverse = self.compute_left_diverse();
        let mut out = Vec::new();
        self.pre_order(ROOT, |n| {
            if n != ROOT && diverse[n] && self.nodes[n].is_internal() {
                out.push((c[n], self.nodes[n].path.clone()));
            }
        });
        out.into_iter()
    }

    /// Lowest common ancestor of two nodes. The first call after a
    /// mutation runs the Euler-tour preparation; afterwards each query is
    /// O(1).
    pub fn lca(&mut self, x: NodeId, y: NodeId) -> NodeId {
        self.prepare_lca();
        self.lca.as_ref().expect("lca prepared above").query(x, y)
    }

    /// Run the LCA preparation now instead of on the first query.
    pub fn prepare_lca(&mut self) {
        if self.lca.is_none() {
            let lca = Lca::prepare(self);
            self.lca = Some(lca);
        }
    }

    // ------------------------------------------------------------------
    // inspection
    // ------------------------------------------------------------------

    /// The root of the tree.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, n: NodeId) -> &Node<I, S> {
        &self.nodes[n]
    }

    /// Number of nodes reachable from the root (the aux node is not
    /// counted).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Number of stored sequences.
    pub fn sequence_count(&self) -> usize {
        self.seqs.len()
    }

    /// The incoming edge of a node as a path; empty for the root.
    pub fn edge(&self, n: NodeId) -> Path<S> {
        match self.nodes[n].parent {
            Some(parent) => self.nodes[n]
                .path
                .from_depth(self.nodes[parent].string_depth()),
            None => Path::empty(),
        }
    }

    /// The leaf representing the suffix of `id` starting at `start`.
    pub fn suffix_leaf(&self, id: &I, start: usize) -> Option<NodeId> {
        let ord = *self.ids.get(id)?;
        (0..self.nodes.len()).find(|&n| {
            let node = &self.nodes[n];
            node.is_leaf() && node.path.seq == ord && node.path.start == start
        })
    }

    /// Visit `from` and all its descendants, parents before children.
    /// Order among siblings is unspecified.
    pub fn pre_order<F: FnMut(NodeId)>(&self, from: NodeId, mut f: F) {
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            f(n);
            if let Some(children) = self.nodes[n].children() {
                stack.extend(children.values().copied());
            }
        }
    }

    /// Visit `from` and all its descendants, children before parents.
    pub fn post_order<F: FnMut(NodeId)>(&self, from: NodeId, mut f: F) {
        for n in self.post_order_ids(from) {
            f(n);
        }
    }

    // ------------------------------------------------------------------
    // construction plumbing shared by the builders
    // ------------------------------------------------------------------

    /// Descend from `from` matching `needle[start..]` symbol by symbol.
    /// The first `string_depth(from)` symbols are assumed matched.
    ///
    /// Returns the deepest node fully on the matched path, the total
    /// matched length, and the child edge the match ended inside of, if
    /// it did not end on a node.
    pub(crate) fn find_path(
        &self,
        from: NodeId,
        needle: &[Symbol<S>],
        start: usize,
    ) -> (NodeId, usize, Option<NodeId>) {
        let mut node = from;
        let mut matched = self.nodes[node].string_depth();
        while start + matched < needle.len() {
            let child = match self.nodes[node]
                .children()
                .and_then(|c| c.get(&needle[start + matched]))
            {
                Some(&child) => child,
                None => return (node, matched, None),
            };
            let child_depth = self.nodes[child].string_depth();
            let child_path = &self.nodes[child].path;
            // the edge's first symbol matched via the child key
            let mut k = matched + 1;
            while k < child_depth && start + k < needle.len() && *child_path.get(k) == needle[start + k]
            {
                k += 1;
            }
            matched = k;
            if matched < child_depth {
                return (node, matched, Some(child));
            }
            node = child;
        }
        (node, matched, None)
    }

    /// Split the edge `parent -> child` by a new internal node at string
    /// depth `new_depth` and return it. The new node adopts `child`; its
    /// suffix link starts unset.
    pub(crate) fn split_edge(&mut self, parent: NodeId, new_depth: usize, child: NodeId) -> NodeId {
        let parent_depth = self.nodes[parent].string_depth();
        let child_path = self.nodes[child].path.clone();
        debug_assert!(
            parent_depth < new_depth && new_depth < child_path.len(),
            "split depth out of range"
        );
        let new_path = Path::closed(
            Rc::clone(&child_path.buf),
            child_path.seq,
            child_path.start,
            child_path.start + new_depth,
        );
        let new_id = self.nodes.len();
        self.nodes.push(Node::internal(Some(parent), new_path));
        debug!(
            "split edge {}->{} at depth {} into node {}",
            parent, child, new_depth, new_id
        );

        let above = child_path.get(parent_depth).clone();
        let below = child_path.get(new_depth).clone();
        self.nodes[parent].children_mut().insert(above, new_id);
        self.nodes[new_id].children_mut().insert(below, child);
        self.nodes[child].parent = Some(new_id);
        new_id
    }

    /// Allocate a new leaf below `parent`. The caller wires it into the
    /// children map via [`Tree::add_child`].
    pub(crate) fn new_leaf(&mut self, parent: NodeId, id: I, path: Path<S>) -> NodeId {
        let leaf = self.nodes.len();
        self.nodes.push(Node::leaf(parent, id, path));
        leaf
    }

    /// Install `child` under `parent`, keyed by the first symbol of its
    /// incoming edge.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let key = self.nodes[child]
            .path
            .get(self.nodes[parent].string_depth())
            .clone();
        let prev = self.nodes[parent].children_mut().insert(key, child);
        debug_assert!(prev.is_none(), "child slot already occupied");
    }

    pub(crate) fn string_depth(&self, n: NodeId) -> usize {
        self.nodes[n].string_depth()
    }

    pub(crate) fn suffix_link(&self, n: NodeId) -> Option<NodeId> {
        self.nodes[n].suffix_link()
    }

    pub(crate) fn set_suffix_link(&mut self, n: NodeId, target: NodeId) {
        self.nodes[n].set_suffix_link(target);
    }

    /// Freeze every open leaf end at `end`. Run when a sequence build
    /// finishes; only the sequence just built can have open ends.
    pub(crate) fn freeze_open_ends(&mut self, end: usize) {
        for node in &mut self.nodes {
            if node.path.is_open() {
                debug_assert_eq!(node.path.end(), end);
                node.path.freeze();
            }
        }
    }

    // ------------------------------------------------------------------
    // analytics
    // ------------------------------------------------------------------

    /// All nodes below `from` in an order where children precede their
    /// parents.
    pub(crate) fn post_order_ids(&self, from: NodeId) -> Vec<NodeId> {
        let mut stack = vec![from];
        let mut order = Vec::new();
        while let Some(n) = stack.pop() {
            order.push(n);
            if let Some(children) = self.nodes[n].children() {
                stack.extend(children.values().copied());
            }
        }
        order.reverse();
        order
    }

    /// Pre-order with siblings visited first-symbol-ascending. Needs
    /// `S: Ord`; used where results must not depend on hash order.
    fn pre_order_sorted<F: FnMut(NodeId)>(&self, from: NodeId, mut f: F)
    where
        S: Ord,
    {
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            f(n);
            if let Some(children) = self.nodes[n].children() {
                let mut kids: Vec<(&Symbol<S>, NodeId)> =
                    children.iter().map(|(k, &v)| (k, v)).collect();
                // popped in ascending key order
                kids.sort_by(|a, b| b.0.cmp(a.0));
                stack.extend(kids.into_iter().map(|(_, v)| v));
            }
        }
    }

    /// All leaves below `from` as `(sequence id, suffix path)` pairs.
    pub fn leaves_below(&self, from: NodeId) -> Vec<(I, Path<S>)> {
        let mut out = Vec::new();
        self.pre_order(from, |n| {
            if let NodeKind::Leaf { id } = &self.nodes[n].kind {
                out.push((id.clone(), self.nodes[n].path.clone()));
            }
        });
        out
    }

    /// For every node, the number of distinct sequence ids among the
    /// leaves of its subtree (Gusfield's C(v)). Indexed by `NodeId`.
    pub(crate) fn compute_c(&self) -> Vec<usize> {
        let mut c = vec![0usize; self.nodes.len()];
        let mut sets: Vec<Option<HashSet<usize>>> = (0..self.nodes.len()).map(|_| None).collect();
        for n in self.post_order_ids(ROOT) {
            let set = match &self.nodes[n].kind {
                NodeKind::Leaf { .. } => {
                    let mut set = HashSet::with_capacity(1);
                    set.insert(self.nodes[n].path.seq);
                    set
                }
                NodeKind::Internal { children, .. } => {
                    let mut acc = HashSet::new();
                    for &child in children.values() {
                        let child_set = sets[child].take().expect("child set computed first");
                        // merge the smaller set into the larger one
                        if child_set.len() > acc.len() {
                            let small = std::mem::replace(&mut acc, child_set);
                            acc.extend(small);
                        } else {
                            acc.extend(child_set);
                        }
                    }
                    acc
                }
            };
            c[n] = set.len();
            sets[n] = Some(set);
        }
        c
    }

    /// For every node, whether it is left-diverse: not all occurrences
    /// of its string are preceded by the same symbol. A suffix starting
    /// at position 0 contributes a per-sequence begin marker.
    pub(crate) fn compute_left_diverse(&self) -> Vec<bool> {
        // None = already diverse; Some(set) = left symbols seen so far
        let mut vals: Vec<Option<Option<HashSet<LeftSym<S>>>>> =
            (0..self.nodes.len()).map(|_| None).collect();
        let mut diverse = vec![false; self.nodes.len()];
        for n in self.post_order_ids(ROOT) {
            let val: Option<HashSet<LeftSym<S>>> = match &self.nodes[n].kind {
                NodeKind::Leaf { .. } => {
                    let path = &self.nodes[n].path;
                    let sym = if path.start == 0 {
                        LeftSym::Begin(path.seq)
                    } else {
                        LeftSym::Sym(path.buf[path.start - 1].clone())
                    };
                    let mut set = HashSet::with_capacity(1);
                    set.insert(sym);
                    Some(set)
                }
                NodeKind::Internal { children, .. } => {
                    let mut acc = Some(HashSet::new());
                    for &child in children.values() {
                        match vals[child].take().expect("child computed first") {
                            Some(child_set) => {
                                if let Some(set) = acc.as_mut() {
                                    set.extend(child_set);
                                }
                            }
                            // a diverse child makes every ancestor diverse
                            None => acc = None,
                        }
                    }
                    match acc {
                        Some(set) if set.len() <= 1 => Some(set),
                        _ => None,
                    }
                }
            };
            diverse[n] = val.is_none();
            vals[n] = Some(val);
        }
        diverse
    }
}

impl<I, S> Default for Tree<I, S>
where
    I: Eq + std::hash::Hash + Clone,
    S: Eq + std::hash::Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The left symbol of one suffix occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LeftSym<S> {
    /// The suffix starts at position 0 of the given sequence.
    Begin(usize),
    Sym(Symbol<S>),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_add_errors() {
        let mut tree: Tree<&str, char> = Tree::new();
        tree.add("A", "abc".chars()).unwrap();
        assert_eq!(tree.add("A", "xyz".chars()), Err(Error::DuplicateId));
        assert_eq!(tree.add("B", "".chars()), Err(Error::EmptySequence));
        // failed adds leave no trace
        assert_eq!(tree.sequence_count(), 1);
    }

    #[test]
    fn test_root_links_to_aux() {
        let tree: Tree<&str, char> = Tree::new();
        assert_eq!(tree.node(tree.root()).suffix_link(), Some(AUX));
        assert_eq!(tree.node(tree.root()).string_depth(), 0);
    }

    #[test]
    fn test_find_single_sequence() {
        let mut tree = Tree::new();
        tree.add(1, "xabxac".chars()).unwrap();
        assert!(tree.find("xabxac".chars()));
        assert!(tree.find("bxa".chars()));
        assert!(!tree.find("xabxaa".chars()));
        assert!(!tree.find("d".chars()));
    }

    #[test]
    fn test_find_id_unknown() {
        let mut tree = Tree::new();
        tree.add("A", "abc".chars()).unwrap();
        assert_eq!(tree.find_id(&"B", "a".chars()), Err(Error::UnknownId));
        assert_eq!(tree.find_id(&"A", "bc".chars()), Ok(true));
    }
}
