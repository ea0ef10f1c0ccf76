#[cfg(test)]
mod test_lca {

    use std::collections::HashSet;

    use gstree::{BuilderKind, NodeId, Tree};

    const BUILDERS: [BuilderKind; 3] = [
        BuilderKind::Naive,
        BuilderKind::McCreight,
        BuilderKind::Ukkonen,
    ];

    fn ancestors(tree: &Tree<&str, char>, mut n: NodeId) -> Vec<NodeId> {
        let mut chain = vec![n];
        while let Some(parent) = tree.node(n).parent {
            chain.push(parent);
            n = parent;
        }
        chain
    }

    /// Reference LCA: the first ancestor-or-self of `y` that is also an
    /// ancestor-or-self of `x`.
    fn slow_lca(tree: &Tree<&str, char>, x: NodeId, y: NodeId) -> NodeId {
        let of_x: HashSet<NodeId> = ancestors(tree, x).into_iter().collect();
        ancestors(tree, y)
            .into_iter()
            .find(|a| of_x.contains(a))
            .expect("the root is a common ancestor")
    }

    #[test]
    fn test_lca_matches_parent_chains() {
        for kind in BUILDERS {
            let mut tree = Tree::with_builder(kind);
            tree.add("A", "xabxac".chars()).unwrap();
            tree.add("B", "awyawxawxz".chars()).unwrap();
            let mut nodes = Vec::new();
            tree.pre_order(tree.root(), |n| nodes.push(n));
            for &x in &nodes {
                for &y in &nodes {
                    let got = tree.lca(x, y);
                    assert_eq!(got, slow_lca(&tree, x, y), "{:?}: lca({}, {})", kind, x, y);
                }
            }
        }
    }

    #[test]
    fn test_lca_is_deepest_common_ancestor() {
        for kind in BUILDERS {
            let mut tree = Tree::with_builder(kind);
            tree.add("A", "xabxac".chars()).unwrap();
            tree.add("B", "awyawxawxz".chars()).unwrap();
            tree.prepare_lca();
            let mut nodes = Vec::new();
            tree.pre_order(tree.root(), |n| nodes.push(n));
            for &x in &nodes {
                for &y in &nodes {
                    let z = tree.lca(x, y);
                    let of_x: HashSet<NodeId> = ancestors(&tree, x).into_iter().collect();
                    let of_y: HashSet<NodeId> = ancestors(&tree, y).into_iter().collect();
                    assert!(of_x.contains(&z) && of_y.contains(&z));
                    // no child of z on either chain is common to both
                    for &deeper in of_x.intersection(&of_y) {
                        assert!(
                            tree.node(deeper).string_depth() <= tree.node(z).string_depth(),
                            "{:?}: {} is a deeper common ancestor than {}",
                            kind,
                            deeper,
                            z
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_lca_of_leaves() {
        for kind in BUILDERS {
            let mut tree = Tree::with_builder(kind);
            tree.add("A", "xabxac".chars()).unwrap();
            tree.add("B", "awyawxawxz".chars()).unwrap();

            // suffixes "abxac$" of A and "awxawxz$" of B share only "a"
            let x = tree.suffix_leaf(&"A", 1).expect("leaf exists");
            let y = tree.suffix_leaf(&"B", 3).expect("leaf exists");
            let z = tree.lca(x, y);
            assert_eq!(tree.node(z).path.to_string(), "a");

            // same leaf twice
            assert_eq!(tree.lca(x, x), x);

            // disjoint first symbols meet at the root
            let c = tree.suffix_leaf(&"A", 5).expect("leaf exists");
            let w = tree.suffix_leaf(&"B", 1).expect("leaf exists");
            assert_eq!(tree.lca(c, w), tree.root());
        }
    }

    #[test]
    fn test_lca_reprepared_after_add() {
        for kind in BUILDERS {
            let mut tree = Tree::with_builder(kind);
            tree.add("A", "xabxac".chars()).unwrap();
            let x = tree.suffix_leaf(&"A", 0).unwrap();
            let y = tree.suffix_leaf(&"A", 3).unwrap();
            // "xabxac$" and "xac$" share "xa"
            let lca_xy = tree.lca(x, y);
            assert_eq!(tree.node(lca_xy).path.to_string(), "x a");

            // a later add invalidates and lazily rebuilds the preparation
            tree.add("B", "awyawxawxz".chars()).unwrap();
            let mut nodes = Vec::new();
            tree.pre_order(tree.root(), |n| nodes.push(n));
            for &x in &nodes {
                for &y in &nodes {
                    let got = tree.lca(x, y);
                    assert_eq!(got, slow_lca(&tree, x, y), "{:?}", kind);
                }
            }
        }
    }
}
