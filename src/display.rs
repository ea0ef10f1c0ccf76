//! Human-readable and GraphViz rendering.

use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;
use petgraph::dot::Dot;
use petgraph::Graph;

use crate::path::{Path, Symbol};
use crate::tree::Tree;

impl<S: fmt::Display> fmt::Display for Symbol<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Item(sym) => write!(f, "{}", sym),
            Symbol::Marker(_) => write!(f, "$"),
        }
    }
}

/// Symbols separated by single spaces, end-markers as `$`.
impl<S: fmt::Display> fmt::Display for Path<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sym) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", sym)?;
        }
        Ok(())
    }
}

impl<I, S> Tree<I, S>
where
    I: Eq + Hash + Clone + fmt::Display,
    S: Eq + Hash + Clone + fmt::Display,
{
    /// The tree in GraphViz `.dot` format: one node per tree node,
    /// edges labeled with their path. Leaves are labeled `id:start`.
    pub fn to_dot(&self) -> String {
        let mut graph = Graph::<String, String>::new();
        let mut index = HashMap::new();
        self.pre_order(self.root(), |n| {
            let label = match self.node(n).leaf_id() {
                Some(id) => format!("{}:{}", id, self.node(n).path.start),
                None if n == self.root() => "root".to_string(),
                None => format!("n{}", n),
            };
            index.insert(n, graph.add_node(label));
        });
        self.pre_order(self.root(), |n| {
            if let Some(parent) = self.node(n).parent {
                graph.add_edge(index[&parent], index[&n], self.edge(n).to_string());
            }
        });
        format!("{}", Dot::new(&graph))
    }
}

impl<I, S> fmt::Display for Tree<I, S>
where
    I: Eq + Hash + Clone + fmt::Display,
    S: Eq + Hash + Clone + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot())
    }
}

#[cfg(test)]
mod test {
    use crate::tree::Tree;

    #[test]
    fn test_path_renders_with_marker() {
        let mut tree = Tree::new();
        tree.add("A", "xabxac".chars()).unwrap();
        let paths: Vec<String> = tree
            .find_all("xac".chars())
            .map(|(_, p)| p.to_string())
            .collect();
        assert_eq!(paths, vec!["x a c $".to_string()]);
    }

    #[test]
    fn test_dot_contains_all_leaves() {
        let mut tree = Tree::new();
        tree.add("A", "ab".chars()).unwrap();
        let dot = tree.to_dot();
        // suffixes: ab$, b$, $
        assert!(dot.contains("A:0"));
        assert!(dot.contains("A:1"));
        assert!(dot.contains("A:2"));
        assert!(dot.contains("root"));
    }
}
