use std::collections::BTreeSet;

use hashlink::LinkedHashMap;
use hashlink::linked_hash_map::Entry;

use super::{PathStyle, SegmentPath};

/// One directory level: its own name, the files it directly contains and its
/// child directories keyed by name in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    files: BTreeSet<String>,
    children: LinkedHashMap<String, TreeNode>,
}

impl TreeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeSet::new(),
            children: LinkedHashMap::new(),
        }
    }

    pub fn with_files<I, S>(name: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = Self::new(name);
        node.set_files(files);
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }

    /// Resolves a descendant by its segments relative to this node.
    ///
    /// At least one segment is required; an empty slice never matches. Root
    /// addressing lives on [`Tree::get_by_path`](super::Tree::get_by_path).
    pub fn get_by_path(&self, segments: &[String]) -> Option<&TreeNode> {
        let (first, rest) = segments.split_first()?;
        let child = self.child(first)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.get_by_path(rest)
        }
    }

    pub(super) fn get_by_path_mut(&mut self, segments: &[String]) -> Option<&mut TreeNode> {
        let (first, rest) = segments.split_first()?;
        let child = self.children.get_mut(first)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.get_by_path_mut(rest)
        }
    }

    /// Replaces the file set; the last listing entry for a directory wins.
    pub(super) fn set_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
    }

    /// Appends a child, replacing any existing child with the same name.
    pub(super) fn add_child(&mut self, child: TreeNode) -> &mut TreeNode {
        match self.children.entry(child.name.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(child);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(child),
        }
    }

    /// Depth-first pre-order walk yielding `(ancestors, node)` pairs.
    ///
    /// `ancestors` starts with this node's own name for every descendant and is
    /// empty for this node itself.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(SegmentPath::new(), self)],
        }
    }

    /// Number of directory nodes in this subtree, including this node.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

/// Lazy pre-order iterator over a subtree. Restartable by calling
/// [`TreeNode::iter`] again.
pub struct PreOrder<'a> {
    stack: Vec<(SegmentPath, &'a TreeNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (SegmentPath, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (ancestors, node) = self.stack.pop()?;
        if !node.children.is_empty() {
            let own_path = ancestors.child(node.name.clone());
            let children: Vec<&TreeNode> = node.children().collect();
            for child in children.into_iter().rev() {
                self.stack.push((own_path.clone(), child));
            }
        }
        Some((ancestors, node))
    }
}

/// A fully built directory tree.
///
/// The root node's name is the root path the tree was built from; it is kept
/// for composing absolute paths and is not a lookup segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: TreeNode,
    style: PathStyle,
}

impl Tree {
    pub fn new(root_path: impl Into<String>, style: PathStyle) -> Self {
        Self {
            root: TreeNode::new(root_path),
            style,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_path(&self) -> &str {
        self.root.name()
    }

    pub fn style(&self) -> PathStyle {
        self.style
    }

    /// Last component of the root path, used when the root itself becomes a
    /// segment on another tree. Falls back to the whole root path when it has
    /// no separator-delimited components.
    pub fn root_segment(&self) -> String {
        self.style
            .split(self.root_path())
            .pop()
            .unwrap_or_else(|| self.root_path().to_string())
    }

    /// Resolves a node by segments relative to the root.
    ///
    /// Both `[]` and `[root_path]` address the root itself; anything else is a
    /// descendant lookup.
    pub fn get_by_path(&self, segments: &[String]) -> Option<&TreeNode> {
        match segments {
            [only] if *only == self.root.name => Some(&self.root),
            _ => self.resolve(segments),
        }
    }

    /// Resolves strictly relative segments: `[]` is the root and every other
    /// path names a descendant, even one whose name equals the root path.
    pub fn resolve(&self, segments: &[String]) -> Option<&TreeNode> {
        if segments.is_empty() {
            Some(&self.root)
        } else {
            self.root.get_by_path(segments)
        }
    }

    /// Absolute path of the node at `segments`, composed with this tree's style.
    pub fn absolute_path<S: AsRef<str>>(&self, segments: &[S]) -> String {
        self.style.join(self.root_path(), segments)
    }

    pub fn iter(&self) -> PreOrder<'_> {
        self.root.iter()
    }

    pub(super) fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    fn sample_tree() -> Tree {
        let mut tree = Tree::new("/root", PathStyle::with_separator('/'));
        let root = tree.root_mut();
        root.set_files(["top.txt"]);
        let a = root.add_child(TreeNode::with_files("a", ["x", "y"]));
        a.add_child(TreeNode::with_files("b", ["z"]));
        a.add_child(TreeNode::new("c"));
        root.add_child(TreeNode::with_files("d", ["w"]));
        tree
    }

    #[test]
    fn root_is_addressed_by_empty_path_and_by_its_own_name() {
        let tree = sample_tree();
        assert_eq!(tree.get_by_path(&[]), Some(tree.root()));
        assert_eq!(tree.get_by_path(&segments(&["/root"])), Some(tree.root()));
    }

    #[test]
    fn root_segment_is_the_last_root_component() {
        let style = PathStyle::with_separator('/');
        assert_eq!(Tree::new("/mnt/photos/", style).root_segment(), "photos");
        assert_eq!(Tree::new("photos", style).root_segment(), "photos");
        assert_eq!(Tree::new("/", style).root_segment(), "/");
    }

    #[test]
    fn resolve_never_mistakes_a_child_for_the_root() {
        let mut tree = Tree::new("backup", PathStyle::with_separator('/'));
        tree.root_mut().add_child(TreeNode::with_files("backup", ["inner"]));

        assert_eq!(tree.resolve(&[]), Some(tree.root()));
        let child = tree.resolve(&segments(&["backup"])).expect("child exists");
        assert!(child.files().contains("inner"));
        assert!(tree.resolve(&segments(&["other"])).is_none());
    }

    #[test]
    fn nested_lookup_follows_each_segment() {
        let tree = sample_tree();
        let node = tree.get_by_path(&segments(&["a", "b"])).map(TreeNode::name);
        assert_eq!(node, Some("b"));
        let node = tree.get_by_path(&segments(&["d"])).map(TreeNode::files);
        assert_eq!(node.map(|files| files.len()), Some(1));
    }

    #[test]
    fn lookup_has_no_partial_matches() {
        let tree = sample_tree();
        assert!(tree.get_by_path(&segments(&["a", "missing", "b"])).is_none());
        assert!(tree.get_by_path(&segments(&["missing"])).is_none());
        assert!(tree.get_by_path(&segments(&["a", "b", "deeper"])).is_none());
    }

    #[test]
    fn plain_node_requires_at_least_one_segment() {
        let tree = sample_tree();
        let a = tree.get_by_path(&segments(&["a"])).expect("a exists");
        assert!(a.get_by_path(&[]).is_none());
        assert_eq!(a.get_by_path(&segments(&["c"])).map(TreeNode::name), Some("c"));
    }

    #[test]
    fn iteration_is_pre_order_with_ancestor_paths() {
        let tree = sample_tree();
        let visited: Vec<(String, String)> = tree
            .iter()
            .map(|(ancestors, node)| (ancestors.to_string(), node.name().to_string()))
            .collect();
        assert_eq!(
            visited,
            vec![
                (String::new(), "/root".to_string()),
                ("/root".to_string(), "a".to_string()),
                ("/root/a".to_string(), "b".to_string()),
                ("/root/a".to_string(), "c".to_string()),
                ("/root".to_string(), "d".to_string()),
            ]
        );
    }

    #[test]
    fn iteration_is_restartable() {
        let tree = sample_tree();
        let first: Vec<_> = tree.iter().map(|(_, node)| node.name()).collect();
        let second: Vec<_> = tree.iter().map(|(_, node)| node.name()).collect();
        assert_eq!(first, second);
        assert_eq!(tree.root().node_count(), 5);
    }

    #[test]
    fn children_are_unique_by_name() {
        let mut tree = sample_tree();
        tree.root_mut().add_child(TreeNode::with_files("d", ["replaced"]));
        let names: Vec<_> = tree.root().children().map(TreeNode::name).collect();
        assert_eq!(names, vec!["a", "d"]);
        let d = tree.get_by_path(&segments(&["d"])).expect("d exists");
        assert!(d.files().contains("replaced"));
    }

    #[test]
    fn absolute_path_uses_the_tree_style() {
        let tree = Tree::new("I:files\\photos", PathStyle::with_separator('\\'));
        assert_eq!(tree.absolute_path(&["a", "b"]), "I:files\\photos\\a\\b");
    }
}
