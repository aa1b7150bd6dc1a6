use tracing::{debug, trace};

use crate::id::{expand, is_rooted};

use super::{Dir, DirId, DirNode, Item, StructuralError};

/// Arena of directory nodes, with the top-level nodes in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DirTree {
  nodes: Vec<DirNode>,
  roots: Vec<DirId>,
}

/// Path segments: a rooted path is one opaque segment.
fn segments(path: &str) -> Vec<&str> {
  if is_rooted(path) {
    return vec![path];
  }
  path.split(['\\', '/']).filter(|s| !s.is_empty()).collect()
}

/// Segment comparison: case-insensitive, placeholders expanded.
fn same_name(a: &str, b: &str) -> bool {
  if is_rooted(a) || is_rooted(b) {
    return a.eq_ignore_ascii_case(b);
  }
  expand(a, false).eq_ignore_ascii_case(&expand(b, false))
}

impl DirTree {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn roots(&self) -> &[DirId] {
    &self.roots
  }

  pub fn node(&self, id: DirId) -> &DirNode {
    &self.nodes[id.0]
  }

  pub fn node_mut(&mut self, id: DirId) -> &mut DirNode {
    &mut self.nodes[id.0]
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// All handles in creation order.
  pub fn ids(&self) -> impl Iterator<Item = DirId> {
    (0..self.nodes.len()).map(DirId)
  }

  /// The cumulative prefixes of a path: `A`, `A\B`, `A\B\C`.
  pub fn flat_path_tree(path: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    for segment in segments(path) {
      let next = match prefixes.last() {
        Some(last) => format!("{}\\{}", last, segment),
        None => segment.to_string(),
      };
      prefixes.push(next);
    }
    prefixes
  }

  fn push_node(&mut self, node: DirNode) -> DirId {
    let id = DirId(self.nodes.len());
    match node.parent {
      Some(parent) => self.nodes[parent.0].children.push(id),
      None => self.roots.push(id),
    }
    self.nodes.push(node);
    id
  }

  /// Split `path` into a chain of new nodes under `parent` and return the deepest.
  ///
  /// Without a parent the head becomes a new root. Every synthesized node
  /// records its predecessor as `auto_parent`.
  pub fn resolve(&mut self, parent: Option<DirId>, path: &str, features: &[String]) -> DirId {
    let segments = segments(path);
    let (head, rest) = match segments.split_first() {
      Some((head, rest)) => (*head, rest),
      None => (path, &[][..]),
    };

    let mut cursor = self.push_node(DirNode::new(head, parent, None, features));
    for segment in rest {
      cursor = self.push_node(DirNode::new(segment, Some(cursor), Some(cursor), features));
    }

    trace!(path, nodes = segments.len().max(1), "resolved directory path");
    cursor
  }

  /// Find the node for `path`, starting at the roots.
  pub fn find(&self, path: &str) -> Option<DirId> {
    self.find_from(None, path)
  }

  /// Find the node for `path`, starting at the children of `parent`.
  pub fn find_from(&self, parent: Option<DirId>, path: &str) -> Option<DirId> {
    let mut found = parent;
    for segment in segments(path) {
      let level = match found {
        Some(id) => &self.nodes[id.0].children,
        None => &self.roots,
      };
      found = Some(
        *level
          .iter()
          .find(|child| same_name(&self.nodes[child.0].name, segment))?,
      );
    }
    // An empty path names nothing, not the starting point.
    if found == parent { None } else { found }
  }

  /// Resolve `path` against the nodes already known under `parent`.
  ///
  /// The longest already-declared prefix is reused and only the unmatched
  /// suffix is synthesized beneath it, so overlapping declarations share
  /// their common directories. With no match at all this is [`resolve`].
  ///
  /// [`resolve`]: DirTree::resolve
  pub fn merge(&mut self, parent: Option<DirId>, path: &str, features: &[String]) -> DirId {
    self.merge_chain(parent, path, features).1
  }

  /// Like [`DirTree::merge`], also returning the first newly created node.
  fn merge_chain(&mut self, parent: Option<DirId>, path: &str, features: &[String]) -> (Option<DirId>, DirId) {
    let mut last_match = None;
    let mut matched = 0;
    for prefix in Self::flat_path_tree(path) {
      match self.find_from(parent, &prefix) {
        Some(id) => {
          last_match = Some(id);
          matched += 1;
        }
        None => break,
      }
    }

    let Some(last_match) = last_match else {
      let leaf = self.resolve(parent, path, features);
      let head = self.chain_head(leaf);
      return (Some(head), leaf);
    };

    let segments = segments(path);
    if matched == segments.len() {
      debug!(path, dir = %last_match, "directory already declared");
      let node = &mut self.nodes[last_match.0];
      for feature in features {
        if !node.features.contains(feature) {
          node.features.push(feature.clone());
        }
      }
      return (None, last_match);
    }

    debug!(path, shared = matched, new = segments.len() - matched, "merging directory path");
    let suffix = &segments[matched..];
    let head = self.push_node(DirNode::new(suffix[0], Some(last_match), None, features));
    let mut cursor = head;
    for segment in &suffix[1..] {
      cursor = self.push_node(DirNode::new(segment, Some(cursor), Some(cursor), features));
    }
    (Some(head), cursor)
  }

  fn chain_head(&self, id: DirId) -> DirId {
    self.root_auto_parent(id).unwrap_or(id)
  }

  /// True when some child was synthesized by this node.
  pub fn is_auto_parent(&self, id: DirId) -> bool {
    self.nodes[id.0]
      .children
      .iter()
      .any(|child| self.nodes[child.0].auto_parent == Some(id))
  }

  /// The head of the synthesized chain `id` belongs to, if `id` was synthesized.
  pub fn root_auto_parent(&self, id: DirId) -> Option<DirId> {
    let mut result = self.nodes[id.0].auto_parent?;
    while let Some(next) = self.nodes[result.0].auto_parent {
      result = next;
    }
    Some(result)
  }

  /// Files, file collections or shortcuts anywhere in the subtree.
  pub fn has_items_to_install(&self, id: DirId) -> bool {
    let node = &self.nodes[id.0];
    node.has_own_items_to_install() || node.children.iter().any(|child| self.has_items_to_install(*child))
  }

  /// Path of a node from its root, joined with `\`.
  pub fn path_of(&self, id: DirId) -> String {
    let mut names = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
      names.push(self.nodes[current.0].name.as_str());
      cursor = self.nodes[current.0].parent;
    }
    names.reverse();
    names.join("\\")
  }

  /// Declare a directory with its content under `parent`, reusing existing nodes.
  ///
  /// The whole declaration is checked before the tree is touched.
  pub fn add(&mut self, parent: Option<DirId>, dir: Dir) -> Result<DirId, StructuralError> {
    check_children(&dir.items)?;

    let (head, leaf) = self.merge_chain(parent, &dir.path, &dir.features);

    if !dir.attributes.is_empty() {
      match head {
        Some(head) => self.nodes[head.0].attributes.extend_from(&dir.attributes),
        None => self.nodes[leaf.0].own_attributes.extend_from(&dir.attributes),
      }
    }
    let node = &mut self.nodes[leaf.0];
    if let Some(id) = dir.id {
      node.id.set(id);
    }
    if dir.install_dir {
      node.install_dir = true;
    }

    self.add_items(leaf, dir.items)?;
    Ok(leaf)
  }

  /// Attach items to an existing node.
  pub fn add_items(&mut self, dir: DirId, items: Vec<Item>) -> Result<(), StructuralError> {
    check_children(&items)?;

    for item in items {
      match item {
        Item::Dir(sub) => {
          self.add(Some(dir), sub)?;
        }
        Item::File(file) => self.nodes[dir.0].files.push(file),
        Item::Files(files) => self.nodes[dir.0].file_collections.push(files),
        Item::Shortcut(shortcut) => self.nodes[dir.0].shortcuts.push(shortcut),
        Item::Generic(generic) => self.nodes[dir.0].generic_items.push(generic),
        other => {
          return Err(StructuralError {
            item: other.type_name(),
            container: "Dir",
          });
        }
      }
    }
    Ok(())
  }

  /// The directory that becomes the logical installation directory.
  ///
  /// A node flagged `install_dir` wins. Otherwise the first root's chain is
  /// followed while a node holds nothing to install and exactly one child.
  pub fn install_dir(&self) -> Option<DirId> {
    if let Some(flagged) = self.ids().find(|id| self.nodes[id.0].install_dir) {
      return Some(flagged);
    }

    let mut cursor = *self.roots.first()?;
    loop {
      let node = &self.nodes[cursor.0];
      if node.has_own_items_to_install() || node.children.len() != 1 {
        return Some(cursor);
      }
      cursor = node.children[0];
    }
  }
}

/// Reject items that cannot live in a directory, nested directories included.
fn check_children(items: &[Item]) -> Result<(), StructuralError> {
  for item in items {
    if !item.fits_in_dir() {
      return Err(StructuralError {
        item: item.type_name(),
        container: "Dir",
      });
    }
    if let Item::Dir(sub) = item {
      check_children(&sub.items)?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity::{Feature, File, FileCollection};

  fn names(tree: &DirTree, ids: &[DirId]) -> Vec<String> {
    ids.iter().map(|id| tree.node(*id).name.clone()).collect()
  }

  mod resolve {
    use super::*;

    #[test]
    fn splits_relative_path_into_chain() {
      let mut tree = DirTree::new();
      let leaf = tree.resolve(None, "A\\B\\C", &[]);

      assert_eq!(tree.len(), 3);
      assert_eq!(tree.path_of(leaf), "A\\B\\C");
      assert_eq!(names(&tree, tree.roots()), vec!["A"]);
    }

    #[test]
    fn mixed_separators_and_empty_segments_are_ignored() {
      let mut tree = DirTree::new();
      let leaf = tree.resolve(None, "A//B\\\\C/", &[]);

      assert_eq!(tree.len(), 3);
      assert_eq!(tree.path_of(leaf), "A\\B\\C");
    }

    #[test]
    fn rooted_path_is_a_single_node() {
      let mut tree = DirTree::new();
      let leaf = tree.resolve(None, "C:\\A\\B", &[]);

      assert_eq!(tree.len(), 1);
      assert_eq!(tree.node(leaf).name, "C:\\A\\B");
    }

    #[test]
    fn synthesized_nodes_point_at_their_predecessor() {
      let mut tree = DirTree::new();
      let leaf = tree.resolve(None, "A\\B\\C", &[]);
      let head = tree.roots()[0];
      let middle = tree.node(leaf).parent.unwrap();

      assert_eq!(tree.node(head).auto_parent, None);
      assert_eq!(tree.node(middle).auto_parent, Some(head));
      assert_eq!(tree.node(leaf).auto_parent, Some(middle));
      assert!(tree.is_auto_parent(head));
      assert!(tree.is_auto_parent(middle));
      assert!(!tree.is_auto_parent(leaf));
      assert_eq!(tree.root_auto_parent(leaf), Some(head));
      assert_eq!(tree.root_auto_parent(head), None);
    }

    #[test]
    fn every_node_carries_the_feature() {
      let mut tree = DirTree::new();
      let features = vec!["Docs".to_string()];
      tree.resolve(None, "A\\B", &features);

      assert!(tree.ids().all(|id| tree.node(id).features == features));
    }
  }

  mod merge {
    use super::*;

    #[test]
    fn flat_path_tree_lists_prefixes() {
      assert_eq!(DirTree::flat_path_tree("A\\B/C"), vec!["A", "A\\B", "A\\B\\C"]);
    }

    #[test]
    fn only_the_unmatched_suffix_is_synthesized() {
      let mut tree = DirTree::new();
      let app = tree.merge(None, "%ProgramFiles%\\Co\\App", &[]);
      let docs = tree.merge(None, "%ProgramFiles%\\Co\\App\\Docs", &[]);

      assert_eq!(tree.len(), 4);
      assert_eq!(tree.roots().len(), 1);
      assert_eq!(tree.node(docs).parent, Some(app));
    }

    #[test]
    fn merging_the_same_path_twice_creates_nothing() {
      let mut tree = DirTree::new();
      let first = tree.merge(None, "A\\B\\C", &[]);
      let second = tree.merge(None, "a/b/c", &[]);

      assert_eq!(first, second);
      assert_eq!(tree.len(), 3);
    }

    #[test]
    fn placeholders_match_their_expanded_form() {
      let mut tree = DirTree::new();
      let first = tree.merge(None, "%ProgramFiles%\\Co", &[]);
      let second = tree.merge(None, "[ProgramFilesFolder]\\Co", &[]);

      assert_eq!(first, second);
    }

    #[test]
    fn no_match_falls_back_to_a_new_root() {
      let mut tree = DirTree::new();
      tree.merge(None, "A\\B", &[]);
      tree.merge(None, "X\\Y", &[]);

      assert_eq!(names(&tree, tree.roots()), vec!["A", "X"]);
    }

    #[test]
    fn merged_suffix_forms_its_own_chain() {
      let mut tree = DirTree::new();
      let b = tree.merge(None, "A\\B", &[]);
      let leaf = tree.merge(None, "A\\B\\C\\D", &[]);
      let c = tree.node(leaf).parent.unwrap();

      assert_eq!(tree.node(c).parent, Some(b));
      assert_eq!(tree.node(c).auto_parent, None);
      assert_eq!(tree.node(leaf).auto_parent, Some(c));
    }

    #[test]
    fn fully_matched_path_gains_new_features() {
      let mut tree = DirTree::new();
      let leaf = tree.merge(None, "A", &["Core".to_string()]);
      tree.merge(None, "A", &["Docs".to_string()]);

      assert_eq!(tree.node(leaf).features, vec!["Core", "Docs"]);
    }
  }

  mod items {
    use super::*;

    #[test]
    fn files_go_to_the_deepest_node() {
      let mut tree = DirTree::new();
      let leaf = tree
        .add(None, Dir::new("A\\B", vec![File::new("a.txt").into()]))
        .unwrap();

      assert_eq!(tree.node(leaf).files.len(), 1);
      assert!(tree.has_items_to_install(tree.roots()[0]));
    }

    #[test]
    fn attributes_go_to_the_chain_head() {
      let mut tree = DirTree::new();
      let leaf = tree
        .add(None, Dir::new("A\\B", vec![]).with_attribute("ComponentGuidGenerationSeed", "x"))
        .unwrap();
      let head = tree.roots()[0];

      assert_eq!(tree.node(head).attributes.get("ComponentGuidGenerationSeed"), Some("x"));
      assert!(tree.node(leaf).attributes.is_empty());
    }

    #[test]
    fn redeclared_chain_node_keeps_its_own_attributes() {
      let mut tree = DirTree::new();
      tree.add(None, Dir::new("A\\B\\C", vec![File::new("a.txt").into()])).unwrap();
      let b = tree
        .add(None, Dir::new("A\\B", vec![]).with_attribute("DiskId", "7"))
        .unwrap();

      assert!(tree.is_auto_parent(b));
      assert_eq!(tree.node(b).own_attributes.get("DiskId"), Some("7"));
      assert!(tree.node(b).attributes.is_empty());
    }

    #[test]
    fn nested_dirs_merge_under_their_parent() {
      let mut tree = DirTree::new();
      let dir = Dir::new("A", vec![
        Dir::new("B\\C", vec![]).into(),
        Dir::new("B\\D", vec![]).into(),
      ]);
      tree.add(None, dir).unwrap();

      assert_eq!(tree.len(), 4);
      let b = tree.find("A\\B").unwrap();
      assert_eq!(names(&tree, &tree.node(b).children), vec!["C", "D"]);
    }

    #[test]
    fn feature_under_dir_is_a_structural_error() {
      let mut tree = DirTree::new();
      let err = tree
        .add(None, Dir::new("A", vec![Item::Feature(Feature::new("Docs"))]))
        .unwrap_err();

      assert_eq!(err, StructuralError {
        item: "Feature",
        container: "Dir",
      });
      assert!(tree.is_empty(), "a rejected declaration must not touch the tree");
      assert_eq!(err.to_string(), "Feature is not expected to be a child of Dir");
    }

    #[test]
    fn nested_invalid_item_leaves_the_tree_untouched() {
      let mut tree = DirTree::new();
      let dir = Dir::new("A", vec![
        File::new("a.txt").into(),
        Dir::new("B", vec![Item::Feature(Feature::new("Docs"))]).into(),
      ]);
      let err = tree.add(None, dir).unwrap_err();

      assert_eq!(err.item, "Feature");
      assert!(tree.is_empty());
      assert!(tree.roots().is_empty());
    }

    #[test]
    fn empty_structural_dirs_have_nothing_to_install() {
      let mut tree = DirTree::new();
      let leaf = tree.add(None, Dir::new("A\\Logs", vec![])).unwrap();

      assert!(!tree.has_items_to_install(tree.roots()[0]));
      assert!(tree.node(leaf).is_empty());
    }
  }

  mod install_dir {
    use super::*;

    #[test]
    fn walks_single_child_chain_to_first_content() {
      let mut tree = DirTree::new();
      let app = tree
        .add(None, Dir::new("%ProgramFiles%\\Co\\App", vec![File::new("a.txt").into()]))
        .unwrap();
      tree.add(None, Dir::new("%ProgramFiles%\\Co\\App\\Docs", vec![File::new("b.txt").into()]))
        .unwrap();

      assert_eq!(tree.install_dir(), Some(app));
    }

    #[test]
    fn file_collection_stops_the_walk() {
      let mut tree = DirTree::new();
      let app = tree
        .add(None, Dir::new("%ProgramFiles%\\Co\\App", vec![
          FileCollection::new("*.dll", vec![File::new("a.dll")]).into(),
          Dir::new("Docs", vec![File::new("b.txt").into()]).into(),
        ]))
        .unwrap();

      assert_eq!(tree.install_dir(), Some(app));
    }

    #[test]
    fn explicit_flag_wins() {
      let mut tree = DirTree::new();
      tree.add(None, Dir::new("A\\B", vec![File::new("a.txt").into()])).unwrap();
      let flagged = tree.add(None, Dir::new("X", vec![]).install_dir()).unwrap();

      assert_eq!(tree.install_dir(), Some(flagged));
    }

    #[test]
    fn empty_tree_has_no_install_dir() {
      assert_eq!(DirTree::new().install_dir(), None);
    }
  }
}
