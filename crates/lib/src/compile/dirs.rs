use tracing::{debug, trace, warn};

use crate::consts::TARGET_DIR_ID;
use crate::dir::DirId;
use crate::entity::{File, Shortcut};
use crate::id::{EntityKind, is_rooted, special_folder_id};
use crate::project::EmptyDirectoryPolicy;
use crate::projection::{self, ProcessingContext};
use crate::xml::Element;

use super::{CompileError, CompilePass, inherit};

impl CompilePass<'_> {
  /// Pick the installation directory, then give every node its id, parents first.
  pub(super) fn assign_directory_ids(&mut self) {
    self.install_dir = self.pick_install_dir();
    if let Some(install_id) = &self.project.options.install_dir_id {
      self.ids.reserve(install_id);
    }

    let mut stack: Vec<(DirId, Option<String>)> = self
      .project
      .dirs
      .roots()
      .iter()
      .rev()
      .map(|&root| (root, None))
      .collect();

    while let Some((dir, parent_id)) = stack.pop() {
      let id = self.directory_id(dir, parent_id.as_deref());
      trace!(dir = %dir, id = %id, "assigned directory id");
      let path = self.project.dirs.path_of(dir);
      self.record("Directory", id.clone(), path);

      for &child in self.project.dirs.node(dir).children.iter().rev() {
        stack.push((child, Some(id.clone())));
      }
      self.dir_ids.insert(dir, id);
    }
  }

  fn pick_install_dir(&self) -> Option<DirId> {
    let tree = &self.project.dirs;
    let install_id = self.project.options.install_dir_id.as_ref()?;

    if let Some(declared) = tree
      .ids()
      .find(|&id| tree.node(id).id.explicit_id() == Some(install_id.as_str()))
    {
      debug!(dir = %tree.path_of(declared), id = %install_id, "install dir id declared explicitly");
      return Some(declared);
    }

    let candidate = tree.install_dir()?;
    let node = tree.node(candidate);

    if node.id.is_set() {
      debug!(dir = %candidate, "install dir keeps its explicit id");
    } else if special_folder_id(&node.name).is_some() {
      warn!(
        dir = %node.name,
        id = %install_id,
        "special folder cannot be the installation directory, leaving its id unchanged"
      );
      return None;
    } else {
      debug!(dir = %tree.path_of(candidate), id = %install_id, "auto-assigned install dir");
    }
    Some(candidate)
  }

  fn directory_id(&mut self, dir: DirId, parent_id: Option<&str>) -> String {
    let project = self.project;
    let node = project.dirs.node(dir);

    if let Some(explicit) = node.id.explicit_id() {
      return explicit.to_string();
    }
    if self.install_dir == Some(dir)
      && let Some(install_id) = &project.options.install_dir_id
    {
      return install_id.clone();
    }
    if let Some(folder) = special_folder_id(&node.name) {
      return folder.to_string();
    }
    if node.parent.is_none() && is_rooted(&node.name) {
      self.absolute_dirs += 1;
      return format!("{}{}", TARGET_DIR_ID, self.absolute_dirs);
    }

    let raw = match parent_id {
      Some(parent) => format!("{}.{}", parent, node.name),
      None => node.name.clone(),
    };
    node.id.resolve(EntityKind::Directory, &raw, &mut self.ids)
  }

  /// Files, collections, shortcuts or generic items anywhere below `dir`.
  fn has_payload(&self, dir: DirId) -> bool {
    let tree = &self.project.dirs;
    let node = tree.node(dir);
    node.has_own_items_to_install()
      || !node.generic_items.is_empty()
      || node.children.iter().any(|&child| self.has_payload(child))
  }

  pub(super) fn emit_dir(&mut self, dir: DirId) -> Result<Option<Element>, CompileError> {
    let project = self.project;
    let tree = &project.dirs;
    let node = tree.node(dir);
    let policy = project.options.empty_directories;

    if policy == EmptyDirectoryPolicy::Elide && !self.has_payload(dir) {
      debug!(dir = %tree.path_of(dir), "eliding empty directory");
      return Ok(None);
    }

    let dir_id = self.dir_ids.get(&dir).cloned().unwrap_or_default();
    let name = special_folder_id(&node.name).unwrap_or(node.name.as_str());
    let mut element = Element::new("Directory")
      .with_attr("Id", dir_id.as_str())
      .with_attr("Name", name);

    if !tree.is_auto_parent(dir) {
      for (key, value) in node.attributes.element_attributes() {
        element.set_attr(key, value);
      }
    }
    if let Some(head) = tree.root_auto_parent(dir) {
      for (key, value) in tree.node(head).attributes.element_attributes() {
        element.set_attr(key, value);
      }
    }
    for (key, value) in node.own_attributes.element_attributes() {
      element.set_attr(key, value);
    }

    for file in &node.files {
      let features = inherit(&[file.features.as_slice(), node.features.as_slice()]);
      let component = self.file_component(file, features)?;
      element.push(component);
    }
    for collection in &node.file_collections {
      trace!(pattern = %collection.pattern, files = collection.files.len(), "emitting file collection");
      for file in &collection.files {
        let features = inherit(&[
          file.features.as_slice(),
          collection.features.as_slice(),
          node.features.as_slice(),
        ]);
        let component = self.file_component(file, features)?;
        element.push(component);
      }
    }
    for shortcut in &node.shortcuts {
      let features = inherit(&[shortcut.features.as_slice(), node.features.as_slice()]);
      let component = self.shortcut_component(shortcut, &dir_id, features)?;
      element.push(component);
    }

    if !node.generic_items.is_empty() {
      let mut ctx = ProcessingContext::new(project, &mut self.ids, Some(dir_id.clone()));
      for item in &node.generic_items {
        item.process(&mut ctx)?;
      }
      let processed = ctx.finish();
      self.absorb(&processed, &node.features);
      for child in processed.components.into_iter().chain(processed.parent_elements) {
        element.push(child);
      }
    }

    if node.is_empty() && policy == EmptyDirectoryPolicy::Component {
      let component_id = format!("Component.{}.EmptyDirectory", dir_id);
      let mut component = self.component(component_id, &node.features);
      component.push(Element::new("CreateFolder"));
      component.push(
        Element::new("RemoveFolder")
          .with_attr("Id", dir_id.as_str())
          .with_attr("On", "uninstall"),
      );
      element.push(component);
    }

    for &child in &node.children {
      if let Some(child_element) = self.emit_dir(child)? {
        element.push(child_element);
      }
    }

    Ok(Some(element))
  }

  fn file_component(&mut self, file: &File, features: &[String]) -> Result<Element, CompileError> {
    let projected = projection::project(file, &mut self.ids)?;
    let mut file_element = projected.element;

    if let Some(base) = &self.project.source_base_dir
      && !is_rooted(&file.source)
    {
      let joined = format!("{}\\{}", base.trim_end_matches(['\\', '/']), file.source);
      file_element.set_attr("Source", joined);
    }

    let file_id = file_element.attr("Id").unwrap_or_default().to_string();
    self.record("File", file_id.clone(), file.source.clone());

    let mut component = self.component(format!("Component.{}", file_id), features);
    for (name, value) in projected.component_attributes {
      component.set_attr(name, value);
    }
    component.push(file_element);
    Ok(component)
  }

  fn shortcut_component(
    &mut self,
    shortcut: &Shortcut,
    dir_id: &str,
    features: &[String],
  ) -> Result<Element, CompileError> {
    let projected = projection::project(shortcut, &mut self.ids)?;
    let mut element = projected.element;

    // Generated shortcut ids are scoped by their directory.
    let mut shortcut_id = element.attr("Id").unwrap_or_default().to_string();
    if !shortcut.id.is_set() {
      shortcut_id = format!("{}.{}", dir_id, shortcut_id);
      element.set_attr_first("Id", shortcut_id.as_str());
    }
    if !element.has_attr("WorkingDirectory") {
      let working_dir = shortcut.implied_working_directory().unwrap_or(dir_id);
      element.set_attr("WorkingDirectory", working_dir);
    }
    self.record("Shortcut", shortcut_id.clone(), shortcut.name.clone());

    let mut component = self.component(format!("Component.{}", shortcut_id), features);
    for (name, value) in projected.component_attributes {
      component.set_attr(name, value);
    }
    component.push(element);
    Ok(component)
  }
}
