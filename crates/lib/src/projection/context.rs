//! Processing context for self-describing items.

use tracing::debug;

use crate::id::IdAllocator;
use crate::project::Project;
use crate::util::hash::stable_guid;
use crate::xml::Element;

use super::{Projectable, ProjectionError, project};

/// An entity that inserts its own projected element into the output.
pub trait SelfDescribing: Projectable {
  /// Place `ctx.current` (the entity's projected element) into the output.
  ///
  /// Called exactly once per item, after its attributes have been projected.
  fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<(), ProjectionError>;
}

/// A component created while processing items, with the features it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
  pub id: String,
  pub features: Vec<String>,
}

/// What processing a group of items produced.
#[derive(Debug, Default)]
pub struct ProcessedItems {
  /// `Component` elements, to be placed in a directory.
  pub components: Vec<Element>,
  /// Elements for the enclosing parent itself.
  pub parent_elements: Vec<Element>,
  pub component_refs: Vec<ComponentRef>,
  pub uses_util_extension: bool,
}

/// State visible to a self-describing item while it inserts itself.
pub struct ProcessingContext<'a> {
  pub project: &'a Project,
  pub ids: &'a mut IdAllocator,
  /// Id of the enclosing directory, if any.
  pub directory_id: Option<String>,
  /// Id of the component most recently created in this context.
  pub component_id: Option<String>,
  /// The element projected for the item being processed.
  pub current: Option<Element>,
  /// Raw `Component:Name` attributes of the item being processed.
  pub component_attributes: Vec<(String, String)>,
  output: ProcessedItems,
}

impl<'a> ProcessingContext<'a> {
  pub fn new(project: &'a Project, ids: &'a mut IdAllocator, directory_id: Option<String>) -> Self {
    Self {
      project,
      ids,
      directory_id,
      component_id: None,
      current: None,
      component_attributes: Vec::new(),
      output: ProcessedItems::default(),
    }
  }

  /// Project `item`, then hand it its own element through the hook.
  pub fn process_item<T: SelfDescribing>(&mut self, item: &T) -> Result<(), ProjectionError> {
    let projected = project(item, self.ids)?;
    self.current = Some(projected.element);
    self.component_attributes = projected.component_attributes;

    item.process(self)?;

    self.current = None;
    self.component_attributes.clear();
    Ok(())
  }

  pub fn take_current(&mut self) -> Option<Element> {
    self.current.take()
  }

  pub fn add_component_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.component_attributes.push((name.into(), value.into()));
  }

  /// Create a `Component.<id>` element owned by the current item.
  pub fn create_component(&mut self, id: &str, features: &[String]) -> &mut Element {
    let component_id = format!("Component.{}", id);
    let guid = stable_guid(&self.project.guid_seed(), &component_id);

    let mut component = Element::new("Component")
      .with_attr("Id", component_id.as_str())
      .with_attr("Guid", guid);
    for (name, value) in &self.component_attributes {
      component.set_attr(name.as_str(), value.as_str());
    }

    debug!(component = %component_id, directory = ?self.directory_id, "created item component");

    self.output.component_refs.push(ComponentRef {
      id: component_id.clone(),
      features: features.to_vec(),
    });
    self.component_id = Some(component_id);
    self.output.components.push(component);

    let last = self.output.components.len() - 1;
    &mut self.output.components[last]
  }

  pub fn insert_into_parent(&mut self, element: Element) {
    self.output.parent_elements.push(element);
  }

  /// Mark the document as needing the util extension namespace.
  pub fn include_util_extension(&mut self) {
    self.output.uses_util_extension = true;
  }

  pub fn finish(self) -> ProcessedItems {
    self.output
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity::{CloseApplication, EnvironmentVariable, GenericItem, RegistryHive, RegistryValue};

  #[test]
  fn registry_value_lands_in_its_own_component() {
    let project = Project::new("Acme");
    let mut ids = IdAllocator::new();
    let mut ctx = ProcessingContext::new(&project, &mut ids, Some("INSTALLDIR".into()));

    let item = GenericItem::from(RegistryValue::new(RegistryHive::LocalMachine, "Software\\Acme", "Path", "[INSTALLDIR]"));
    item.process(&mut ctx).unwrap();
    let out = ctx.finish();

    assert_eq!(out.components.len(), 1);
    let component = &out.components[0];
    assert_eq!(component.attr("Id"), Some("Component.Path"));
    assert_eq!(component.attr("Guid").map(str::len), Some(36));
    let value = component.child("RegistryValue").unwrap();
    assert_eq!(value.attr("Root"), Some("HKLM"));
    assert_eq!(value.attr("Value"), Some("[INSTALLDIR]"));
    assert_eq!(out.component_refs[0].id, "Component.Path");
  }

  #[test]
  fn win64_registry_value_marks_its_component() {
    let project = Project::new("Acme");
    let mut ids = IdAllocator::new();
    let mut ctx = ProcessingContext::new(&project, &mut ids, None);

    let mut value = RegistryValue::new(RegistryHive::LocalMachine, "Software\\Acme", "Path", "x");
    value.win64 = Some(true);
    ctx.process_item(&value).unwrap();

    assert_eq!(ctx.finish().components[0].attr("Win64"), Some("yes"));
  }

  #[test]
  fn component_prefixed_raw_attributes_reach_the_component() {
    let project = Project::new("Acme");
    let mut ids = IdAllocator::new();
    let mut ctx = ProcessingContext::new(&project, &mut ids, None);

    let mut variable = EnvironmentVariable::new("ACME_HOME", "[INSTALLDIR]");
    variable.attributes.insert("Component:Permanent", "yes");
    variable.condition = Some("NOT Installed".into());
    ctx.process_item(&variable).unwrap();

    let out = ctx.finish();
    let component = &out.components[0];
    assert_eq!(component.attr("Permanent"), Some("yes"));
    assert!(component.child("Environment").is_some());
    assert_eq!(component.child("Condition").map(|c| c.text()), Some("NOT Installed".to_string()));
  }

  #[test]
  fn close_application_goes_to_the_parent_with_util_namespace() {
    let project = Project::new("Acme");
    let mut ids = IdAllocator::new();
    let mut ctx = ProcessingContext::new(&project, &mut ids, None);

    ctx.process_item(&CloseApplication::new("app.exe")).unwrap();
    let out = ctx.finish();

    assert!(out.components.is_empty());
    assert!(out.uses_util_extension);
    let element = &out.parent_elements[0];
    assert_eq!(element.name, "util:CloseApplication");
    assert_eq!(element.attr("Target"), Some("app.exe"));
    assert_eq!(element.attr("CloseMessage"), Some("no"));
    assert_eq!(element.attr("RebootPrompt"), Some("yes"));
    assert!(!element.has_attr("Id"));
  }

  #[test]
  fn failing_projection_never_reaches_the_hook() {
    let project = Project::new("Acme");
    let mut ids = IdAllocator::new();
    let mut ctx = ProcessingContext::new(&project, &mut ids, None);

    let result = ctx.process_item(&CloseApplication::new(""));

    assert!(result.is_err());
    let out = ctx.finish();
    assert!(out.parent_elements.is_empty());
    assert!(!out.uses_util_extension);
  }
}
