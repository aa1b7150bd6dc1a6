//! One compilation pass: project in, document tree out.
//!
//! A [`CompilePass`] owns a fresh [`IdAllocator`], so every pass starts from
//! empty identifier tables and ids cached by an earlier pass are regenerated.
//! The pass runs in a fixed order:
//!
//! 1. Pick the installation directory and assign every directory id.
//! 2. Emit the directory tree with one component per installable item.
//! 3. Emit project-level items, media, upgrade policy, features, properties
//!    and the UI.

mod dirs;
mod features;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{TARGET_DIR_ID, WIX_NAMESPACE, WIX_UTIL_NAMESPACE};
use crate::dir::{DirId, StructuralError};
use crate::id::IdAllocator;
use crate::project::Project;
use crate::projection::{self, ComponentRef, ProcessedItems, ProcessingContext, ProjectionError};
use crate::util::hash::stable_guid;
use crate::xml::{self, Element, RenderError};

/// Errors that abort a compilation pass.
#[derive(Debug, Error)]
pub enum CompileError {
  #[error(transparent)]
  Projection(#[from] ProjectionError),

  #[error(transparent)]
  Structural(#[from] StructuralError),

  #[error("failed to render document: {0}")]
  Render(#[from] RenderError),
}

/// An identifier handed out during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedId {
  pub kind: &'static str,
  pub id: String,
  /// What the id was derived from (path, name or source file).
  pub source: String,
}

/// Output of a successful pass.
#[derive(Debug, Clone)]
pub struct Compiled {
  pub document: Element,
  /// Every directory, file, shortcut, component and feature id, in emission order.
  pub ids: Vec<AssignedId>,
  /// Id of the directory acting as the installation directory.
  pub install_dir: Option<String>,
}

impl Compiled {
  pub fn to_xml(&self) -> Result<String, CompileError> {
    Ok(xml::to_string(&self.document)?)
  }

  pub fn component_count(&self) -> usize {
    self.ids.iter().filter(|a| a.kind == "Component").count()
  }
}

/// Compile `project` with a fresh pass.
pub fn compile(project: &Project) -> Result<Compiled, CompileError> {
  CompilePass::new(project).run()
}

/// State of one compilation pass.
pub struct CompilePass<'p> {
  project: &'p Project,
  ids: IdAllocator,
  dir_ids: HashMap<DirId, String>,
  install_dir: Option<DirId>,
  absolute_dirs: u32,
  component_refs: Vec<ComponentRef>,
  assigned: Vec<AssignedId>,
  uses_util_extension: bool,
}

impl<'p> CompilePass<'p> {
  pub fn new(project: &'p Project) -> Self {
    Self {
      project,
      ids: IdAllocator::new(),
      dir_ids: HashMap::new(),
      install_dir: None,
      absolute_dirs: 0,
      component_refs: Vec::new(),
      assigned: Vec::new(),
      uses_util_extension: false,
    }
  }

  pub fn run(mut self) -> Result<Compiled, CompileError> {
    let project = self.project;
    info!(project = %project.name, dirs = project.dirs.len(), "compiling project");

    self.ids.reserve(TARGET_DIR_ID);
    self.assign_directory_ids();
    let install_dir = self.install_dir.and_then(|id| self.dir_ids.get(&id).cloned());

    let mut target_dir = Element::new("Directory")
      .with_attr("Id", TARGET_DIR_ID)
      .with_attr("Name", "SourceDir");
    for &root in project.dirs.roots() {
      if let Some(element) = self.emit_dir(root)? {
        target_dir.push(element);
      }
    }

    let processed = self.process_project_items()?;
    for component in processed.components {
      target_dir.push(component);
    }

    let mut product = self.product_element();
    product.push(self.package_element());
    product.push(projection::project(&project.media, &mut self.ids)?.element);
    if let Some(upgrade) = &project.major_upgrade {
      product.push(projection::project(upgrade, &mut self.ids)?.element);
    }
    product.push(target_dir);
    for element in processed.parent_elements {
      product.push(element);
    }

    for feature in self.emit_features()? {
      product.push(feature);
    }
    for property in &project.properties {
      product.push(projection::project(property, &mut self.ids)?.element);
    }

    if project.options.emit_ui
      && let Some(ui) = &project.ui
    {
      let mut ui = ui.clone();
      if let Some(dir) = &install_dir {
        ui.bind_install_dir(dir);
      }
      product.push(ui.to_element(&mut self.ids)?);
    }

    let mut root = Element::new("Wix").with_attr("xmlns", WIX_NAMESPACE);
    if self.uses_util_extension {
      root.set_attr("xmlns:util", WIX_UTIL_NAMESPACE);
    }
    root.push(product);

    info!(
      components = self.component_refs.len(),
      ids = self.assigned.len(),
      install_dir = ?install_dir,
      "compiled project"
    );

    Ok(Compiled {
      document: root,
      ids: self.assigned,
      install_dir,
    })
  }

  fn product_element(&self) -> Element {
    let project = self.project;
    let seed = project.guid_seed();
    let upgrade_code = project
      .upgrade_code
      .clone()
      .unwrap_or_else(|| stable_guid(&seed, "UpgradeCode"));

    let mut product = Element::new("Product")
      .with_attr("Id", project.product_id.as_deref().unwrap_or("*"))
      .with_attr("Name", project.name.as_str())
      .with_attr("Language", project.language.as_str())
      .with_attr("Codepage", project.codepage.as_str())
      .with_attr("Version", project.version.to_string())
      .with_attr("Manufacturer", project.manufacturer.as_str())
      .with_attr("UpgradeCode", upgrade_code);
    for (name, value) in project.attributes.element_attributes() {
      product.set_attr(name, value);
    }
    product
  }

  fn package_element(&self) -> Element {
    let project = self.project;
    let mut package = Element::new("Package")
      .with_attr("InstallerVersion", "200")
      .with_attr("Compressed", "yes");
    if let Some(description) = &project.description {
      package.set_attr("Description", description.as_str());
    }
    if !project.manufacturer.is_empty() {
      package.set_attr("Manufacturer", project.manufacturer.as_str());
    }
    package
  }

  /// Project-level generic items. Their components live directly under
  /// `TARGETDIR`; parent-level elements go into `Product`.
  fn process_project_items(&mut self) -> Result<ProcessedItems, CompileError> {
    let project = self.project;
    let mut ctx = ProcessingContext::new(project, &mut self.ids, Some(TARGET_DIR_ID.to_string()));
    for item in &project.generic_items {
      item.process(&mut ctx)?;
    }
    let processed = ctx.finish();

    debug!(components = processed.components.len(), "processed project-level items");
    self.absorb(&processed, &[]);
    Ok(processed)
  }

  /// Record the component refs and flags produced by processing items.
  fn absorb(&mut self, processed: &ProcessedItems, inherited: &[String]) {
    for component in &processed.component_refs {
      let features = if component.features.is_empty() {
        inherited.to_vec()
      } else {
        component.features.clone()
      };
      self.record("Component", component.id.clone(), component.id.clone());
      self.component_refs.push(ComponentRef {
        id: component.id.clone(),
        features,
      });
    }
    self.uses_util_extension |= processed.uses_util_extension;
  }

  /// New `Component` element with a stable GUID, registered for the given features.
  fn component(&mut self, id: String, features: &[String]) -> Element {
    let guid = stable_guid(&self.project.guid_seed(), &id);
    self.record("Component", id.clone(), id.clone());
    self.component_refs.push(ComponentRef {
      id: id.clone(),
      features: features.to_vec(),
    });
    Element::new("Component").with_attr("Id", id).with_attr("Guid", guid)
  }

  fn record(&mut self, kind: &'static str, id: String, source: String) {
    self.assigned.push(AssignedId { kind, id, source });
  }
}

/// First non-empty feature list, outermost declaration last.
fn inherit<'a>(levels: &[&'a [String]]) -> &'a [String] {
  levels.iter().copied().find(|f| !f.is_empty()).unwrap_or(&[])
}
