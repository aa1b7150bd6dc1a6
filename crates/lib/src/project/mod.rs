//! The authoring-time root of an installer model.
//!
//! A [`Project`] owns the directory arena and every project-level entity.
//! Directory declarations are resolved into the tree as they are added, so the
//! tree is already normalized when a compilation pass starts.

mod options;

pub use options::{CompilerOptions, EmptyDirectoryPolicy};

use tracing::debug;

use crate::dir::{Dir, DirId, DirTree, Item, StructuralError};
use crate::entity::{Feature, GenericItem, MajorUpgrade, Media, Property, Version};
use crate::projection::RawAttributes;
use crate::ui::CustomUi;

/// Product metadata and the entity graph of one installer.
#[derive(Debug, Clone)]
pub struct Project {
  pub name: String,
  pub version: Version,
  pub manufacturer: String,
  pub language: String,
  pub codepage: String,
  pub description: Option<String>,
  /// Seed for every derived GUID. Falls back to the project name.
  pub guid: Option<String>,
  /// Product code. Unset means "generate a new one on every build" (`*`).
  pub product_id: Option<String>,
  /// Derived from the GUID seed when unset.
  pub upgrade_code: Option<String>,
  /// Prefix for relative file sources.
  pub source_base_dir: Option<String>,
  pub dirs: DirTree,
  pub features: Vec<Feature>,
  pub properties: Vec<Property>,
  /// Registry values, environment variables and the like declared outside
  /// any directory.
  pub generic_items: Vec<GenericItem>,
  pub media: Media,
  pub major_upgrade: Option<MajorUpgrade>,
  pub ui: Option<CustomUi>,
  pub options: CompilerOptions,
  pub attributes: RawAttributes,
}

impl Project {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      version: Version::default(),
      manufacturer: String::new(),
      language: "1033".to_string(),
      codepage: "1252".to_string(),
      description: None,
      guid: None,
      product_id: None,
      upgrade_code: None,
      source_base_dir: None,
      dirs: DirTree::new(),
      features: Vec::new(),
      properties: Vec::new(),
      generic_items: Vec::new(),
      media: Media::default(),
      major_upgrade: None,
      ui: None,
      options: CompilerOptions::default(),
      attributes: RawAttributes::new(),
    }
  }

  pub fn guid_seed(&self) -> String {
    self.guid.clone().unwrap_or_else(|| self.name.clone())
  }

  /// Declare a top-level directory, merging it with already declared paths.
  pub fn add_dir(&mut self, dir: Dir) -> Result<DirId, StructuralError> {
    debug!(path = %dir.path, "adding directory");
    self.dirs.add(None, dir)
  }

  /// Declare any item at project level.
  ///
  /// Files and shortcuts must live in a directory.
  pub fn add(&mut self, item: impl Into<Item>) -> Result<(), StructuralError> {
    match item.into() {
      Item::Dir(dir) => {
        self.add_dir(dir)?;
      }
      Item::Generic(generic) => self.generic_items.push(generic),
      Item::Feature(feature) => self.features.push(feature),
      Item::Property(property) => self.properties.push(property),
      Item::Media(media) => self.media = media,
      Item::Dialog(dialog) => {
        self.ui.get_or_insert_with(CustomUi::new).sequence.register(dialog);
      }
      other @ (Item::File(_) | Item::Files(_) | Item::Shortcut(_)) => {
        return Err(StructuralError {
          item: other.type_name(),
          container: "Project",
        });
      }
    }
    Ok(())
  }

  pub fn find_dir(&self, path: &str) -> Option<DirId> {
    self.dirs.find(path)
  }

  /// A declared feature, searched through nested ones.
  pub fn feature(&self, name: &str) -> Option<&Feature> {
    self
      .features
      .iter()
      .flat_map(Feature::walk)
      .find(|f| f.name.eq_ignore_ascii_case(name))
  }
}
