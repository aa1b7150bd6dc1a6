use std::fmt;

use thiserror::Error;

use crate::entity::{Feature, File, FileCollection, GenericItem, Media, Property, Shortcut};
use crate::id::IdSlot;
use crate::projection::RawAttributes;
use crate::ui::Dialog;

/// Handle of a node in a [`super::DirTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirId(pub(crate) usize);

impl DirId {
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for DirId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "dir#{}", self.0)
  }
}

/// One level of a target-side path.
///
/// `name` is a single path segment, or a full rooted path for roots only.
#[derive(Debug, Clone, Default)]
pub struct DirNode {
  pub name: String,
  pub id: IdSlot,
  pub parent: Option<DirId>,
  /// The node that synthesized this one while splitting a composite path.
  pub auto_parent: Option<DirId>,
  pub children: Vec<DirId>,
  pub files: Vec<File>,
  pub file_collections: Vec<FileCollection>,
  pub shortcuts: Vec<Shortcut>,
  pub generic_items: Vec<GenericItem>,
  pub features: Vec<String>,
  /// Raw attributes of the declaration that created this node. On a chain
  /// head they apply to every synthesized node below it instead.
  pub attributes: RawAttributes,
  /// Raw attributes of later declarations naming exactly this node.
  pub own_attributes: RawAttributes,
  pub install_dir: bool,
}

impl DirNode {
  pub(crate) fn new(name: &str, parent: Option<DirId>, auto_parent: Option<DirId>, features: &[String]) -> Self {
    Self {
      name: name.to_string(),
      parent,
      auto_parent,
      features: features.to_vec(),
      ..Default::default()
    }
  }

  /// Files, file collections or shortcuts held directly by this node.
  pub fn has_own_items_to_install(&self) -> bool {
    !self.files.is_empty() || !self.file_collections.is_empty() || !self.shortcuts.is_empty()
  }

  /// Nothing at all: no payload and no children.
  pub fn is_empty(&self) -> bool {
    !self.has_own_items_to_install() && self.generic_items.is_empty() && self.children.is_empty()
  }
}

/// A directory declaration: a possibly composite path plus its content.
#[derive(Debug, Clone, Default)]
pub struct Dir {
  pub path: String,
  /// Explicit id for the deepest node.
  pub id: Option<String>,
  pub features: Vec<String>,
  /// Attributes for the declared path. For a composite path they end up on
  /// every synthesized node rather than on its first segment.
  pub attributes: RawAttributes,
  pub install_dir: bool,
  pub items: Vec<Item>,
}

impl Dir {
  pub fn new(path: impl Into<String>, items: Vec<Item>) -> Self {
    Self {
      path: path.into(),
      items,
      ..Default::default()
    }
  }

  pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
    self.features.push(feature.into());
    self
  }

  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.insert(name, value);
    self
  }

  pub fn install_dir(mut self) -> Self {
    self.install_dir = true;
    self
  }
}

/// Anything that can be declared in a project.
///
/// Only directories and file-like items may be nested inside a directory.
#[derive(Debug, Clone)]
pub enum Item {
  Dir(Dir),
  File(File),
  Files(FileCollection),
  Shortcut(Shortcut),
  Generic(GenericItem),
  Feature(Feature),
  Property(Property),
  Media(Media),
  Dialog(Dialog),
}

impl Item {
  pub fn type_name(&self) -> &'static str {
    match self {
      Item::Dir(_) => "Dir",
      Item::File(_) => "File",
      Item::Files(_) => "Files",
      Item::Shortcut(_) => "Shortcut",
      Item::Generic(item) => item.type_name(),
      Item::Feature(_) => "Feature",
      Item::Property(_) => "Property",
      Item::Media(_) => "Media",
      Item::Dialog(_) => "Dialog",
    }
  }

  pub fn fits_in_dir(&self) -> bool {
    matches!(
      self,
      Item::Dir(_) | Item::File(_) | Item::Files(_) | Item::Shortcut(_) | Item::Generic(_)
    )
  }
}

impl From<Dir> for Item {
  fn from(value: Dir) -> Self {
    Item::Dir(value)
  }
}

impl From<File> for Item {
  fn from(value: File) -> Self {
    Item::File(value)
  }
}

impl From<FileCollection> for Item {
  fn from(value: FileCollection) -> Self {
    Item::Files(value)
  }
}

impl From<Shortcut> for Item {
  fn from(value: Shortcut) -> Self {
    Item::Shortcut(value)
  }
}

impl From<GenericItem> for Item {
  fn from(value: GenericItem) -> Self {
    Item::Generic(value)
  }
}

impl From<Feature> for Item {
  fn from(value: Feature) -> Self {
    Item::Feature(value)
  }
}

impl From<Property> for Item {
  fn from(value: Property) -> Self {
    Item::Property(value)
  }
}

impl From<Media> for Item {
  fn from(value: Media) -> Self {
    Item::Media(value)
  }
}

impl From<Dialog> for Item {
  fn from(value: Dialog) -> Self {
    Item::Dialog(value)
  }
}

/// An item was placed in a container that does not accept its type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{item} is not expected to be a child of {container}")]
pub struct StructuralError {
  pub item: &'static str,
  pub container: &'static str,
}
