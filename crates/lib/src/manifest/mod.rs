//! Declarative JSON description of a project.
//!
//! A manifest is the authoring surface used by the CLI. It is parsed with
//! serde, validated, and converted into a [`Project`] whose directory tree is
//! resolved while the declarations are added.
//!
//! ```json
//! {
//!   "product": { "name": "Acme", "version": "1.2.0", "manufacturer": "Acme Ltd" },
//!   "features": [{ "name": "Complete" }],
//!   "items": [
//!     { "kind": "dir", "path": "%ProgramFiles%\\Acme", "items": [
//!       { "kind": "file", "source": "bin\\acme.exe" }
//!     ] }
//!   ],
//!   "ui": { "preset": "common_dialogs" },
//!   "options": { "empty_directories": "elide" }
//! }
//! ```

mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::dir::{Item, StructuralError};
use crate::entity::VersionError;
use crate::project::{CompilerOptions, Project};
use crate::ui::CustomUi;
use crate::util::hash::{HashError, Hashable, ObjectHash};

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse manifest: {0}")]
  Parse(#[from] serde_json::Error),

  #[error(transparent)]
  Version(#[from] VersionError),

  #[error(transparent)]
  Structural(#[from] StructuralError),

  #[error("{item} references undeclared feature '{feature}'")]
  UnknownFeature { feature: String, item: String },
}

/// The complete declarative description of one installer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  pub product: ProductDecl,
  #[serde(default)]
  pub features: Vec<FeatureDecl>,
  #[serde(default)]
  pub properties: Vec<PropertyDecl>,
  /// Directories and project-level items, in declaration order.
  #[serde(default)]
  pub items: Vec<ItemDecl>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media: Option<MediaDecl>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub major_upgrade: Option<MajorUpgradeDecl>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ui: Option<UiDecl>,
  #[serde(default)]
  pub options: CompilerOptions,
}

impl Hashable for Manifest {}

impl Manifest {
  pub fn from_json(text: &str) -> Result<Self, ManifestError> {
    Ok(serde_json::from_str(text)?)
  }

  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest = Self::from_json(&text)?;
    debug!(path = %path.display(), items = manifest.items.len(), "loaded manifest");
    Ok(manifest)
  }

  /// Content hash of the manifest, stable across key order in the source file.
  pub fn fingerprint(&self) -> Result<ObjectHash, HashError> {
    self.compute_hash()
  }

  /// Reject references to features the manifest never declares.
  ///
  /// A manifest without any feature relies on the default feature and is
  /// not checked.
  pub fn validate(&self) -> Result<(), ManifestError> {
    if self.features.is_empty() {
      return Ok(());
    }

    let declared: Vec<&str> = self.features.iter().flat_map(FeatureDecl::names).collect();
    let mut refs = Vec::new();
    for item in &self.items {
      item.feature_refs(&mut refs);
    }

    for (feature, item) in refs {
      let known = feature.eq_ignore_ascii_case(&self.options.default_feature)
        || declared.iter().any(|name| name.eq_ignore_ascii_case(&feature));
      if !known {
        return Err(ManifestError::UnknownFeature { feature, item });
      }
    }
    Ok(())
  }

  /// Validate and build the project.
  pub fn into_project(self) -> Result<Project, ManifestError> {
    self.validate()?;

    let product = self.product;
    let mut project = Project::new(product.name);
    project.version = product.version.parse()?;
    project.manufacturer = product.manufacturer;
    if let Some(language) = product.language {
      project.language = language;
    }
    if let Some(codepage) = product.codepage {
      project.codepage = codepage;
    }
    project.description = product.description;
    project.guid = product.guid;
    project.product_id = product.product_id;
    project.upgrade_code = product.upgrade_code;
    project.source_base_dir = product.source_base_dir;
    project.attributes = product.attributes;
    project.options = self.options;

    for feature in self.features {
      project.add(Item::Feature(feature.into_feature()))?;
    }
    for property in self.properties {
      project.add(Item::Property(property.into_property()))?;
    }
    if let Some(media) = self.media {
      project.add(Item::Media(media.into_media()))?;
    }
    project.major_upgrade = self.major_upgrade.map(MajorUpgradeDecl::into_major_upgrade);

    for item in self.items {
      project.add(item.into_item())?;
    }

    if let Some(ui) = self.ui {
      project.ui = Some(build_ui(ui));
    }

    info!(
      project = %project.name,
      dirs = project.dirs.len(),
      features = project.features.len(),
      "built project from manifest"
    );
    Ok(project)
  }
}

fn build_ui(decl: UiDecl) -> CustomUi {
  let mut ui = match (decl.post_license, decl.preset) {
    (Some(dialog), _) => CustomUi::post_license_dialog(dialog),
    (None, UiPreset::CommonDialogs) => CustomUi::common_dialogs(),
    (None, UiPreset::Stock) => CustomUi::new(),
    (None, UiPreset::DialogSequence) => CustomUi::dialog_sequence(),
  };

  for dialog in decl.dialogs {
    ui.sequence.register(dialog);
  }
  for publish in decl.publish {
    if publish.replace {
      ui.sequence.clear(&publish.dialog, &publish.control);
    }
    ui.on(publish.dialog.as_str(), &publish.control, publish.actions);
  }
  for (name, value) in decl.properties {
    ui.set_property(name, value);
  }
  ui.attributes.extend_from(&decl.attributes);
  ui
}
