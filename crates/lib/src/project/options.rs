use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FEATURE_NAME, INSTALL_DIR_ID};

/// What to emit for a directory that ends up with nothing to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDirectoryPolicy {
  /// Keep the directory alive with an empty component that creates it.
  #[default]
  Component,
  /// Drop directories that hold nothing anywhere below them.
  Elide,
  /// Emit the bare directory element.
  Keep,
}

/// Knobs for one compilation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
  /// Id given to the installation directory. `None` disables auto assignment.
  pub install_dir_id: Option<String>,
  pub empty_directories: EmptyDirectoryPolicy,
  /// Feature receiving components that name no feature of their own.
  pub default_feature: String,
  /// Emit the project's `UI` definition, if it has one.
  pub emit_ui: bool,
}

impl Default for CompilerOptions {
  fn default() -> Self {
    Self {
      install_dir_id: Some(INSTALL_DIR_ID.to_string()),
      empty_directories: EmptyDirectoryPolicy::default(),
      default_feature: DEFAULT_FEATURE_NAME.to_string(),
      emit_ui: true,
    }
  }
}
