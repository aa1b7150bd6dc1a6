mod build;
mod ids;
mod inspect;

pub use build::cmd_build;
pub use ids::cmd_ids;
pub use inspect::cmd_inspect;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use wixgen_lib::{Compiled, Manifest, Project, compile};

/// A manifest loaded, converted and compiled in one go.
pub(crate) struct Loaded {
  pub manifest: Manifest,
  pub project: Project,
  pub compiled: Compiled,
}

pub(crate) fn load_and_compile(path: &Path) -> Result<Loaded> {
  let manifest = Manifest::load(path).with_context(|| format!("Failed to load manifest: {}", path.display()))?;
  let project = manifest
    .clone()
    .into_project()
    .with_context(|| format!("Invalid manifest: {}", path.display()))?;
  debug!(project = %project.name, dirs = project.dirs.len(), "converted manifest");
  let compiled = compile(&project).with_context(|| format!("Failed to compile: {}", path.display()))?;
  info!(path = %path.display(), ids = compiled.ids.len(), "compiled manifest");

  Ok(Loaded {
    manifest,
    project,
    compiled,
  })
}
