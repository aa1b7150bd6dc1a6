//! Implementation of the `wixgen build` command.
//!
//! Compiles a manifest and writes the rendered document. Nothing is written
//! unless the whole pass succeeds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use wixgen_lib::util::hash::hash_bytes;

use super::load_and_compile;
use crate::output::{plural, print_json, print_stat, print_success, print_warning, truncate_hash};

pub fn cmd_build(manifest_path: &Path, output: Option<&Path>, stdout: bool, json: bool) -> Result<()> {
  let loaded = load_and_compile(manifest_path)?;
  let xml = loaded.compiled.to_xml().context("Failed to render document")?;
  let fingerprint = loaded
    .manifest
    .fingerprint()
    .context("Failed to compute manifest hash")?;

  debug!(fingerprint = %fingerprint, bytes = xml.len(), "rendered document");

  if stdout {
    print!("{}", xml);
    return Ok(());
  }

  let output: PathBuf = output.map(Path::to_path_buf).unwrap_or_else(|| manifest_path.with_extension("wxs"));
  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
  }
  fs::write(&output, &xml).with_context(|| format!("Failed to write document: {}", output.display()))?;
  info!(output = %output.display(), "wrote document");

  let components = loaded.compiled.component_count();
  let directories = loaded.project.dirs.len();
  let document = hash_bytes(xml.as_bytes());

  if json {
    let json_output = serde_json::json!({
      "output": output.display().to_string(),
      "fingerprint": fingerprint.0,
      "document": document.0,
      "components": components,
      "directories": directories,
      "install_dir": loaded.compiled.install_dir,
    });
    print_json(&json_output)?;
  } else {
    print_success(&format!("Built {}", output.display()));
    print_stat("Product", &format!("{} {}", loaded.project.name, loaded.project.version));
    print_stat("Components", &components.to_string());
    print_stat("Directories", &plural(directories, "node"));
    if let Some(install_dir) = &loaded.compiled.install_dir {
      print_stat("Install dir", install_dir);
    }
    print_stat("Manifest", truncate_hash(&fingerprint.0));
    print_stat("Document", truncate_hash(&document.0));
    if components == 0 {
      print_warning("Nothing to install: no component was emitted.");
    }
  }

  Ok(())
}
