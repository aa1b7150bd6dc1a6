//! Identifier listing command implementation.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use wixgen_lib::AssignedId;

use super::load_and_compile;
use crate::output::{plural, print_info, print_json};

pub fn cmd_ids(manifest_path: &Path, kind: Option<&str>, json: bool) -> Result<()> {
  let loaded = load_and_compile(manifest_path)?;

  let ids: Vec<&AssignedId> = loaded
    .compiled
    .ids
    .iter()
    .filter(|a| kind.is_none_or(|k| a.kind.eq_ignore_ascii_case(k)))
    .collect();

  if json {
    return print_json(&ids);
  }

  if ids.is_empty() {
    print_info("No identifiers assigned.");
    return Ok(());
  }

  let width = ids.iter().map(|a| a.id.len()).max().unwrap_or(0);
  for assigned in &ids {
    let kind = format!("{:<10}", assigned.kind);
    println!(
      "{} {:<width$}  {}",
      kind.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      assigned.id,
      assigned.source,
      width = width
    );
  }
  println!();
  println!("{}", plural(ids.len(), "identifier"));

  Ok(())
}
