//! Inspect command implementation.
//!
//! Shows how the manifest resolves: the merged directory tree with assigned
//! ids, the feature tree, and the dialog navigation graph of the UI.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use wixgen_lib::dir::{DirId, DirTree};
use wixgen_lib::entity::Feature;
use wixgen_lib::ui::NavigationGraph;

use super::{Loaded, load_and_compile};
use crate::output::{self, indent, plural, print_info, print_json, print_stat, print_success};

#[derive(Debug, Serialize)]
struct DirectoryInfo {
  id: String,
  name: String,
  depth: usize,
  files: usize,
  install_dir: bool,
}

#[derive(Debug, Serialize)]
struct DialogInfo {
  dialog: String,
  next: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Inspection {
  product: String,
  version: String,
  install_dir: Option<String>,
  directories: Vec<DirectoryInfo>,
  features: Vec<String>,
  dialogs: Vec<DialogInfo>,
  entry_points: Vec<String>,
}

/// Directories in tree order, paired with the ids the pass assigned.
fn directories(loaded: &Loaded) -> Vec<DirectoryInfo> {
  fn walk(tree: &DirTree, dir: DirId, depth: usize, out: &mut Vec<(DirId, usize)>) {
    out.push((dir, depth));
    for &child in &tree.node(dir).children {
      walk(tree, child, depth + 1, out);
    }
  }

  let tree = &loaded.project.dirs;
  let mut order = Vec::new();
  for &root in tree.roots() {
    walk(tree, root, 0, &mut order);
  }

  let ids = loaded.compiled.ids.iter().filter(|a| a.kind == "Directory");
  order
    .into_iter()
    .zip(ids)
    .map(|((dir, depth), assigned)| {
      let node = tree.node(dir);
      DirectoryInfo {
        id: assigned.id.clone(),
        name: node.name.clone(),
        depth,
        files: node.files.len() + node.file_collections.iter().map(|c| c.files.len()).sum::<usize>(),
        install_dir: loaded.compiled.install_dir.as_deref() == Some(assigned.id.as_str()),
      }
    })
    .collect()
}

fn feature_lines(features: &[Feature], depth: usize, out: &mut Vec<String>) {
  for feature in features {
    out.push(format!("{}{}", indent(depth), feature.name));
    feature_lines(&feature.children, depth + 1, out);
  }
}

pub fn cmd_inspect(manifest_path: &Path, verbose: bool, json: bool) -> Result<()> {
  let loaded = load_and_compile(manifest_path)?;
  let project = &loaded.project;

  let graph = project
    .ui
    .as_ref()
    .map(|ui| NavigationGraph::from_sequence(&ui.compile()));
  let (dialogs, entry_points) = match &graph {
    Some(graph) => {
      let dialogs: Vec<DialogInfo> = graph
        .dialogs()
        .into_iter()
        .map(|dialog| DialogInfo {
          dialog: dialog.to_string(),
          next: graph.successors(dialog).into_iter().map(String::from).collect(),
        })
        .collect();
      let entry_points: Vec<String> = graph.entry_points().into_iter().map(String::from).collect();
      (dialogs, entry_points)
    }
    None => (Vec::new(), Vec::new()),
  };

  let directories = directories(&loaded);

  if json {
    let mut features = Vec::new();
    feature_lines(&project.features, 0, &mut features);
    let inspection = Inspection {
      product: project.name.clone(),
      version: project.version.to_string(),
      install_dir: loaded.compiled.install_dir.clone(),
      directories,
      features: features.into_iter().map(|f| f.trim().to_string()).collect(),
      dialogs,
      entry_points,
    };
    return print_json(&inspection);
  }

  print_success(&format!("{} {}", project.name, project.version));
  print_stat("Directories", &plural(directories.len(), "node"));
  print_stat("Components", &loaded.compiled.component_count().to_string());

  println!();
  println!("Directories:");
  for dir in &directories {
    let marker = if dir.install_dir { " (install dir)" } else { "" };
    if verbose && dir.files > 0 {
      println!("{}{} [{}]{} {}", indent(dir.depth), dir.name, dir.id, marker, plural(dir.files, "file"));
    } else {
      println!("{}{} [{}]{}", indent(dir.depth), dir.name, dir.id, marker);
    }
  }

  if !project.features.is_empty() {
    println!();
    println!("Features:");
    let mut lines = Vec::new();
    feature_lines(&project.features, 0, &mut lines);
    for line in lines {
      println!("{}", line);
    }
  }

  println!();
  match &graph {
    Some(graph) => {
      println!(
        "Dialogs: {}, {}",
        plural(graph.dialog_count(), "dialog"),
        plural(graph.transition_count(), "transition")
      );
      for dialog in &dialogs {
        if dialog.next.is_empty() {
          println!("  {}", dialog.dialog);
        } else {
          println!("  {} {} {}", dialog.dialog, output::symbols::ARROW, dialog.next.join(", "));
        }
      }
    }
    None => print_info("No UI defined."),
  }

  Ok(())
}
