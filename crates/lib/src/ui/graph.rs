//! Dialog navigation graph.
//!
//! Built from a compiled sequence: one node per dialog, one edge per action
//! that moves to another dialog. Used to inspect a UI flow, not to run it.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};

use super::sequence::CompiledSequence;
use super::types::Event;

/// How one dialog leads to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub control: String,
  pub event: Event,
  pub condition: String,
}

pub struct NavigationGraph {
  graph: DiGraph<String, Transition>,
  nodes: HashMap<String, NodeIndex>,
}

impl NavigationGraph {
  pub fn from_sequence(sequence: &CompiledSequence) -> Self {
    let mut nav = Self {
      graph: DiGraph::new(),
      nodes: HashMap::new(),
    };

    for dialog in &sequence.custom_dialogs {
      nav.node(&dialog.id);
    }

    for entry in &sequence.entries {
      let from = nav.node(&entry.dialog);
      for action in &entry.actions {
        let Some(event) = action.event.filter(|e| e.navigates()) else {
          continue;
        };
        if action.value.is_empty() {
          continue;
        }
        let to = nav.node(&action.value);
        nav.graph.add_edge(from, to, Transition {
          control: entry.control.clone(),
          event,
          condition: action.condition.clone(),
        });
      }
    }

    nav
  }

  fn node(&mut self, dialog: &str) -> NodeIndex {
    if let Some(&idx) = self.nodes.get(dialog) {
      return idx;
    }
    let idx = self.graph.add_node(dialog.to_string());
    self.nodes.insert(dialog.to_string(), idx);
    idx
  }

  pub fn dialog_count(&self) -> usize {
    self.graph.node_count()
  }

  pub fn transition_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Every dialog in the graph, sorted.
  pub fn dialogs(&self) -> Vec<&str> {
    let mut dialogs: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
    dialogs.sort_unstable();
    dialogs
  }

  pub fn contains(&self, dialog: &str) -> bool {
    self.nodes.contains_key(dialog)
  }

  /// Dialogs directly reachable from `dialog`, sorted.
  pub fn successors(&self, dialog: &str) -> Vec<&str> {
    let Some(&idx) = self.nodes.get(dialog) else {
      return Vec::new();
    };
    let set: BTreeSet<&str> = self
      .graph
      .neighbors_directed(idx, Direction::Outgoing)
      .map(|n| self.graph[n].as_str())
      .collect();
    set.into_iter().collect()
  }

  /// Every dialog reachable from `dialog`, including itself, sorted.
  pub fn reachable_from(&self, dialog: &str) -> Vec<&str> {
    let Some(&start) = self.nodes.get(dialog) else {
      return Vec::new();
    };
    let mut bfs = Bfs::new(&self.graph, start);
    let mut found = BTreeSet::new();
    while let Some(idx) = bfs.next(&self.graph) {
      found.insert(self.graph[idx].as_str());
    }
    found.into_iter().collect()
  }

  /// Dialogs with no incoming transitions, sorted.
  pub fn entry_points(&self) -> Vec<&str> {
    let set: BTreeSet<&str> = self
      .graph
      .node_indices()
      .filter(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
      .map(|idx| self.graph[idx].as_str())
      .collect();
    set.into_iter().collect()
  }

  /// All transitions leaving `dialog`, in sequence order.
  pub fn transitions(&self, dialog: &str) -> Vec<(&str, &Transition)> {
    let Some(&idx) = self.nodes.get(dialog) else {
      return Vec::new();
    };
    let mut edges: Vec<_> = self
      .graph
      .edges_directed(idx, Direction::Outgoing)
      .map(|e| (e.id(), self.graph[e.target()].as_str(), e.weight()))
      .collect();
    edges.sort_by_key(|(id, _, _)| *id);
    edges.into_iter().map(|(_, to, t)| (to, t)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::{CustomUi, Dialog, DialogAction, UiSequence};

  #[test]
  fn stock_flow_reaches_verify_from_welcome() {
    let nav = NavigationGraph::from_sequence(&CustomUi::common_dialogs().compile());

    assert_eq!(nav.successors("WelcomeDlg"), vec!["LicenseAgreementDlg"]);
    let reachable = nav.reachable_from("WelcomeDlg");
    assert!(reachable.contains(&"VerifyReadyDlg"));
    assert!(reachable.contains(&"BrowseDlg"));
    assert!(!reachable.contains(&"ExitDialog"));
  }

  #[test]
  fn end_dialog_and_property_actions_add_no_edges() {
    let mut seq = UiSequence::new();
    seq.on("ExitDialog", "Finish", [DialogAction::close_dialog("Return")]);
    seq.on("InstallDirDlg", "ChangeFolder", [DialogAction::set_property("_BrowseProperty", "x")]);

    let nav = NavigationGraph::from_sequence(&seq.compile());

    assert_eq!(nav.transition_count(), 0);
    assert_eq!(nav.dialog_count(), 2);
    assert_eq!(nav.dialogs(), vec!["ExitDialog", "InstallDirDlg"]);
  }

  #[test]
  fn unreferenced_custom_dialog_is_an_entry_point() {
    let mut seq = UiSequence::new();
    seq.register(Dialog::new("OrphanDlg", 10, 10));
    seq.on("WelcomeDlg", "Next", [DialogAction::show_dialog("LicenseAgreementDlg")]);

    let nav = NavigationGraph::from_sequence(&seq.compile());

    assert_eq!(nav.entry_points(), vec!["OrphanDlg", "WelcomeDlg"]);
    assert_eq!(nav.reachable_from("OrphanDlg"), vec!["OrphanDlg"]);
    assert!(nav.reachable_from("Missing").is_empty());
  }

  #[test]
  fn transitions_keep_control_and_condition() {
    let nav = NavigationGraph::from_sequence(&CustomUi::common_dialogs().compile());
    let back = nav.transitions("VerifyReadyDlg");

    assert_eq!(back.len(), 2);
    assert_eq!(back[0].0, "InstallDirDlg");
    assert_eq!(back[0].1.condition, "NOT Installed");
    assert_eq!(back[1].1.control, "Back");
  }
}
