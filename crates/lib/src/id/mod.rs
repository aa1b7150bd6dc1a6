//! Deterministic, human-readable identifier allocation.
//!
//! Every entity that ends up in the output document needs an `Id` that is
//! unique within its element kind. Identifiers are derived from display names
//! (`readme.txt`, `ProgramFilesFolder.Acme.App`) and only get a numeric suffix
//! on collision (`readme.txt.1`).
//!
//! # Lazy allocation
//!
//! Entities do not own an id at construction time. An [`IdSlot`] holds either
//! an explicit id set by the user or a cached generated one, and the generated
//! id is computed the first time it is read through an [`IdAllocator`].
//!
//! # Generations
//!
//! The allocator's collision table is only meaningful for one compilation
//! pass. Each allocator (and each [`IdAllocator::reset`]) starts a new
//! generation, and a slot's cached id is only trusted when it was produced by
//! the generation doing the read. Ids read during an earlier pass are
//! re-allocated instead of silently colliding with fresh ones.

mod normalize;

pub use normalize::{expand, expand_env_consts, file_name, is_rooted, normalize_name, special_folder_id};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

/// Source of allocator generations. Zero is never handed out.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
  NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// The element kind an identifier is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
  Directory,
  File,
  FileCollection,
  Component,
  Feature,
  Shortcut,
  Property,
  RegistryValue,
  EnvironmentVariable,
  CloseApplication,
  Media,
}

impl EntityKind {
  /// Type name used when an entity has no display name at all.
  pub fn type_name(self) -> &'static str {
    match self {
      EntityKind::Directory => "Dir",
      EntityKind::File => "File",
      EntityKind::FileCollection => "Files",
      EntityKind::Component => "Component",
      EntityKind::Feature => "Feature",
      EntityKind::Shortcut => "Shortcut",
      EntityKind::Property => "Property",
      EntityKind::RegistryValue => "RegValue",
      EntityKind::EnvironmentVariable => "EnvironmentVariable",
      EntityKind::CloseApplication => "CloseApplication",
      EntityKind::Media => "Media",
    }
  }

  /// Directory-like kinds keep their full (dotted) path in the id.
  pub fn is_directory_like(self) -> bool {
    matches!(self, EntityKind::Directory)
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name())
  }
}

/// Collision table for one compilation pass.
///
/// Maps `kind -> lowercased candidate -> last suffix handed out`. The table is
/// never cleared implicitly; [`IdAllocator::reset`] is the only way back to a
/// blank state.
#[derive(Debug)]
pub struct IdAllocator {
  generation: u64,
  counters: HashMap<EntityKind, HashMap<String, u32>>,
  taken: HashSet<String>,
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self::new()
  }
}

impl IdAllocator {
  pub fn new() -> Self {
    Self {
      generation: next_generation(),
      counters: HashMap::new(),
      taken: HashSet::new(),
    }
  }

  /// Clear every table and start a new generation.
  ///
  /// Ids cached in entities by the previous generation are ignored from now
  /// on and will be allocated again on their next read.
  pub fn reset(&mut self) {
    debug!(
      previous = self.generation,
      kinds = self.counters.len(),
      "resetting id allocator"
    );
    self.counters.clear();
    self.taken.clear();
    self.generation = next_generation();
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// True when nothing has been allocated since construction or the last reset.
  pub fn is_empty(&self) -> bool {
    self.taken.is_empty()
  }

  /// Allocate a fresh identifier for `raw_name` within `kind`.
  ///
  /// The first request for a candidate returns it unchanged; later requests
  /// for the same candidate (case-insensitively) get `.1`, `.2`, ... appended.
  pub fn allocate(&mut self, kind: EntityKind, raw_name: &str) -> String {
    let candidate = normalize_name(kind, raw_name);
    let key = candidate.to_lowercase();

    let counters = self.counters.entry(kind).or_default();
    let mut id = match counters.get_mut(&key) {
      None => {
        counters.insert(key, 0);
        candidate
      }
      Some(counter) => {
        *counter += 1;
        format!("{}.{}", candidate, counter)
      }
    };

    // Explicit-looking names such as `a.1` can still clash with a suffixed id.
    while self.taken.contains(&id) {
      id.push('_');
    }
    self.taken.insert(id.clone());

    trace!(kind = %kind, raw = raw_name, id = %id, "allocated id");
    id
  }

  /// Record an id chosen outside the allocator so generated ids avoid it.
  pub fn reserve(&mut self, id: &str) {
    self.taken.insert(id.to_string());
  }
}

/// An entity's identifier: explicit, or generated on first read.
#[derive(Debug, Default)]
pub struct IdSlot {
  explicit: Option<String>,
  generated: RefCell<Option<(u64, String)>>,
}

impl Clone for IdSlot {
  fn clone(&self) -> Self {
    Self {
      explicit: self.explicit.clone(),
      generated: RefCell::new(self.generated.borrow().clone()),
    }
  }
}

impl PartialEq for IdSlot {
  fn eq(&self, other: &Self) -> bool {
    self.explicit == other.explicit
  }
}

impl IdSlot {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn explicit(id: impl Into<String>) -> Self {
    Self {
      explicit: Some(id.into()),
      generated: RefCell::new(None),
    }
  }

  pub fn set(&mut self, id: impl Into<String>) {
    self.explicit = Some(id.into());
  }

  /// True when the user assigned the id; generated ids do not count.
  pub fn is_set(&self) -> bool {
    self.explicit.is_some()
  }

  pub fn explicit_id(&self) -> Option<&str> {
    self.explicit.as_deref()
  }

  /// The id generated for this slot by the given allocator's generation, if any.
  pub fn cached(&self, ids: &IdAllocator) -> Option<String> {
    self
      .generated
      .borrow()
      .as_ref()
      .filter(|(generation, _)| *generation == ids.generation())
      .map(|(_, id)| id.clone())
  }

  /// Read the effective id, allocating one on the first read of this generation.
  pub fn resolve(&self, kind: EntityKind, raw_name: &str, ids: &mut IdAllocator) -> String {
    if let Some(id) = &self.explicit {
      return id.clone();
    }
    if let Some(id) = self.cached(ids) {
      return id;
    }

    let id = ids.allocate(kind, raw_name);
    *self.generated.borrow_mut() = Some((ids.generation(), id.clone()));
    id
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_candidate_is_returned_unchanged() {
    let mut ids = IdAllocator::new();
    assert_eq!(ids.allocate(EntityKind::File, "readme.txt"), "readme.txt");
  }

  #[test]
  fn collisions_get_incrementing_suffixes() {
    let mut ids = IdAllocator::new();

    let a = ids.allocate(EntityKind::File, "bin\\Release\\app.exe");
    let b = ids.allocate(EntityKind::File, "bin\\Debug\\app.exe");
    let c = ids.allocate(EntityKind::File, "App.exe");

    assert_eq!(a, "app.exe");
    assert_eq!(b, "app.exe.1");
    assert_eq!(c, "App.exe.2");
  }

  #[test]
  fn ids_are_pairwise_distinct_within_a_kind() {
    let mut ids = IdAllocator::new();
    let names = ["a.txt", "a.txt", "A.TXT", "a.txt.1", "x\\a.txt", "", ""];

    let allocated: Vec<_> = names.iter().map(|n| ids.allocate(EntityKind::File, n)).collect();
    let unique: HashSet<_> = allocated.iter().collect();

    assert_eq!(unique.len(), allocated.len(), "duplicates in {:?}", allocated);
  }

  #[test]
  fn kinds_have_independent_counters() {
    let mut ids = IdAllocator::new();

    assert_eq!(ids.allocate(EntityKind::Feature, "Docs"), "Docs");
    assert_eq!(ids.allocate(EntityKind::Shortcut, "Docs"), "Docs_");
    assert_eq!(ids.allocate(EntityKind::Feature, "Docs"), "Docs.1");
  }

  #[test]
  fn reset_restores_first_candidates() {
    let mut ids = IdAllocator::new();
    ids.allocate(EntityKind::File, "setup.ini");
    ids.allocate(EntityKind::File, "setup.ini");

    ids.reset();

    assert!(ids.is_empty());
    assert_eq!(ids.allocate(EntityKind::File, "setup.ini"), "setup.ini");
  }

  #[test]
  fn slot_reads_are_stable_within_a_generation() {
    let mut ids = IdAllocator::new();
    let slot = IdSlot::new();

    let first = slot.resolve(EntityKind::File, "a.txt", &mut ids);
    let second = slot.resolve(EntityKind::File, "a.txt", &mut ids);

    assert_eq!(first, second);
    assert_eq!(ids.allocate(EntityKind::File, "a.txt"), "a.txt.1");
  }

  #[test]
  fn explicit_id_bypasses_the_allocator() {
    let mut ids = IdAllocator::new();
    let slot = IdSlot::explicit("MainExe");

    assert_eq!(slot.resolve(EntityKind::File, "app.exe", &mut ids), "MainExe");
    assert!(ids.is_empty());
  }

  #[test]
  fn stale_cached_id_is_reallocated_after_reset() {
    let mut ids = IdAllocator::new();
    let early = IdSlot::new();
    let late = IdSlot::new();

    // Read before the pass begins.
    early.resolve(EntityKind::File, "a.txt", &mut ids);
    ids.reset();

    let late_id = late.resolve(EntityKind::File, "a.txt", &mut ids);
    let early_id = early.resolve(EntityKind::File, "a.txt", &mut ids);

    assert_eq!(late_id, "a.txt");
    assert_eq!(early_id, "a.txt.1");
    assert!(early.cached(&ids).is_some());
  }

  #[test]
  fn separate_allocators_never_share_generations() {
    let a = IdAllocator::new();
    let b = IdAllocator::new();
    assert_ne!(a.generation(), b.generation());
  }
}
