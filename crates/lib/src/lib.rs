//! wixgen-lib: a declarative installer model compiled to WiX source
//!
//! This crate provides the engine behind the `wixgen` CLI:
//! - `id`: identifier allocation, unique per element kind within a pass
//! - `dir`: the directory arena that splits and merges composite paths
//! - `projection`: rule-driven projection of typed entities into elements
//! - `ui`: dialog navigation sequences compiled into ordered `Publish` entries
//! - `compile`: one compilation pass from a `Project` to a document tree
//! - `manifest`: the JSON authoring surface converted into a `Project`

pub mod compile;
pub mod consts;
pub mod dir;
pub mod entity;
pub mod id;
pub mod manifest;
pub mod project;
pub mod projection;
pub mod ui;
pub mod util;
pub mod xml;

pub use compile::{AssignedId, CompileError, Compiled, compile};
pub use manifest::{Manifest, ManifestError};
pub use project::{CompilerOptions, EmptyDirectoryPolicy, Project};
