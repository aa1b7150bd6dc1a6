//! UI sequence compilation.
//!
//! Actions are published per `(dialog, control)` pair and compiled into
//! ordered `Publish` entries plus the custom dialogs they reference. The
//! installer runtime evaluates the result; nothing here runs a dialog.

mod custom;
mod graph;
mod sequence;
mod types;

pub use custom::{CustomUi, INSTALL_DIR_PROPERTY};
pub use graph::{NavigationGraph, Transition};
pub use sequence::{CompiledEntry, CompiledSequence, ResolvedAction, UiSequence};
pub use types::{ConditionAction, Control, ControlCondition, Dialog, DialogAction, DialogRef, Event, TextStyle};
