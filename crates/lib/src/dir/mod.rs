//! Directory tree resolution.
//!
//! User-supplied paths such as `%ProgramFiles%\Acme\App` are split into one
//! node per segment. Intermediate nodes are synthesized and remember the node
//! that created them (`auto_parent`), and declarations that overlap an already
//! declared path reuse its nodes instead of duplicating them.
//!
//! Nodes live in an arena ([`DirTree`]) and are addressed by [`DirId`].

mod tree;
mod types;

pub use tree::DirTree;
pub use types::*;
