//! The installable entities a project is built from.
//!
//! Plain records ([`File`], [`Feature`], [`Property`], ...) are projected by
//! their static rule tables. Items that insert their own subtree into the
//! output are grouped in the closed [`GenericItem`] enum.

mod generic;
mod types;
mod version;

pub use generic::*;
pub use types::*;
pub use version::{Version, VersionError};

use crate::id::special_folder_id;

/// Rewrite `%NAME%` placeholders as `[NAME]` property references.
///
/// Special folder placeholders use the folder id (`%ProgramFiles%` becomes
/// `[ProgramFilesFolder]`) and a separator right after a reference is
/// dropped, since the property value already ends with one.
pub fn normalize_wix_string(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  let mut rest = value;

  while let Some(start) = rest.find('%') {
    let after = &rest[start + 1..];
    let name_len = after.find('%').filter(|&end| {
      end > 0 && after[..end].chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });

    match name_len {
      Some(end) => {
        out.push_str(&rest[..start]);
        let placeholder = &rest[start..start + end + 2];
        let property = special_folder_id(placeholder).unwrap_or(&after[..end]);
        out.push('[');
        out.push_str(property);
        out.push(']');
        rest = &after[end + 1..];
      }
      None => {
        out.push_str(&rest[..=start]);
        rest = after;
      }
    }
  }
  out.push_str(rest);

  out.replace("]\\", "]").replace("]/", "]")
}
