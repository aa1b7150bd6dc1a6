//! Turning display names and paths into identifier candidates.

use crate::consts::{MAX_ID_LENGTH, SPECIAL_FOLDERS};

use super::EntityKind;

/// Produce the identifier candidate for `raw_name` before collision handling.
pub fn normalize_name(kind: EntityKind, raw_name: &str) -> String {
  let mut name = raw_name.trim();

  if !kind.is_directory_like() || is_rooted(name) {
    name = file_name(name);
  }
  if name.is_empty() {
    name = kind.type_name();
  }

  let mut candidate = expand(name, true);

  // Directory ids spell out their whole path and are never truncated.
  if !kind.is_directory_like() && candidate.len() > MAX_ID_LENGTH {
    // Escaped candidates are pure ascii, so byte slicing is safe.
    candidate = format!("_...{}", &candidate[candidate.len() - MAX_ID_LENGTH..]);
  }

  // `name1` must never look like the suffixed form `name.1`.
  if candidate.ends_with(|c: char| c.is_ascii_digit()) {
    candidate.push('_');
  }

  candidate
}

/// Expand folder placeholders, turn `\` into `.` and escape illegal characters.
///
/// With `fix_start_digit` a leading digit or `.` is protected by a `_` prefix.
/// A leading `.` that survives is replaced by `_`.
pub fn expand(path: &str, fix_start_digit: bool) -> String {
  let expanded = expand_env_consts(path).replace('\\', ".");
  let mut escaped = escape_illegal_chars(&expanded);

  if fix_start_digit && escaped.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
    escaped.insert(0, '_');
  }
  if let Some(rest) = escaped.strip_prefix('.') {
    escaped = format!("_{}", rest);
  }
  escaped
}

/// Replace `%ProgramFiles%` style and `[ProgramFilesFolder]` style placeholders
/// with the bare folder id.
pub fn expand_env_consts(path: &str) -> String {
  let mut path = path.to_string();
  for (placeholder, folder) in SPECIAL_FOLDERS {
    if path.contains(placeholder) {
      path = path.replace(placeholder, folder);
    }
    let bracketed = format!("[{}]", folder);
    if path.contains(&bracketed) {
      path = path.replace(&bracketed, folder);
    }
  }
  path
}

/// Replace every character outside `[A-Za-z0-9._]` with its hex code point.
fn escape_illegal_chars(data: &str) -> String {
  let mut escaped = String::with_capacity(data.len());
  for ch in data.chars() {
    if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
      escaped.push(ch);
    } else {
      escaped.push_str(&format!("{:x}", ch as u32));
    }
  }
  escaped
}

/// Drive (`C:`), UNC (`\\server`) and root-relative (`\`, `/`) paths.
pub fn is_rooted(path: &str) -> bool {
  let bytes = path.as_bytes();
  if bytes.first().is_some_and(|b| *b == b'\\' || *b == b'/') {
    return true;
  }
  bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// The last non-empty segment of a `\` or `/` separated path.
pub fn file_name(path: &str) -> &str {
  path
    .split(['\\', '/'])
    .rev()
    .find(|segment| !segment.is_empty())
    .unwrap_or("")
}

/// The standard directory id a path segment stands for, if it is a special folder.
///
/// Accepts the placeholder (`%ProgramFiles%`), the bracketed property
/// (`[ProgramFilesFolder]`) and the bare id (`ProgramFilesFolder`).
pub fn special_folder_id(segment: &str) -> Option<&'static str> {
  let bare = segment
    .strip_prefix('[')
    .and_then(|s| s.strip_suffix(']'))
    .unwrap_or(segment);

  SPECIAL_FOLDERS
    .iter()
    .find(|(placeholder, folder)| placeholder.eq_ignore_ascii_case(segment) || folder.eq_ignore_ascii_case(bare))
    .map(|(_, folder)| *folder)
}
