//! Static projection rule tables and the values they produce.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Version;
use crate::xml::Element;

/// Prefix of raw attribute keys addressed to the enclosing component.
const COMPONENT_PREFIX: &str = "Component:";

/// Whether a field must be present in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
  Required,
  Optional,
  /// Optional, and also omitted when the rendered value equals the default.
  OptionalWithDefault(&'static str),
}

/// Where a field's value lands in the output element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Attribute,
  /// Element text content.
  Text,
  /// Repeated child elements.
  Children,
}

/// A field value read from an entity, before transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Str(String),
  Bool(bool),
  Int(i64),
  Version(Version),
  /// Textual token of an enumeration.
  Token(&'static str),
  Children(Vec<Element>),
}

impl Value {
  /// Empty strings and empty collections count as unset.
  pub fn is_absent(&self) -> bool {
    match self {
      Value::Str(s) => s.is_empty(),
      Value::Children(children) => children.is_empty(),
      _ => false,
    }
  }

  /// Attribute text of a scalar value. Children render as an empty string.
  pub fn render(&self) -> String {
    match self {
      Value::Str(s) => s.clone(),
      Value::Bool(true) => "yes".to_string(),
      Value::Bool(false) => "no".to_string(),
      Value::Int(n) => n.to_string(),
      Value::Version(v) => v.to_string(),
      Value::Token(t) => t.to_string(),
      Value::Children(_) => String::new(),
    }
  }
}

/// One entry of a type's projection table.
pub struct FieldRule<T> {
  /// Field name, used in error messages.
  pub field: &'static str,
  /// Output attribute name. Defaults to the field name.
  pub target: &'static str,
  pub presence: Presence,
  pub role: Role,
  pub get: fn(&T) -> Option<Value>,
}

impl<T> FieldRule<T> {
  pub const fn required(field: &'static str, get: fn(&T) -> Option<Value>) -> Self {
    Self {
      field,
      target: field,
      presence: Presence::Required,
      role: Role::Attribute,
      get,
    }
  }

  pub const fn optional(field: &'static str, get: fn(&T) -> Option<Value>) -> Self {
    Self {
      field,
      target: field,
      presence: Presence::Optional,
      role: Role::Attribute,
      get,
    }
  }

  pub const fn with_default(field: &'static str, default: &'static str, get: fn(&T) -> Option<Value>) -> Self {
    Self {
      field,
      target: field,
      presence: Presence::OptionalWithDefault(default),
      role: Role::Attribute,
      get,
    }
  }

  /// Emit under a different attribute name.
  pub const fn renamed(self, target: &'static str) -> Self {
    Self { target, ..self }
  }

  pub const fn as_text(self) -> Self {
    Self { role: Role::Text, ..self }
  }

  pub const fn as_children(self) -> Self {
    Self {
      role: Role::Children,
      ..self
    }
  }
}

impl<T> fmt::Debug for FieldRule<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FieldRule")
      .field("field", &self.field)
      .field("target", &self.target)
      .field("presence", &self.presence)
      .field("role", &self.role)
      .finish()
  }
}

/// Free-form attributes attached to an entity, written verbatim.
///
/// Keys of the form `Component:Name` are not written on the entity's own
/// element; they belong to the component that encloses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttributes(BTreeMap<String, String>);

impl RawAttributes {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Attributes for the entity's own element.
  pub fn element_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
    self.iter().filter(|(k, _)| !k.starts_with(COMPONENT_PREFIX))
  }

  /// Attributes for the enclosing component, with the prefix stripped.
  pub fn component_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .iter()
      .filter_map(|(k, v)| k.strip_prefix(COMPONENT_PREFIX).map(|name| (name, v)))
  }

  /// Copy every entry of `other` over this bag.
  pub fn extend_from(&mut self, other: &RawAttributes) {
    for (k, v) in other.iter() {
      self.insert(k, v);
    }
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawAttributes {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn booleans_render_as_yes_no() {
    assert_eq!(Value::Bool(true).render(), "yes");
    assert_eq!(Value::Bool(false).render(), "no");
  }

  #[test]
  fn versions_render_dotted() {
    let version: Version = "1.2.3".parse().unwrap();
    assert_eq!(Value::Version(version).render(), "1.2.3");
  }

  #[test]
  fn only_empty_values_are_absent() {
    assert!(Value::Str(String::new()).is_absent());
    assert!(Value::Children(Vec::new()).is_absent());
    assert!(!Value::Bool(false).is_absent());
    assert!(!Value::Int(0).is_absent());
  }

  #[test]
  fn raw_attributes_split_by_prefix() {
    let raw: RawAttributes = [("Checksum", "yes"), ("Component:Permanent", "yes")].into_iter().collect();

    let own: Vec<_> = raw.element_attributes().collect();
    let component: Vec<_> = raw.component_attributes().collect();

    assert_eq!(own, vec![("Checksum", "yes")]);
    assert_eq!(component, vec![("Permanent", "yes")]);
  }
}
