//! Attribute projection: entity fields to output elements.
//!
//! Each projectable type declares a static table of [`FieldRule`]s in
//! declaration order. [`project`] walks that table, drops absent optional
//! values, transforms the rest into attribute text or child elements, resolves
//! the identifier last and finally merges the entity's raw attributes on top.
//!
//! # Example
//!
//! ```ignore
//! impl Projectable for Media {
//!   const ELEMENT: &'static str = "Media";
//!
//!   fn rules() -> &'static [FieldRule<Self>] {
//!     const RULES: &[FieldRule<Media>] = &[
//!       FieldRule::required("Id", |m: &Media| Some(Value::Int(m.id))),
//!       FieldRule::optional("Cabinet", |m: &Media| m.cabinet.clone().map(Value::Str)),
//!       FieldRule::optional("EmbedCab", |m: &Media| m.embed_cab.map(Value::Bool)),
//!     ];
//!     RULES
//!   }
//!
//!   fn raw_attributes(&self) -> &RawAttributes {
//!     &self.attributes
//!   }
//! }
//! ```

mod context;
mod rules;

pub use context::{ComponentRef, ProcessedItems, ProcessingContext, SelfDescribing};
pub use rules::{FieldRule, Presence, RawAttributes, Role, Value};

use std::borrow::Cow;

use thiserror::Error;
use tracing::trace;

use crate::id::{EntityKind, IdAllocator, IdSlot};
use crate::xml::Element;

/// Errors raised while projecting an entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
  #[error("required field `{field}` of {entity} has no value")]
  MissingRequired { field: &'static str, entity: &'static str },
}

/// How an entity is identified in the output.
pub struct Identity<'a> {
  pub kind: EntityKind,
  pub slot: &'a IdSlot,
  /// Raw name the generated id is derived from.
  pub source: Cow<'a, str>,
}

/// A type that can be projected onto an output element.
pub trait Projectable: Sized + 'static {
  /// Name of the produced element.
  const ELEMENT: &'static str;

  /// Projection rules in declaration order.
  fn rules() -> &'static [FieldRule<Self>];

  fn raw_attributes(&self) -> &RawAttributes;

  /// Identifier slot of the entity. Types without an `Id` role return `None`
  /// and, if they need one, declare it as an ordinary rule.
  fn identity(&self) -> Option<Identity<'_>> {
    None
  }
}

/// Result of projecting one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projected {
  pub element: Element,
  /// Raw attributes addressed to the enclosing component (`Component:Name`).
  pub component_attributes: Vec<(String, String)>,
}

/// Read an entity's effective id through the allocator.
pub fn resolve_id<T: Projectable>(entity: &T, ids: &mut IdAllocator) -> Option<String> {
  entity
    .identity()
    .map(|identity| identity.slot.resolve(identity.kind, &identity.source, ids))
}

/// Project an entity onto a new element.
pub fn project<T: Projectable>(entity: &T, ids: &mut IdAllocator) -> Result<Projected, ProjectionError> {
  let mut element = Element::new(T::ELEMENT);

  for rule in T::rules() {
    let value = (rule.get)(entity).filter(|v| !v.is_absent());

    let Some(value) = value else {
      if rule.presence == Presence::Required {
        return Err(ProjectionError::MissingRequired {
          field: rule.field,
          entity: T::ELEMENT,
        });
      }
      continue;
    };

    match value {
      Value::Children(children) => {
        for child in children {
          element.push(child);
        }
      }
      scalar => {
        let text = scalar.render();
        if matches!(rule.presence, Presence::OptionalWithDefault(default) if text == default) {
          trace!(element = T::ELEMENT, field = rule.field, "omitting default value");
          continue;
        }
        match rule.role {
          Role::Text => element.push_text(text),
          Role::Attribute | Role::Children => element.set_attr(rule.target, text),
        }
      }
    }
  }

  // Last, so that a failed projection never consumes an id.
  if let Some(id) = resolve_id(entity, ids) {
    element.set_attr_first("Id", id);
  }

  let raw = entity.raw_attributes();
  for (name, value) in raw.element_attributes() {
    element.set_attr(name, value);
  }

  Ok(Projected {
    element,
    component_attributes: raw
      .component_attributes()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect(),
  })
}
