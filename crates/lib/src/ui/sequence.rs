use tracing::{debug, trace};

use crate::consts::STRICT_ORDER;
use crate::xml::Element;

use super::types::{Dialog, DialogAction, DialogRef, Event, condition_text};

/// Actions accumulated for one `(dialog, control)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PublishEntry {
  dialog: String,
  control: String,
  actions: Vec<DialogAction>,
}

/// Accumulates published actions per `(dialog, control)` pair.
///
/// Pairs keep their first-use order; repeated [`UiSequence::on`] calls for a
/// pair append to its action list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSequence {
  strict: bool,
  entries: Vec<PublishEntry>,
  custom_dialogs: Vec<Dialog>,
}

impl UiSequence {
  pub fn new() -> Self {
    Self::default()
  }

  /// A sequence that stamps [`STRICT_ORDER`] on every action added without
  /// an explicit order, so it wins over the stock UI's own actions.
  pub fn strict() -> Self {
    Self {
      strict: true,
      ..Self::default()
    }
  }

  pub fn is_strict(&self) -> bool {
    self.strict
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty() && self.custom_dialogs.is_empty()
  }

  pub fn on(
    &mut self,
    dialog: impl Into<DialogRef>,
    control: &str,
    actions: impl IntoIterator<Item = DialogAction>,
  ) -> &mut Self {
    let dialog = dialog.into();
    let dialog_id = dialog.id().to_string();
    if let DialogRef::Custom(custom) = dialog {
      self.register(custom);
    }

    let mut added = Vec::new();
    for mut action in actions {
      if let Some(target) = action.target.take() {
        self.register(*target);
      }
      if self.strict && action.order.is_none() {
        action.order = Some(STRICT_ORDER);
      }
      added.push(action);
    }

    trace!(dialog = %dialog_id, control, count = added.len(), "publishing actions");

    match self
      .entries
      .iter_mut()
      .find(|e| e.dialog == dialog_id && e.control == control)
    {
      Some(entry) => entry.actions.extend(added),
      None => self.entries.push(PublishEntry {
        dialog: dialog_id,
        control: control.to_string(),
        actions: added,
      }),
    }
    self
  }

  /// Register a custom dialog definition. Registering an id twice keeps the
  /// first definition.
  pub fn register(&mut self, dialog: Dialog) -> &mut Self {
    if self.custom_dialogs.iter().any(|d| d.id == dialog.id) {
      trace!(dialog = %dialog.id, "custom dialog already registered");
    } else {
      debug!(dialog = %dialog.id, "registering custom dialog");
      self.custom_dialogs.push(dialog);
    }
    self
  }

  /// Drop every action published for a pair. Returns whether the pair existed.
  pub fn clear(&mut self, dialog: &str, control: &str) -> bool {
    let before = self.entries.len();
    self.entries.retain(|e| !(e.dialog == dialog && e.control == control));
    before != self.entries.len()
  }

  pub fn custom_dialogs(&self) -> &[Dialog] {
    &self.custom_dialogs
  }

  pub fn compile(&self) -> CompiledSequence {
    let entries = self
      .entries
      .iter()
      .filter(|e| !e.actions.is_empty())
      .map(|entry| {
        let multiple = entry.actions.len() > 1;
        let mut actions: Vec<ResolvedAction> = entry
          .actions
          .iter()
          .enumerate()
          .map(|(index, action)| ResolvedAction {
            event: action.event,
            property: action.property.clone().filter(|p| !p.is_empty()),
            value: action.value.clone(),
            condition: condition_text(&action.condition).to_string(),
            order: action.order.or(multiple.then_some(index as u32 + 1)),
          })
          .collect();
        actions.sort_by_key(|a| a.order.unwrap_or(0));

        CompiledEntry {
          dialog: entry.dialog.clone(),
          control: entry.control.clone(),
          actions,
        }
      })
      .collect();

    CompiledSequence {
      entries,
      custom_dialogs: self.custom_dialogs.clone(),
    }
  }
}

/// An action with its order resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
  pub event: Option<Event>,
  pub property: Option<String>,
  pub value: String,
  /// Never empty.
  pub condition: String,
  pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEntry {
  pub dialog: String,
  pub control: String,
  /// Sorted by resolved order; ties keep append order.
  pub actions: Vec<ResolvedAction>,
}

impl CompiledEntry {
  pub fn publish_elements(&self) -> impl Iterator<Item = Element> + '_ {
    self.actions.iter().map(|action| {
      let mut publish = Element::new("Publish")
        .with_attr("Dialog", self.dialog.as_str())
        .with_attr("Control", self.control.as_str());
      if let Some(event) = action.event {
        publish.set_attr("Event", event.as_str());
      }
      if !action.value.is_empty() {
        publish.set_attr("Value", action.value.as_str());
      }
      if let Some(property) = &action.property {
        publish.set_attr("Property", property.as_str());
      }
      if let Some(order) = action.order {
        publish.set_attr("Order", order.to_string());
      }
      publish.push_text(action.condition.as_str());
      publish
    })
  }
}

/// The navigation description produced from a [`UiSequence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledSequence {
  pub entries: Vec<CompiledEntry>,
  /// Each referenced custom dialog once, in first-reference order.
  pub custom_dialogs: Vec<Dialog>,
}

impl CompiledSequence {
  pub fn entry(&self, dialog: &str, control: &str) -> Option<&CompiledEntry> {
    self.entries.iter().find(|e| e.dialog == dialog && e.control == control)
  }

  pub fn publish_elements(&self) -> Vec<Element> {
    self.entries.iter().flat_map(CompiledEntry::publish_elements).collect()
  }
}
