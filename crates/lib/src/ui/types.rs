use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::ALWAYS_TRUE_CONDITION;
use crate::id::IdAllocator;
use crate::projection::{FieldRule, Projectable, ProjectionError, RawAttributes, Value, project};
use crate::xml::Element;

/// Control event fired by a published action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
  NewDialog,
  SpawnDialog,
  EndDialog,
  DoAction,
  SetTargetPath,
}

impl Event {
  pub fn as_str(self) -> &'static str {
    match self {
      Event::NewDialog => "NewDialog",
      Event::SpawnDialog => "SpawnDialog",
      Event::EndDialog => "EndDialog",
      Event::DoAction => "DoAction",
      Event::SetTargetPath => "SetTargetPath",
    }
  }

  /// Events that move the user to another dialog.
  pub fn navigates(self) -> bool {
    matches!(self, Event::NewDialog | Event::SpawnDialog)
  }
}

impl fmt::Display for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn always_true() -> String {
  ALWAYS_TRUE_CONDITION.to_string()
}

/// One action published for a `(dialog, control)` pair.
///
/// Set-property actions carry a `property` and no event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogAction {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event: Option<Event>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub property: Option<String>,
  #[serde(default)]
  pub value: String,
  #[serde(default = "always_true")]
  pub condition: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub order: Option<u32>,
  /// Custom dialog this action navigates to, registered with the sequence.
  #[serde(skip)]
  pub(crate) target: Option<Box<Dialog>>,
}

impl DialogAction {
  fn event(event: Event, value: impl Into<String>) -> Self {
    Self {
      event: Some(event),
      property: None,
      value: value.into(),
      condition: always_true(),
      order: None,
      target: None,
    }
  }

  fn navigate(event: Event, dialog: impl Into<DialogRef>) -> Self {
    let dialog = dialog.into();
    let mut action = Self::event(event, dialog.id());
    if let DialogRef::Custom(custom) = dialog {
      action.target = Some(Box::new(custom));
    }
    action
  }

  pub fn show_dialog(dialog: impl Into<DialogRef>) -> Self {
    Self::navigate(Event::NewDialog, dialog)
  }

  pub fn spawn_dialog(dialog: impl Into<DialogRef>) -> Self {
    Self::navigate(Event::SpawnDialog, dialog)
  }

  /// End the current dialog with the given return value (`Return`, `Exit`, ...).
  pub fn close_dialog(value: impl Into<String>) -> Self {
    Self::event(Event::EndDialog, value)
  }

  /// Run a registered custom action.
  pub fn execute(action: impl Into<String>) -> Self {
    Self::event(Event::DoAction, action)
  }

  pub fn set_target_path() -> Self {
    Self::event(Event::SetTargetPath, "[WIXUI_INSTALLDIR]")
  }

  pub fn set_property(property: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      event: None,
      property: Some(property.into()),
      value: value.into(),
      condition: always_true(),
      order: None,
      target: None,
    }
  }

  pub fn when(mut self, condition: impl Into<String>) -> Self {
    self.condition = condition.into();
    self
  }

  pub fn with_order(mut self, order: u32) -> Self {
    self.order = Some(order);
    self
  }

  /// Dialog this action navigates to, if any.
  pub fn destination(&self) -> Option<&str> {
    match self.event {
      Some(event) if event.navigates() && !self.value.is_empty() => Some(&self.value),
      _ => None,
    }
  }
}

/// A dialog addressed either by the name of a stock dialog or by definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogRef {
  Named(String),
  Custom(Dialog),
}

impl DialogRef {
  pub fn id(&self) -> &str {
    match self {
      DialogRef::Named(name) => name,
      DialogRef::Custom(dialog) => &dialog.id,
    }
  }
}

impl From<&str> for DialogRef {
  fn from(value: &str) -> Self {
    DialogRef::Named(value.to_string())
  }
}

impl From<String> for DialogRef {
  fn from(value: String) -> Self {
    DialogRef::Named(value)
  }
}

impl From<Dialog> for DialogRef {
  fn from(value: Dialog) -> Self {
    DialogRef::Custom(value)
  }
}

impl From<&Dialog> for DialogRef {
  fn from(value: &Dialog) -> Self {
    DialogRef::Custom(value.clone())
  }
}

/// A custom dialog definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
  pub id: String,
  #[serde(default)]
  pub width: u32,
  #[serde(default)]
  pub height: u32,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub controls: Vec<Control>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl Dialog {
  pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
    Self {
      id: id.into(),
      width,
      height,
      ..Default::default()
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_control(mut self, control: Control) -> Self {
    self.controls.push(control);
    self
  }

  /// Project the dialog and its controls.
  pub fn to_element(&self, ids: &mut IdAllocator) -> Result<Element, ProjectionError> {
    let mut element = project(self, ids)?.element;
    for control in &self.controls {
      element.push(control.to_element(ids)?);
    }
    Ok(element)
  }
}

impl Projectable for Dialog {
  const ELEMENT: &'static str = "Dialog";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Dialog>] = &[
      FieldRule::required("Id", |d: &Dialog| Some(Value::Str(d.id.clone()))),
      FieldRule::optional("Width", |d: &Dialog| Some(Value::Int(d.width.into()))),
      FieldRule::optional("Height", |d: &Dialog| Some(Value::Int(d.height.into()))),
      FieldRule::optional("Title", |d: &Dialog| Some(Value::Str(d.title.clone()))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

/// What a control condition does when its expression holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionAction {
  Default,
  Disable,
  Enable,
  Hide,
  Show,
}

impl ConditionAction {
  pub fn as_str(self) -> &'static str {
    match self {
      ConditionAction::Default => "default",
      ConditionAction::Disable => "disable",
      ConditionAction::Enable => "enable",
      ConditionAction::Hide => "hide",
      ConditionAction::Show => "show",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCondition {
  pub action: ConditionAction,
  pub expression: String,
}

/// A control placed on a custom dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
  pub id: String,
  #[serde(rename = "type")]
  pub control_type: String,
  #[serde(default)]
  pub x: u32,
  #[serde(default)]
  pub y: u32,
  #[serde(default)]
  pub width: u32,
  #[serde(default)]
  pub height: u32,
  #[serde(default)]
  pub text: Option<String>,
  #[serde(default)]
  pub property: Option<String>,
  #[serde(default)]
  pub tooltip: Option<String>,
  #[serde(default)]
  pub hidden: bool,
  #[serde(default)]
  pub disabled: bool,
  /// Actions published directly on the control, ordered by position.
  #[serde(default)]
  pub actions: Vec<DialogAction>,
  #[serde(default)]
  pub conditions: Vec<ControlCondition>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl Control {
  pub fn new(id: impl Into<String>, control_type: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      control_type: control_type.into(),
      ..Default::default()
    }
  }

  pub fn at(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
    self.x = x;
    self.y = y;
    self.width = width;
    self.height = height;
    self
  }

  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.text = Some(text.into());
    self
  }

  pub fn with_action(mut self, action: DialogAction) -> Self {
    self.actions.push(action);
    self
  }

  pub fn to_element(&self, ids: &mut IdAllocator) -> Result<Element, ProjectionError> {
    let mut element = project(self, ids)?.element;

    for (index, action) in self.actions.iter().enumerate() {
      let mut publish = Element::new("Publish");
      if let Some(event) = action.event {
        publish.set_attr("Event", event.as_str());
      }
      if let Some(property) = action.property.as_deref().filter(|p| !p.is_empty()) {
        publish.set_attr("Property", property);
      }
      publish.set_attr("Value", action.value.as_str());
      publish.set_attr("Order", (index + 1).to_string());
      publish.push_text(condition_text(&action.condition));
      element.push(publish);
    }

    for condition in &self.conditions {
      let mut child = Element::new("Condition").with_attr("Action", condition.action.as_str());
      child.push_text(condition.expression.as_str());
      element.push(child);
    }

    Ok(element)
  }
}

impl Projectable for Control {
  const ELEMENT: &'static str = "Control";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Control>] = &[
      FieldRule::required("Id", |c: &Control| Some(Value::Str(c.id.clone()))),
      FieldRule::optional("Width", |c: &Control| Some(Value::Int(c.width.into()))),
      FieldRule::optional("Height", |c: &Control| Some(Value::Int(c.height.into()))),
      FieldRule::optional("X", |c: &Control| Some(Value::Int(c.x.into()))),
      FieldRule::optional("Y", |c: &Control| Some(Value::Int(c.y.into()))),
      FieldRule::required("Type", |c: &Control| Some(Value::Str(c.control_type.clone()))),
      FieldRule::optional("Property", |c: &Control| c.property.clone().map(Value::Str)),
      FieldRule::optional("Hidden", |c: &Control| c.hidden.then_some(Value::Bool(true))),
      FieldRule::optional("Disabled", |c: &Control| c.disabled.then_some(Value::Bool(true))),
      FieldRule::optional("ToolTip", |c: &Control| c.tooltip.clone().map(Value::Str)),
      FieldRule::optional("Text", |c: &Control| {
        c.text.as_deref().filter(|t| !t.is_empty()).map(|t| {
          let mut text = Element::new("Text");
          text.push_text(t);
          Value::Children(vec![text])
        })
      })
      .as_children(),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

/// A font registered under a text style id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
  pub id: String,
  pub face_name: String,
  pub size: u32,
  #[serde(default)]
  pub bold: bool,
  #[serde(default)]
  pub italic: bool,
  #[serde(default)]
  pub strike: bool,
  #[serde(default)]
  pub underline: bool,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl TextStyle {
  pub fn new(id: impl Into<String>, face_name: impl Into<String>, size: u32) -> Self {
    Self {
      id: id.into(),
      face_name: face_name.into(),
      size,
      bold: false,
      italic: false,
      strike: false,
      underline: false,
      attributes: RawAttributes::new(),
    }
  }

  pub fn bold(mut self) -> Self {
    self.bold = true;
    self
  }
}

impl Projectable for TextStyle {
  const ELEMENT: &'static str = "TextStyle";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<TextStyle>] = &[
      FieldRule::required("Id", |s: &TextStyle| Some(Value::Str(s.id.clone()))),
      FieldRule::required("FaceName", |s: &TextStyle| Some(Value::Str(s.face_name.clone()))),
      FieldRule::required("Size", |s: &TextStyle| Some(Value::Int(s.size.into()))),
      FieldRule::optional("Bold", |s: &TextStyle| Some(Value::Bool(s.bold))),
      FieldRule::optional("Italic", |s: &TextStyle| Some(Value::Bool(s.italic))),
      FieldRule::optional("Strike", |s: &TextStyle| Some(Value::Bool(s.strike))),
      FieldRule::optional("Underline", |s: &TextStyle| Some(Value::Bool(s.underline))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

/// Empty conditions mean "always".
pub(crate) fn condition_text(condition: &str) -> &str {
  let trimmed = condition.trim();
  if trimmed.is_empty() { ALWAYS_TRUE_CONDITION } else { trimmed }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn show_dialog_to_custom_dialog_carries_definition() {
    let dialog = Dialog::new("LicenceDlg", 370, 270);
    let action = DialogAction::show_dialog(&dialog);

    assert_eq!(action.event, Some(Event::NewDialog));
    assert_eq!(action.value, "LicenceDlg");
    assert_eq!(action.target.as_deref(), Some(&dialog));
    assert_eq!(action.destination(), Some("LicenceDlg"));
  }

  #[test]
  fn set_property_has_no_event() {
    let action = DialogAction::set_property("_BrowseProperty", "[WIXUI_INSTALLDIR]");

    assert_eq!(action.event, None);
    assert_eq!(action.property.as_deref(), Some("_BrowseProperty"));
    assert_eq!(action.destination(), None);
  }

  #[test]
  fn control_projects_geometry_then_flags() {
    let mut ids = IdAllocator::new();
    let mut control = Control::new("Next", "PushButton").at(236, 243, 56, 17).with_text("&Next");
    control.disabled = true;

    let element = control.to_element(&mut ids).unwrap();
    let names: Vec<_> = element.attributes.iter().map(|(k, _)| k.as_str()).collect();

    assert_eq!(names, vec!["Id", "Width", "Height", "X", "Y", "Type", "Disabled"]);
    assert_eq!(element.attr("Disabled"), Some("yes"));
    assert_eq!(element.child("Text").map(|t| t.text()), Some("&Next".to_string()));
  }

  #[test]
  fn control_publishes_own_actions_in_position_order() {
    let mut ids = IdAllocator::new();
    let control = Control::new("Back", "PushButton")
      .with_action(DialogAction::show_dialog("WelcomeDlg"))
      .with_action(DialogAction::close_dialog("Return").when(""));

    let element = control.to_element(&mut ids).unwrap();
    let publish: Vec<_> = element.children_named("Publish").collect();

    assert_eq!(publish.len(), 2);
    assert_eq!(publish[0].attr("Order"), Some("1"));
    assert_eq!(publish[1].attr("Event"), Some("EndDialog"));
    assert_eq!(publish[1].text(), "1");
  }

  #[test]
  fn dialog_without_id_fails_to_project() {
    let mut ids = IdAllocator::new();
    let err = Dialog::new("", 10, 10).to_element(&mut ids).unwrap_err();

    assert_eq!(err, ProjectionError::MissingRequired {
      field: "Id",
      entity: "Dialog",
    });
  }

  #[test]
  fn text_style_always_emits_flags() {
    let mut ids = IdAllocator::new();
    let element = project(&TextStyle::new("WixUI_Font_Title", "Tahoma", 9).bold(), &mut ids)
      .unwrap()
      .element;

    assert_eq!(element.attr("Bold"), Some("yes"));
    assert_eq!(element.attr("Italic"), Some("no"));
  }
}
