//! Self-describing items: entities that place their own subtree.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::id::{EntityKind, IdSlot};
use crate::projection::{
  FieldRule, Identity, ProcessingContext, Projectable, ProjectionError, RawAttributes, SelfDescribing, Value,
};
use crate::xml::Element;

use super::normalize_wix_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistryHive {
  #[serde(rename = "HKLM")]
  #[default]
  LocalMachine,
  #[serde(rename = "HKCU")]
  CurrentUser,
  #[serde(rename = "HKCR")]
  ClassesRoot,
  #[serde(rename = "HKU")]
  Users,
  /// Machine or user, depending on the install scope.
  #[serde(rename = "HKMU")]
  MachineOrUser,
}

impl RegistryHive {
  pub fn token(self) -> &'static str {
    match self {
      RegistryHive::LocalMachine => "HKLM",
      RegistryHive::CurrentUser => "HKCU",
      RegistryHive::ClassesRoot => "HKCR",
      RegistryHive::Users => "HKU",
      RegistryHive::MachineOrUser => "HKMU",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistryValueType {
  #[default]
  String,
  Integer,
  Binary,
  Expandable,
  MultiString,
}

impl RegistryValueType {
  pub fn token(self) -> &'static str {
    match self {
      RegistryValueType::String => "string",
      RegistryValueType::Integer => "integer",
      RegistryValueType::Binary => "binary",
      RegistryValueType::Expandable => "expandable",
      RegistryValueType::MultiString => "multiString",
    }
  }
}

/// A registry value written by the installer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryValue {
  pub id: IdSlot,
  pub root: RegistryHive,
  pub key: String,
  /// Value name; unset writes the key's default value.
  pub name: Option<String>,
  pub value: String,
  pub value_type: RegistryValueType,
  pub win64: Option<bool>,
  pub features: Vec<String>,
  pub attributes: RawAttributes,
}

impl RegistryValue {
  pub fn new(root: RegistryHive, key: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      root,
      key: key.into(),
      name: Some(name.into()),
      value: value.into(),
      ..Default::default()
    }
  }

  fn id_source(&self) -> &str {
    match &self.name {
      Some(name) if !name.is_empty() => name,
      _ => &self.key,
    }
  }
}

impl Projectable for RegistryValue {
  const ELEMENT: &'static str = "RegistryValue";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<RegistryValue>] = &[
      FieldRule::required("Root", |r: &RegistryValue| Some(Value::Token(r.root.token()))),
      FieldRule::required("Key", |r: &RegistryValue| Some(Value::Str(r.key.clone()))),
      FieldRule::optional("Name", |r: &RegistryValue| r.name.clone().map(Value::Str)),
      FieldRule::required("Type", |r: &RegistryValue| Some(Value::Token(r.value_type.token()))),
      FieldRule::optional("Value", |r: &RegistryValue| {
        (r.value_type != RegistryValueType::MultiString).then(|| Value::Str(normalize_wix_string(&r.value)))
      }),
      FieldRule::optional("MultiStringValue", |r: &RegistryValue| {
        (r.value_type == RegistryValueType::MultiString).then(|| {
          Value::Children(
            r.value
              .lines()
              .map(|line| {
                let mut child = Element::new("MultiStringValue");
                child.push_text(line);
                child
              })
              .collect(),
          )
        })
      })
      .as_children(),
      FieldRule::required("KeyPath", |_: &RegistryValue| Some(Value::Bool(true))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }

  fn identity(&self) -> Option<Identity<'_>> {
    Some(Identity {
      kind: EntityKind::RegistryValue,
      slot: &self.id,
      source: Cow::Borrowed(self.id_source()),
    })
  }
}

impl SelfDescribing for RegistryValue {
  fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<(), ProjectionError> {
    let Some(element) = ctx.take_current() else {
      return Ok(());
    };
    let id = element.attr("Id").unwrap_or(self.key.as_str()).to_string();

    if let Some(win64) = self.win64 {
      ctx.add_component_attribute("Win64", if win64 { "yes" } else { "no" });
    }
    let component = ctx.create_component(&id, &self.features);
    component.push(element);
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentAction {
  #[default]
  Set,
  Create,
  Remove,
}

impl EnvironmentAction {
  pub fn token(self) -> &'static str {
    match self {
      EnvironmentAction::Set => "set",
      EnvironmentAction::Create => "create",
      EnvironmentAction::Remove => "remove",
    }
  }
}

/// Where a value goes in a list-style variable such as `PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPart {
  All,
  First,
  Last,
}

impl EnvironmentPart {
  pub fn token(self) -> &'static str {
    match self {
      EnvironmentPart::All => "all",
      EnvironmentPart::First => "first",
      EnvironmentPart::Last => "last",
    }
  }
}

/// An environment variable set, created or removed by the installer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentVariable {
  pub id: IdSlot,
  pub name: String,
  pub value: Option<String>,
  pub system: Option<bool>,
  pub permanent: Option<bool>,
  pub action: EnvironmentAction,
  pub part: Option<EnvironmentPart>,
  /// Install condition for the owning component.
  pub condition: Option<String>,
  pub features: Vec<String>,
  pub attributes: RawAttributes,
}

impl EnvironmentVariable {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: Some(value.into()),
      ..Default::default()
    }
  }
}

impl Projectable for EnvironmentVariable {
  const ELEMENT: &'static str = "Environment";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<EnvironmentVariable>] = &[
      FieldRule::required("Name", |e: &EnvironmentVariable| Some(Value::Str(e.name.clone()))),
      FieldRule::optional("System", |e: &EnvironmentVariable| e.system.map(Value::Bool)),
      FieldRule::optional("Permanent", |e: &EnvironmentVariable| e.permanent.map(Value::Bool)),
      FieldRule::optional("Value", |e: &EnvironmentVariable| {
        e.value.as_deref().map(|v| Value::Str(normalize_wix_string(v)))
      }),
      FieldRule::required("Action", |e: &EnvironmentVariable| Some(Value::Token(e.action.token()))),
      FieldRule::optional("Part", |e: &EnvironmentVariable| e.part.map(|p| Value::Token(p.token()))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }

  fn identity(&self) -> Option<Identity<'_>> {
    Some(Identity {
      kind: EntityKind::EnvironmentVariable,
      slot: &self.id,
      source: Cow::Borrowed(&self.name),
    })
  }
}

impl SelfDescribing for EnvironmentVariable {
  fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<(), ProjectionError> {
    let Some(element) = ctx.take_current() else {
      return Ok(());
    };
    let id = element.attr("Id").unwrap_or(self.name.as_str()).to_string();

    let component = ctx.create_component(&id, &self.features);
    component.push(element);
    if let Some(condition) = self.condition.as_deref().filter(|c| !c.is_empty()) {
      let mut element = Element::new("Condition");
      element.push_cdata(condition);
      component.push(element);
    }
    Ok(())
  }
}

/// Closes a running application before files are replaced.
///
/// Written with the util extension namespace directly under the enclosing
/// parent element. The id is never generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseApplication {
  pub id: Option<String>,
  pub target: String,
  pub property: Option<String>,
  pub description: Option<String>,
  pub terminate_process: Option<i64>,
  pub timeout: i64,
  pub sequence: i64,
  pub close_message: bool,
  pub elevated_close_message: bool,
  pub elevated_end_session_message: bool,
  pub end_session_message: bool,
  pub prompt_to_continue: bool,
  pub reboot_prompt: bool,
  pub attributes: RawAttributes,
}

impl CloseApplication {
  pub fn new(target: impl Into<String>) -> Self {
    Self {
      id: None,
      target: target.into(),
      property: None,
      description: None,
      terminate_process: None,
      timeout: 5,
      sequence: 1,
      close_message: false,
      elevated_close_message: false,
      elevated_end_session_message: false,
      end_session_message: false,
      prompt_to_continue: false,
      reboot_prompt: true,
      attributes: RawAttributes::new(),
    }
  }
}

impl Projectable for CloseApplication {
  const ELEMENT: &'static str = "util:CloseApplication";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<CloseApplication>] = &[
      FieldRule::optional("Id", |c: &CloseApplication| c.id.clone().map(Value::Str)),
      FieldRule::optional("Property", |c: &CloseApplication| c.property.clone().map(Value::Str)),
      FieldRule::required("Target", |c: &CloseApplication| Some(Value::Str(c.target.clone()))),
      FieldRule::optional("Description", |c: &CloseApplication| c.description.clone().map(Value::Str)),
      FieldRule::optional("TerminateProcess", |c: &CloseApplication| c.terminate_process.map(Value::Int)),
      FieldRule::required("Timeout", |c: &CloseApplication| Some(Value::Int(c.timeout))),
      FieldRule::required("Sequence", |c: &CloseApplication| Some(Value::Int(c.sequence))),
      FieldRule::required("CloseMessage", |c: &CloseApplication| Some(Value::Bool(c.close_message))),
      FieldRule::required("ElevatedCloseMessage", |c: &CloseApplication| {
        Some(Value::Bool(c.elevated_close_message))
      }),
      FieldRule::required("ElevatedEndSessionMessage", |c: &CloseApplication| {
        Some(Value::Bool(c.elevated_end_session_message))
      }),
      FieldRule::required("EndSessionMessage", |c: &CloseApplication| {
        Some(Value::Bool(c.end_session_message))
      }),
      FieldRule::required("PromptToContinue", |c: &CloseApplication| {
        Some(Value::Bool(c.prompt_to_continue))
      }),
      FieldRule::required("RebootPrompt", |c: &CloseApplication| Some(Value::Bool(c.reboot_prompt))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

impl SelfDescribing for CloseApplication {
  fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<(), ProjectionError> {
    ctx.include_util_extension();
    if let Some(element) = ctx.take_current() {
      ctx.insert_into_parent(element);
    }
    Ok(())
  }
}

/// Items that describe their own output subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericItem {
  RegistryValue(RegistryValue),
  EnvironmentVariable(EnvironmentVariable),
  CloseApplication(CloseApplication),
}

impl GenericItem {
  pub fn type_name(&self) -> &'static str {
    match self {
      GenericItem::RegistryValue(_) => "RegistryValue",
      GenericItem::EnvironmentVariable(_) => "EnvironmentVariable",
      GenericItem::CloseApplication(_) => "CloseApplication",
    }
  }

  /// Project the item and run its processing hook once.
  pub fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<(), ProjectionError> {
    match self {
      GenericItem::RegistryValue(item) => ctx.process_item(item),
      GenericItem::EnvironmentVariable(item) => ctx.process_item(item),
      GenericItem::CloseApplication(item) => ctx.process_item(item),
    }
  }
}

impl From<RegistryValue> for GenericItem {
  fn from(value: RegistryValue) -> Self {
    GenericItem::RegistryValue(value)
  }
}

impl From<EnvironmentVariable> for GenericItem {
  fn from(value: EnvironmentVariable) -> Self {
    GenericItem::EnvironmentVariable(value)
  }
}

impl From<CloseApplication> for GenericItem {
  fn from(value: CloseApplication) -> Self {
    GenericItem::CloseApplication(value)
  }
}
