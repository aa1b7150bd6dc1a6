//! Installable entities and their projection tables.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::id::{EntityKind, IdSlot};
use crate::projection::{FieldRule, Identity, Projectable, RawAttributes, Value};
use crate::xml::{Element, Node};

use super::normalize_wix_string;

/// A single file installed into a directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct File {
  pub id: IdSlot,
  /// Path of the file on the build machine.
  pub source: String,
  /// Installed name when it differs from the source file name.
  pub name: Option<String>,
  pub features: Vec<String>,
  pub vital: Option<bool>,
  pub read_only: Option<bool>,
  pub hidden: Option<bool>,
  pub compressed: Option<bool>,
  pub attributes: RawAttributes,
}

impl File {
  pub fn new(source: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      ..Default::default()
    }
  }

  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id.set(id);
    self
  }

  pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
    self.features.push(feature.into());
    self
  }

  pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.insert(name, value);
    self
  }
}

impl Projectable for File {
  const ELEMENT: &'static str = "File";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<File>] = &[
      FieldRule::required("Source", |f: &File| Some(Value::Str(f.source.clone()))),
      FieldRule::optional("Name", |f: &File| f.name.clone().map(Value::Str)),
      FieldRule::required("KeyPath", |_: &File| Some(Value::Bool(true))),
      FieldRule::optional("Vital", |f: &File| f.vital.map(Value::Bool)),
      FieldRule::optional("ReadOnly", |f: &File| f.read_only.map(Value::Bool)),
      FieldRule::optional("Hidden", |f: &File| f.hidden.map(Value::Bool)),
      FieldRule::optional("Compressed", |f: &File| f.compressed.map(Value::Bool)),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }

  fn identity(&self) -> Option<Identity<'_>> {
    Some(Identity {
      kind: EntityKind::File,
      slot: &self.id,
      source: Cow::Borrowed(&self.source),
    })
  }
}

/// A set of files matched by a wildcard on the build machine.
///
/// Matching happens outside the engine; `files` holds the matched entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileCollection {
  pub pattern: String,
  pub files: Vec<File>,
  pub features: Vec<String>,
}

impl FileCollection {
  pub fn new(pattern: impl Into<String>, files: Vec<File>) -> Self {
    Self {
      pattern: pattern.into(),
      files,
      features: Vec::new(),
    }
  }
}

/// A shortcut owned by a directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shortcut {
  pub id: IdSlot,
  /// Display name without the `.lnk` extension.
  pub name: String,
  /// What the shortcut points at, e.g. `[INSTALLDIR]app.exe`.
  pub target: String,
  pub arguments: Option<String>,
  pub working_directory: Option<String>,
  pub description: Option<String>,
  pub icon: Option<String>,
  pub features: Vec<String>,
  pub attributes: RawAttributes,
}

impl Shortcut {
  pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      target: target.into(),
      ..Default::default()
    }
  }

  /// Working directory implied by the target, e.g. `INSTALLDIR` for `[INSTALLDIR]app.exe`.
  pub fn implied_working_directory(&self) -> Option<&str> {
    let target = self.target.strip_prefix('[')?;
    let end = target.find(']')?;
    Some(&target[..end])
  }
}

impl Projectable for Shortcut {
  const ELEMENT: &'static str = "Shortcut";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Shortcut>] = &[
      FieldRule::required("Name", |s: &Shortcut| {
        (!s.name.is_empty()).then(|| Value::Str(format!("{}.lnk", s.name)))
      }),
      FieldRule::required("Target", |s: &Shortcut| Some(Value::Str(normalize_wix_string(&s.target)))),
      FieldRule::optional("WorkingDirectory", |s: &Shortcut| s.working_directory.clone().map(Value::Str)),
      FieldRule::optional("Arguments", |s: &Shortcut| s.arguments.clone().map(Value::Str)),
      FieldRule::optional("Description", |s: &Shortcut| s.description.clone().map(Value::Str)),
      FieldRule::optional("Icon", |s: &Shortcut| s.icon.clone().map(Value::Str)),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }

  fn identity(&self) -> Option<Identity<'_>> {
    Some(Identity {
      kind: EntityKind::Shortcut,
      slot: &self.id,
      source: Cow::Borrowed(&self.name),
    })
  }
}

/// Default selection of a feature in a typical install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypicalDefault {
  Install,
  Advertise,
}

impl TypicalDefault {
  pub fn token(self) -> &'static str {
    match self {
      TypicalDefault::Install => "install",
      TypicalDefault::Advertise => "advertise",
    }
  }
}

/// Install level override applied when `expression` is true at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCondition {
  pub level: i64,
  pub expression: String,
}

/// A selectable unit of installation.
///
/// Selection state is computed by the installer at run time; the fields here
/// are only written out.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
  pub id: IdSlot,
  pub name: String,
  pub description: Option<String>,
  pub level: i64,
  /// Whether the user may deselect the feature.
  pub allow_change: bool,
  pub typical_default: Option<TypicalDefault>,
  pub configurable_dir: Option<String>,
  pub condition: Option<FeatureCondition>,
  pub children: Vec<Feature>,
  pub attributes: RawAttributes,
}

impl Feature {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id: IdSlot::new(),
      name: name.into(),
      description: None,
      level: 1,
      allow_change: true,
      typical_default: None,
      configurable_dir: None,
      condition: None,
      children: Vec::new(),
      attributes: RawAttributes::new(),
    }
  }

  /// This feature and all nested ones, parents first.
  pub fn walk(&self) -> Vec<&Feature> {
    let mut all = vec![self];
    for child in &self.children {
      all.extend(child.walk());
    }
    all
  }
}

impl Projectable for Feature {
  const ELEMENT: &'static str = "Feature";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Feature>] = &[
      FieldRule::required("Title", |f: &Feature| Some(Value::Str(f.name.clone()))),
      FieldRule::required("Absent", |f: &Feature| {
        Some(Value::Token(if f.allow_change { "allow" } else { "disallow" }))
      }),
      FieldRule::required("Level", |f: &Feature| Some(Value::Int(f.level))),
      FieldRule::optional("Description", |f: &Feature| f.description.clone().map(Value::Str)),
      FieldRule::optional("ConfigurableDirectory", |f: &Feature| f.configurable_dir.clone().map(Value::Str)),
      FieldRule::optional("TypicalDefault", |f: &Feature| f.typical_default.map(|t| Value::Token(t.token()))),
      FieldRule::optional("Condition", |f: &Feature| {
        f.condition.as_ref().map(|c| {
          let mut condition = Element::new("Condition").with_attr("Level", c.level.to_string());
          condition.children.push(Node::CData(c.expression.clone()));
          Value::Children(vec![condition])
        })
      })
      .as_children(),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }

  fn identity(&self) -> Option<Identity<'_>> {
    Some(Identity {
      kind: EntityKind::Feature,
      slot: &self.id,
      source: Cow::Borrowed(&self.name),
    })
  }
}

/// An installer property. The property name is its id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
  pub name: String,
  pub value: Option<String>,
  pub secure: Option<bool>,
  pub hidden: Option<bool>,
  pub admin: Option<bool>,
  pub attributes: RawAttributes,
}

impl Property {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: Some(value.into()),
      ..Default::default()
    }
  }
}

impl Projectable for Property {
  const ELEMENT: &'static str = "Property";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Property>] = &[
      FieldRule::required("Id", |p: &Property| Some(Value::Str(p.name.clone()))),
      FieldRule::optional("Value", |p: &Property| p.value.clone().map(Value::Str)),
      FieldRule::optional("Secure", |p: &Property| p.secure.map(Value::Bool)),
      FieldRule::optional("Hidden", |p: &Property| p.hidden.map(Value::Bool)),
      FieldRule::optional("Admin", |p: &Property| p.admin.map(Value::Bool)),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
  None,
  Low,
  Medium,
  High,
  Mszip,
}

impl CompressionLevel {
  pub fn token(self) -> &'static str {
    match self {
      CompressionLevel::None => "none",
      CompressionLevel::Low => "low",
      CompressionLevel::Medium => "medium",
      CompressionLevel::High => "high",
      CompressionLevel::Mszip => "mszip",
    }
  }
}

/// Installation media (cabinet) description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
  pub id: i64,
  pub cabinet: Option<String>,
  pub embed_cab: Option<bool>,
  pub compression_level: Option<CompressionLevel>,
  pub disk_prompt: Option<String>,
  pub volume_label: Option<String>,
  pub attributes: RawAttributes,
}

impl Default for Media {
  fn default() -> Self {
    Self {
      id: 1,
      cabinet: Some("Cab1.cab".to_string()),
      embed_cab: Some(true),
      compression_level: None,
      disk_prompt: None,
      volume_label: None,
      attributes: RawAttributes::new(),
    }
  }
}

impl Projectable for Media {
  const ELEMENT: &'static str = "Media";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<Media>] = &[
      FieldRule::required("Id", |m: &Media| Some(Value::Int(m.id))),
      FieldRule::optional("Cabinet", |m: &Media| m.cabinet.clone().map(Value::Str)),
      FieldRule::optional("EmbedCab", |m: &Media| m.embed_cab.map(Value::Bool)),
      FieldRule::optional("CompressionLevel", |m: &Media| {
        m.compression_level.map(|c| Value::Token(c.token()))
      }),
      FieldRule::optional("DiskPrompt", |m: &Media| m.disk_prompt.clone().map(Value::Str)),
      FieldRule::optional("VolumeLabel", |m: &Media| m.volume_label.clone().map(Value::Str)),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}

/// When the previous version is removed during a major upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeSchedule {
  AfterInstallValidate,
  AfterInstallInitialize,
  AfterInstallExecute,
  AfterInstallExecuteAgain,
  AfterInstallFinalize,
}

impl UpgradeSchedule {
  pub fn token(self) -> &'static str {
    match self {
      UpgradeSchedule::AfterInstallValidate => "afterInstallValidate",
      UpgradeSchedule::AfterInstallInitialize => "afterInstallInitialize",
      UpgradeSchedule::AfterInstallExecute => "afterInstallExecute",
      UpgradeSchedule::AfterInstallExecuteAgain => "afterInstallExecuteAgain",
      UpgradeSchedule::AfterInstallFinalize => "afterInstallFinalize",
    }
  }
}

/// Major upgrade policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MajorUpgrade {
  pub allow_downgrades: Option<bool>,
  pub allow_same_version_upgrades: Option<bool>,
  pub downgrade_error_message: Option<String>,
  pub schedule: Option<UpgradeSchedule>,
  pub attributes: RawAttributes,
}

impl Projectable for MajorUpgrade {
  const ELEMENT: &'static str = "MajorUpgrade";

  fn rules() -> &'static [FieldRule<Self>] {
    const RULES: &[FieldRule<MajorUpgrade>] = &[
      FieldRule::optional("AllowDowngrades", |m: &MajorUpgrade| m.allow_downgrades.map(Value::Bool)),
      FieldRule::optional("AllowSameVersionUpgrades", |m: &MajorUpgrade| {
        m.allow_same_version_upgrades.map(Value::Bool)
      }),
      FieldRule::optional("DowngradeErrorMessage", |m: &MajorUpgrade| {
        m.downgrade_error_message.clone().map(Value::Str)
      }),
      FieldRule::optional("Schedule", |m: &MajorUpgrade| m.schedule.map(|s| Value::Token(s.token()))),
    ];
    RULES
  }

  fn raw_attributes(&self) -> &RawAttributes {
    &self.attributes
  }
}
