//! Declarations as they appear in a JSON manifest.
//!
//! Each declaration mirrors one engine entity with every optional field
//! defaulted, and converts into it with `into_*`. Explicit ids become
//! explicit [`IdSlot`]s; everything else is generated during compilation.

use serde::{Deserialize, Serialize};

use crate::dir::{Dir, Item};
use crate::entity::{
  CloseApplication, CompressionLevel, EnvironmentAction, EnvironmentPart, EnvironmentVariable, Feature,
  FeatureCondition, File, FileCollection, GenericItem, MajorUpgrade, Media, Property, RegistryHive, RegistryValue,
  RegistryValueType, Shortcut, TypicalDefault, UpgradeSchedule,
};
use crate::id::IdSlot;
use crate::projection::RawAttributes;
use crate::ui::{Dialog, DialogAction};

fn slot(id: Option<String>) -> IdSlot {
  id.map(IdSlot::explicit).unwrap_or_default()
}

fn yes() -> bool {
  true
}

fn one() -> i64 {
  1
}

/// Product metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDecl {
  pub name: String,
  #[serde(default = "default_version")]
  pub version: String,
  #[serde(default)]
  pub manufacturer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub codepage: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub guid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub upgrade_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_base_dir: Option<String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

fn default_version() -> String {
  "1.0.0.0".to_string()
}

/// Anything that can be declared in `items` or inside a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDecl {
  Dir(DirDecl),
  File(FileDecl),
  Files(FilesDecl),
  Shortcut(ShortcutDecl),
  Registry(RegistryDecl),
  Environment(EnvironmentDecl),
  CloseApplication(CloseApplicationDecl),
}

impl ItemDecl {
  /// Short label used in error messages.
  pub fn label(&self) -> String {
    match self {
      ItemDecl::Dir(d) => format!("dir {}", d.path),
      ItemDecl::File(f) => format!("file {}", f.source),
      ItemDecl::Files(f) => format!("files {}", f.pattern),
      ItemDecl::Shortcut(s) => format!("shortcut {}", s.name),
      ItemDecl::Registry(r) => format!("registry {}", r.key),
      ItemDecl::Environment(e) => format!("environment {}", e.name),
      ItemDecl::CloseApplication(c) => format!("close_application {}", c.target),
    }
  }

  /// Every `(feature, item label)` pair referenced by this item and its children.
  pub fn feature_refs(&self, out: &mut Vec<(String, String)>) {
    let own: &[String] = match self {
      ItemDecl::Dir(d) => &d.features,
      ItemDecl::File(f) => &f.features,
      ItemDecl::Files(f) => &f.features,
      ItemDecl::Shortcut(s) => &s.features,
      ItemDecl::Registry(r) => &r.features,
      ItemDecl::Environment(e) => &e.features,
      ItemDecl::CloseApplication(_) => &[],
    };
    for feature in own {
      out.push((feature.clone(), self.label()));
    }
    if let ItemDecl::Dir(dir) = self {
      for item in &dir.items {
        item.feature_refs(out);
      }
    }
  }

  pub fn into_item(self) -> Item {
    match self {
      ItemDecl::Dir(d) => Item::Dir(d.into_dir()),
      ItemDecl::File(f) => Item::File(f.into_file()),
      ItemDecl::Files(f) => Item::Files(f.into_collection()),
      ItemDecl::Shortcut(s) => Item::Shortcut(s.into_shortcut()),
      ItemDecl::Registry(r) => Item::Generic(GenericItem::RegistryValue(r.into_registry_value())),
      ItemDecl::Environment(e) => Item::Generic(GenericItem::EnvironmentVariable(e.into_variable())),
      ItemDecl::CloseApplication(c) => Item::Generic(GenericItem::CloseApplication(c.into_close_application())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirDecl {
  pub path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub install_dir: bool,
  #[serde(default)]
  pub attributes: RawAttributes,
  #[serde(default)]
  pub items: Vec<ItemDecl>,
}

impl DirDecl {
  pub fn into_dir(self) -> Dir {
    Dir {
      path: self.path,
      id: self.id,
      features: self.features,
      attributes: self.attributes,
      install_dir: self.install_dir,
      items: self.items.into_iter().map(ItemDecl::into_item).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDecl {
  pub source: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vital: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_only: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hidden: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub compressed: Option<bool>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl FileDecl {
  pub fn into_file(self) -> File {
    File {
      id: slot(self.id),
      source: self.source,
      name: self.name,
      features: self.features,
      vital: self.vital,
      read_only: self.read_only,
      hidden: self.hidden,
      compressed: self.compressed,
      attributes: self.attributes,
    }
  }
}

/// Files matched by a wildcard, listed explicitly since the compiler does no
/// file system access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesDecl {
  pub pattern: String,
  #[serde(default)]
  pub files: Vec<String>,
  #[serde(default)]
  pub features: Vec<String>,
}

impl FilesDecl {
  pub fn into_collection(self) -> FileCollection {
    let mut collection = FileCollection::new(self.pattern, self.files.into_iter().map(File::new).collect());
    collection.features = self.features;
    collection
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutDecl {
  pub name: String,
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub arguments: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub working_directory: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl ShortcutDecl {
  pub fn into_shortcut(self) -> Shortcut {
    Shortcut {
      id: slot(self.id),
      name: self.name,
      target: self.target,
      arguments: self.arguments,
      working_directory: self.working_directory,
      description: self.description,
      icon: self.icon,
      features: self.features,
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDecl {
  #[serde(default)]
  pub root: RegistryHive,
  pub key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub value: String,
  #[serde(default, rename = "type")]
  pub value_type: RegistryValueType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub win64: Option<bool>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl RegistryDecl {
  pub fn into_registry_value(self) -> RegistryValue {
    RegistryValue {
      id: slot(self.id),
      root: self.root,
      key: self.key,
      name: self.name,
      value: self.value,
      value_type: self.value_type,
      win64: self.win64,
      features: self.features,
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDecl {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub system: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub permanent: Option<bool>,
  #[serde(default)]
  pub action: EnvironmentAction,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub part: Option<EnvironmentPart>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl EnvironmentDecl {
  pub fn into_variable(self) -> EnvironmentVariable {
    EnvironmentVariable {
      id: slot(self.id),
      name: self.name,
      value: self.value,
      system: self.system,
      permanent: self.permanent,
      action: self.action,
      part: self.part,
      condition: self.condition,
      features: self.features,
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseApplicationDecl {
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub property: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reboot_prompt: Option<bool>,
  #[serde(default)]
  pub close_message: bool,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl CloseApplicationDecl {
  pub fn into_close_application(self) -> CloseApplication {
    let mut app = CloseApplication::new(self.target);
    app.id = self.id;
    app.property = self.property;
    app.description = self.description;
    if let Some(timeout) = self.timeout {
      app.timeout = timeout;
    }
    if let Some(reboot_prompt) = self.reboot_prompt {
      app.reboot_prompt = reboot_prompt;
    }
    app.close_message = self.close_message;
    app.attributes = self.attributes;
    app
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDecl {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default = "one")]
  pub level: i64,
  #[serde(default = "yes")]
  pub allow_change: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub typical_default: Option<TypicalDefault>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub configurable_dir: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<FeatureCondition>,
  #[serde(default)]
  pub children: Vec<FeatureDecl>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl FeatureDecl {
  /// This feature's name and all nested names.
  pub fn names(&self) -> Vec<&str> {
    let mut names = vec![self.name.as_str()];
    for child in &self.children {
      names.extend(child.names());
    }
    names
  }

  pub fn into_feature(self) -> Feature {
    Feature {
      id: slot(self.id),
      name: self.name,
      description: self.description,
      level: self.level,
      allow_change: self.allow_change,
      typical_default: self.typical_default,
      configurable_dir: self.configurable_dir,
      condition: self.condition,
      children: self.children.into_iter().map(FeatureDecl::into_feature).collect(),
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub secure: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hidden: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub admin: Option<bool>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl PropertyDecl {
  pub fn into_property(self) -> Property {
    Property {
      name: self.name,
      value: self.value,
      secure: self.secure,
      hidden: self.hidden,
      admin: self.admin,
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDecl {
  #[serde(default = "one")]
  pub id: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cabinet: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub embed_cab: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub compression_level: Option<CompressionLevel>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub disk_prompt: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub volume_label: Option<String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl MediaDecl {
  /// Unset cabinet settings keep the embedded `Cab1.cab` default.
  pub fn into_media(self) -> Media {
    let default = Media::default();
    Media {
      id: self.id,
      cabinet: self.cabinet.or(default.cabinet),
      embed_cab: self.embed_cab.or(default.embed_cab),
      compression_level: self.compression_level,
      disk_prompt: self.disk_prompt,
      volume_label: self.volume_label,
      attributes: self.attributes,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorUpgradeDecl {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow_downgrades: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow_same_version_upgrades: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub downgrade_error_message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schedule: Option<UpgradeSchedule>,
  #[serde(default)]
  pub attributes: RawAttributes,
}

impl MajorUpgradeDecl {
  pub fn into_major_upgrade(self) -> MajorUpgrade {
    MajorUpgrade {
      allow_downgrades: self.allow_downgrades,
      allow_same_version_upgrades: self.allow_same_version_upgrades,
      downgrade_error_message: self.downgrade_error_message,
      schedule: self.schedule,
      attributes: self.attributes,
    }
  }
}

/// Which dialog flow a manifest UI starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiPreset {
  /// Welcome, licence, install dir, customize and verify pages.
  #[default]
  CommonDialogs,
  /// Stock properties and dialog references, no navigation.
  Stock,
  /// An empty strict sequence layered over a stock UI.
  DialogSequence,
}

/// Actions published for one `(dialog, control)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDecl {
  pub dialog: String,
  pub control: String,
  #[serde(default)]
  pub actions: Vec<DialogAction>,
  /// Drop whatever the preset published for this pair first.
  #[serde(default)]
  pub replace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiDecl {
  #[serde(default)]
  pub preset: UiPreset,
  /// Custom dialog shown after the licence page. Replaces the preset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub post_license: Option<Dialog>,
  #[serde(default)]
  pub dialogs: Vec<Dialog>,
  #[serde(default)]
  pub publish: Vec<PublishDecl>,
  #[serde(default)]
  pub properties: std::collections::BTreeMap<String, String>,
  #[serde(default)]
  pub attributes: RawAttributes,
}
