use tracing::debug;

use crate::consts::{COMMON_DIALOGS, FINISH_ORDER, INSTALL_DIR_ID, STRICT_ORDER};
use crate::id::IdAllocator;
use crate::projection::{ProjectionError, RawAttributes, project};
use crate::xml::Element;

use super::sequence::{CompiledSequence, UiSequence};
use super::types::{Dialog, DialogAction, DialogRef, TextStyle};

/// Property holding the directory id the stock install-dir dialog edits.
pub const INSTALL_DIR_PROPERTY: &str = "WIXUI_INSTALLDIR";

/// A complete `UI` definition: properties, fonts, dialog references and the
/// navigation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomUi {
  /// UI properties in insertion order.
  pub properties: Vec<(String, String)>,
  pub text_styles: Vec<TextStyle>,
  pub dialog_refs: Vec<String>,
  pub sequence: UiSequence,
  pub attributes: RawAttributes,
}

impl Default for CustomUi {
  fn default() -> Self {
    Self::new()
  }
}

impl CustomUi {
  /// Stock properties, fonts and dialog references with an empty sequence.
  pub fn new() -> Self {
    let properties = [
      ("DefaultUIFont", "WixUI_Font_Normal"),
      (INSTALL_DIR_PROPERTY, INSTALL_DIR_ID),
      ("PIDTemplate", "####-####-####-####"),
      ("ARPNOMODIFY", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Self {
      properties,
      text_styles: vec![
        TextStyle::new("WixUI_Font_Normal", "Tahoma", 8),
        TextStyle::new("WixUI_Font_Bigger", "Tahoma", 12),
        TextStyle::new("WixUI_Font_Title", "Tahoma", 9).bold(),
      ],
      dialog_refs: COMMON_DIALOGS.iter().map(|d| d.to_string()).collect(),
      sequence: UiSequence::new(),
      attributes: RawAttributes::new(),
    }
  }

  /// An empty, strict sequence meant to be layered over the stock UI.
  pub fn dialog_sequence() -> Self {
    Self {
      properties: Vec::new(),
      text_styles: Vec::new(),
      dialog_refs: Vec::new(),
      sequence: UiSequence::strict(),
      attributes: RawAttributes::new(),
    }
  }

  /// The stock welcome, licence, install-dir, customize, verify flow plus
  /// the maintenance pages.
  pub fn common_dialogs() -> Self {
    let mut ui = Self::new();
    ui.on("WelcomeDlg", "Next", [DialogAction::show_dialog("LicenseAgreementDlg")])
      .on("LicenseAgreementDlg", "Back", [DialogAction::show_dialog("WelcomeDlg")])
      .on("LicenseAgreementDlg", "Next", [DialogAction::show_dialog("InstallDirDlg")])
      .on("InstallDirDlg", "Back", [DialogAction::show_dialog("LicenseAgreementDlg")])
      .on("InstallDirDlg", "Next", [
        DialogAction::set_target_path(),
        DialogAction::show_dialog("CustomizeDlg"),
      ])
      .on("InstallDirDlg", "ChangeFolder", [
        DialogAction::set_property("_BrowseProperty", "[WIXUI_INSTALLDIR]"),
        DialogAction::spawn_dialog("BrowseDlg"),
      ])
      .on("CustomizeDlg", "Back", [DialogAction::show_dialog("InstallDirDlg")])
      .on("CustomizeDlg", "Next", [DialogAction::show_dialog("VerifyReadyDlg")]);
    ui.add_verify_and_maintenance("InstallDirDlg");
    ui.on("ExitDialog", "Finish", [DialogAction::close_dialog("Return").with_order(FINISH_ORDER)]);
    ui
  }

  /// The stock flow with `dialog` inserted right after the licence page.
  pub fn post_license_dialog(dialog: Dialog) -> Self {
    let id = dialog.id.clone();
    let mut ui = Self::new();
    ui.sequence.register(dialog);

    ui.on("ExitDialog", "Finish", [DialogAction::close_dialog("Return").with_order(FINISH_ORDER)])
      .on("WelcomeDlg", "Next", [DialogAction::show_dialog("LicenseAgreementDlg")])
      .on("LicenseAgreementDlg", "Back", [DialogAction::show_dialog("WelcomeDlg")])
      .on("LicenseAgreementDlg", "Next", [
        DialogAction::show_dialog(id.as_str()).when("LicenseAccepted = \"1\""),
      ])
      .on(id.as_str(), "Back", [DialogAction::show_dialog("LicenseAgreementDlg")])
      .on(id.as_str(), "Next", [DialogAction::show_dialog("InstallDirDlg")])
      .on(id.as_str(), "Cancel", [DialogAction::close_dialog("Exit")])
      .on("InstallDirDlg", "Back", [DialogAction::show_dialog(id.as_str())])
      .on("InstallDirDlg", "Next", [
        DialogAction::set_target_path(),
        DialogAction::show_dialog("VerifyReadyDlg"),
      ])
      .on("InstallDirDlg", "ChangeFolder", [
        DialogAction::set_property("_BrowseProperty", "[WIXUI_INSTALLDIR]"),
        DialogAction::show_dialog("BrowseDlg"),
      ]);
    ui.add_verify_and_maintenance("InstallDirDlg");
    ui
  }

  fn add_verify_and_maintenance(&mut self, back_from_verify: &str) {
    self
      .on("VerifyReadyDlg", "Back", [
        DialogAction::show_dialog(back_from_verify).when("NOT Installed"),
        DialogAction::show_dialog("MaintenanceTypeDlg").when("Installed"),
      ])
      .on("MaintenanceWelcomeDlg", "Next", [DialogAction::show_dialog("MaintenanceTypeDlg")])
      .on("MaintenanceTypeDlg", "Back", [DialogAction::show_dialog("MaintenanceWelcomeDlg")])
      .on("MaintenanceTypeDlg", "RepairButton", [DialogAction::show_dialog("VerifyReadyDlg")])
      .on("MaintenanceTypeDlg", "RemoveButton", [DialogAction::show_dialog("VerifyReadyDlg")]);
  }

  pub fn on(
    &mut self,
    dialog: impl Into<DialogRef>,
    control: &str,
    actions: impl IntoIterator<Item = DialogAction>,
  ) -> &mut Self {
    self.sequence.on(dialog, control, actions);
    self
  }

  /// Chain two dialogs with `Next`/`Back` so the link overrides stock wiring.
  pub fn link(&mut self, from: &str, to: &str) -> &mut Self {
    self
      .on(from, "Next", [DialogAction::show_dialog(to).with_order(STRICT_ORDER)])
      .on(to, "Back", [DialogAction::show_dialog(from).with_order(STRICT_ORDER)])
  }

  pub fn property(&self, name: &str) -> Option<&str> {
    self
      .properties
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }

  /// Set a UI property, keeping the position of an existing one.
  pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    let name = name.into();
    let value = value.into();
    match self.properties.iter_mut().find(|(k, _)| *k == name) {
      Some(slot) => slot.1 = value,
      None => self.properties.push((name, value)),
    }
    self
  }

  /// Point the install-dir dialog at the resolved installation directory.
  ///
  /// Only touches the property when the UI declares it.
  pub fn bind_install_dir(&mut self, directory_id: &str) {
    if let Some(slot) = self.properties.iter_mut().find(|(k, _)| k == INSTALL_DIR_PROPERTY) {
      debug!(directory = directory_id, "binding install dir property");
      slot.1 = directory_id.to_string();
    }
  }

  pub fn compile(&self) -> CompiledSequence {
    self.sequence.compile()
  }

  /// Render the complete `UI` element.
  pub fn to_element(&self, ids: &mut IdAllocator) -> Result<Element, ProjectionError> {
    let mut ui = Element::new("UI");
    for (name, value) in self.attributes.element_attributes() {
      ui.set_attr(name, value);
    }

    for style in &self.text_styles {
      ui.push(project(style, ids)?.element);
    }
    for (name, value) in &self.properties {
      ui.push(
        Element::new("Property")
          .with_attr("Id", name.as_str())
          .with_attr("Value", value.as_str()),
      );
    }
    for dialog in &self.dialog_refs {
      ui.push(Element::new("DialogRef").with_attr("Id", dialog.as_str()));
    }

    let compiled = self.compile();
    for publish in compiled.publish_elements() {
      ui.push(publish);
    }
    for dialog in &compiled.custom_dialogs {
      ui.push(dialog.to_element(ids)?);
    }

    Ok(ui)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stock_ui_has_default_properties_and_fonts() {
    let ui = CustomUi::new();

    assert_eq!(ui.property("DefaultUIFont"), Some("WixUI_Font_Normal"));
    assert_eq!(ui.property(INSTALL_DIR_PROPERTY), Some("INSTALLDIR"));
    assert_eq!(ui.text_styles.len(), 3);
    assert_eq!(ui.dialog_refs.len(), COMMON_DIALOGS.len());
    assert!(!ui.sequence.is_strict());
  }

  #[test]
  fn dialog_sequence_starts_empty_and_strict() {
    let ui = CustomUi::dialog_sequence();

    assert!(ui.properties.is_empty());
    assert!(ui.text_styles.is_empty());
    assert!(ui.dialog_refs.is_empty());
    assert!(ui.sequence.is_strict());
  }

  #[test]
  fn common_dialogs_finish_closes_with_high_order() {
    let compiled = CustomUi::common_dialogs().compile();
    let finish = compiled.entry("ExitDialog", "Finish").unwrap();

    assert_eq!(finish.actions[0].order, Some(FINISH_ORDER));
    assert_eq!(finish.actions[0].value, "Return");
  }

  #[test]
  fn post_license_dialog_is_emitted_once() {
    let dialog = Dialog::new("TermsDlg", 370, 270).with_title("Terms");
    let ui = CustomUi::post_license_dialog(dialog);
    let mut ids = IdAllocator::new();

    let element = ui.to_element(&mut ids).unwrap();
    let dialogs: Vec<_> = element.children_named("Dialog").collect();

    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].attr("Title"), Some("Terms"));

    let compiled = ui.compile();
    let accept = compiled.entry("LicenseAgreementDlg", "Next").unwrap();
    assert_eq!(accept.actions[0].condition, "LicenseAccepted = \"1\"");
  }

  #[test]
  fn install_dir_binding_only_touches_declared_property() {
    let mut ui = CustomUi::new();
    ui.bind_install_dir("APPDIR");
    assert_eq!(ui.property(INSTALL_DIR_PROPERTY), Some("APPDIR"));

    let mut strict = CustomUi::dialog_sequence();
    strict.bind_install_dir("APPDIR");
    assert_eq!(strict.property(INSTALL_DIR_PROPERTY), None);
  }

  #[test]
  fn link_overrides_with_strict_order() {
    let mut ui = CustomUi::common_dialogs();
    ui.link("WelcomeDlg", "InstallDirDlg");

    let compiled = ui.compile();
    let next = compiled.entry("WelcomeDlg", "Next").unwrap();

    assert_eq!(next.actions.len(), 2);
    assert_eq!(next.actions[1].value, "InstallDirDlg");
    assert_eq!(next.actions[1].order, Some(STRICT_ORDER));
  }

  #[test]
  fn ui_element_children_follow_fixed_order() {
    let mut ids = IdAllocator::new();
    let element = CustomUi::common_dialogs().to_element(&mut ids).unwrap();
    let names: Vec<_> = element.elements().map(|e| e.name.as_str()).collect();

    let first_publish = names.iter().position(|n| *n == "Publish").unwrap();
    let last_ref = names.iter().rposition(|n| *n == "DialogRef").unwrap();
    assert_eq!(names[0], "TextStyle");
    assert!(last_ref < first_publish);
  }
}
