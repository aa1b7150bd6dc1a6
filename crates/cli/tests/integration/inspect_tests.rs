//! Inspect command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn inspect_shows_merged_tree() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("inspect")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("App [INSTALLDIR] (install dir)"))
    .stdout(predicate::str::contains("Docs [INSTALLDIR.Docs]"))
    .stdout(predicate::str::contains("WelcomeDlg → LicenseAgreementDlg"));
}

#[test]
fn inspect_verbose_counts_files() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("inspect")
    .arg(&env.manifest_path)
    .arg("--verbose")
    .assert()
    .success()
    .stdout(predicate::str::contains("(install dir) 2 files"));
}

#[test]
fn inspect_json_lists_dialogs() {
  let env = TestEnv::from_fixture("custom_dialog.json");

  let assert = env
    .wixgen_cmd()
    .arg("inspect")
    .arg(&env.manifest_path)
    .arg("--json")
    .assert()
    .success();

  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  let dialogs = value["dialogs"].as_array().unwrap();

  assert!(dialogs.iter().any(|d| d["dialog"] == "ProxyDlg"));
  assert_eq!(value["install_dir"], "INSTALLDIR");
}
