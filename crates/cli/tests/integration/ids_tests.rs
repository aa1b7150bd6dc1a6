//! Ids command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn ids_lists_every_kind() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("ids")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("ProgramFilesFolder.Acme"))
    .stdout(predicate::str::contains("Component.app.exe"))
    .stdout(predicate::str::contains("identifiers"));
}

#[test]
fn ids_filter_by_kind() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("ids")
    .arg("--kind")
    .arg("directory")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("INSTALLDIR.Logs"))
    .stdout(predicate::str::contains("Component.").not());
}

#[test]
fn ids_json_is_an_array() {
  let env = TestEnv::from_fixture("minimal.json");

  let assert = env
    .wixgen_cmd()
    .arg("ids")
    .arg("--json")
    .arg(&env.manifest_path)
    .assert()
    .success();

  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  let ids = value.as_array().unwrap();

  assert!(ids.iter().any(|a| a["kind"] == "Directory" && a["id"] == "INSTALLDIR"));
}
