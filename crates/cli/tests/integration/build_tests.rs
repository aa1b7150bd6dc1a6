//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_writes_document_next_to_manifest() {
  let env = TestEnv::from_fixture("minimal.json");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Built"))
    .stdout(predicate::str::contains("Install dir: INSTALLDIR"));

  let xml = env.read_file("product.wxs");
  assert!(xml.starts_with("<?xml"));
  assert!(xml.contains(r#"<Directory Id="INSTALLDIR" Name="Minimal">"#));
  assert!(xml.contains(r#"Id="Component.readme.txt""#));
}

#[test]
fn build_honors_output_flag() {
  let env = TestEnv::from_fixture("minimal.json");
  let output = env.path("out/setup.wxs");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .arg("--output")
    .arg(&output)
    .assert()
    .success();

  assert!(output.exists());
  assert!(!env.path("product.wxs").exists());
}

#[test]
fn build_to_stdout_writes_nothing() {
  let env = TestEnv::from_fixture("minimal.json");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .arg("--stdout")
    .assert()
    .success()
    .stdout(predicate::str::contains("<Wix xmlns="));

  assert!(!env.path("product.wxs").exists());
}

#[test]
fn build_is_deterministic() {
  let env = TestEnv::from_fixture("app.json");

  for output in ["first.wxs", "second.wxs"] {
    env
      .wixgen_cmd()
      .arg("build")
      .arg(&env.manifest_path)
      .arg("-o")
      .arg(env.path(output))
      .assert()
      .success();
  }

  assert_eq!(env.read_file("first.wxs"), env.read_file("second.wxs"));
}

#[test]
fn build_full_manifest() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Components: 6"));

  let xml = env.read_file("product.wxs");
  assert!(xml.contains(r#"xmlns:util="#));
  assert!(xml.contains(r#"<Directory Id="INSTALLDIR.Docs" Name="Docs">"#));
  assert!(xml.contains(r#"Id="Component.INSTALLDIR.Logs.EmptyDirectory""#));
  assert!(xml.contains(r#"Source="build\release\app.exe""#));
  assert!(xml.contains(r#"Id="ProgramMenuFolder.Acme.Acme20App""#));
  assert!(xml.contains(r#"Id="Component.InstallDir""#));
  assert!(xml.contains("util:CloseApplication"));
  assert!(xml.contains(r#"<Property Id="WIXUI_INSTALLDIR" Value="INSTALLDIR""#));
}

#[test]
fn build_json_reports_counts() {
  let env = TestEnv::from_fixture("app.json");

  env
    .wixgen_cmd()
    .arg("--json")
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""components": 6"#))
    .stdout(predicate::str::contains(r#""install_dir": "INSTALLDIR""#));
}

#[test]
fn build_custom_dialog_manifest() {
  let env = TestEnv::from_fixture("custom_dialog.json");

  env.wixgen_cmd().arg("build").arg(&env.manifest_path).assert().success();

  let xml = env.read_file("product.wxs");
  assert!(xml.contains(r#"<Dialog Id="ProxyDlg""#));
  assert!(xml.contains(r#"Dialog="LicenseAgreementDlg" Control="Next" Event="NewDialog" Value="ProxyDlg""#));
}

#[test]
fn undeclared_feature_fails_without_output() {
  let env = TestEnv::from_fixture("unknown_feature.json");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("undeclared feature 'Extras'"));

  assert!(!env.path("product.wxs").exists());
}

#[test]
fn project_level_file_fails() {
  let env = TestEnv::from_fixture("project_file.json");

  env
    .wixgen_cmd()
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("File is not expected to be a child of Project"));
}

#[test]
fn build_logs_progress_to_stderr() {
  let env = TestEnv::from_fixture("minimal.json");

  env
    .wixgen_cmd()
    .env("RUST_LOG", "info")
    .arg("build")
    .arg(&env.manifest_path)
    .assert()
    .success()
    .stderr(predicate::str::contains("compiled manifest"))
    .stderr(predicate::str::contains("wrote document"))
    .stdout(predicate::str::contains("compiled manifest").not());
}
