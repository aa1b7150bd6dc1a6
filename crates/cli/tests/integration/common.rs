//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the manifest and
/// everything the command writes.
pub struct TestEnv {
  pub temp: TempDir,
  pub manifest_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file.
  ///
  /// Copies the fixture content to a temporary `product.json` file.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("product.json");
    std::fs::write(&manifest_path, fixture_content(name)).unwrap();
    Self { temp, manifest_path }
  }

  /// Path of a file relative to the temp directory.
  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Read a file relative to the temp directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Get a Command for the wixgen binary with logging pinned to warnings.
  pub fn wixgen_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("wixgen");
    cmd.env("RUST_LOG", "warn");
    cmd.current_dir(self.temp.path());
    cmd
  }
}
