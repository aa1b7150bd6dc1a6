//! Manifests compiled end to end.

use wixgen_lib::util::hash::Hashable;
use wixgen_lib::{Manifest, ManifestError, compile};

const PRODUCT: &str = r#"{
  "product": { "name": "Acme", "version": "3.0.1", "manufacturer": "Acme Ltd" },
  "features": [{ "name": "Complete" }, { "name": "Tools" }],
  "items": [
    { "kind": "dir", "path": "%ProgramFiles%\\Acme", "items": [
      { "kind": "file", "source": "acme.exe" },
      { "kind": "files", "pattern": "tools\\*.exe", "files": ["tools\\fmt.exe", "tools\\lint.exe"], "features": ["Tools"] }
    ] },
    { "kind": "environment", "name": "PATH", "value": "[INSTALLDIR]", "part": "last", "system": true }
  ],
  "options": { "empty_directories": "elide" }
}"#;

#[test]
fn manifest_compiles_to_features_and_components() {
  let project = Manifest::from_json(PRODUCT).unwrap().into_project().unwrap();
  let compiled = compile(&project).unwrap();
  let product = compiled.document.child("Product").unwrap();

  let tools = product.child_where("Feature", "Title", "Tools").unwrap();
  assert_eq!(tools.children_named("ComponentRef").count(), 2);

  let complete = product.child_where("Feature", "Title", "Complete").unwrap();
  assert!(complete.child_where("ComponentRef", "Id", "Component.acme.exe").is_some());
  assert_eq!(product.attr("Version"), Some("3.0.1"));
}

#[test]
fn environment_variable_gets_its_own_component() {
  let project = Manifest::from_json(PRODUCT).unwrap().into_project().unwrap();
  let compiled = compile(&project).unwrap();

  let environment = compiled.document.descendants_named("Environment");
  assert_eq!(environment.len(), 1);
  assert_eq!(environment[0].attr("Name"), Some("PATH"));
  assert_eq!(environment[0].attr("Part"), Some("last"));
}

#[test]
fn fingerprint_ignores_whitespace() {
  let compact: String = PRODUCT.lines().map(str::trim).collect();

  let a = Manifest::from_json(PRODUCT).unwrap();
  let b = Manifest::from_json(&compact).unwrap();

  assert_eq!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
}

#[test]
fn unknown_feature_names_the_item() {
  let manifest = Manifest::from_json(
    r#"{
      "product": { "name": "Acme" },
      "features": [{ "name": "Main" }],
      "items": [{ "kind": "registry", "key": "Software\\Acme", "name": "Flag", "features": ["Missing"] }]
    }"#,
  )
  .unwrap();

  let err = manifest.into_project().unwrap_err();

  assert!(matches!(err, ManifestError::UnknownFeature { .. }));
  assert_eq!(err.to_string(), "registry Software\\Acme references undeclared feature 'Missing'");
}
