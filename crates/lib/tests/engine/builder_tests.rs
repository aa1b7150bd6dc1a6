//! End-to-end compilation through the builder API.

use wixgen_lib::dir::Dir;
use wixgen_lib::entity::File;
use wixgen_lib::xml::Element;
use wixgen_lib::{Compiled, Project, compile};

fn files(compiled: &Compiled) -> Vec<&Element> {
  compiled.document.descendants_named("File")
}

fn file_by_source<'a>(compiled: &'a Compiled, source: &str) -> &'a Element {
  files(compiled)
    .into_iter()
    .find(|f| f.attr("Source") == Some(source))
    .unwrap_or_else(|| panic!("no file with source {source}"))
}

mod identifiers {
  use super::*;

  #[test]
  fn same_file_name_in_two_dirs_gets_distinct_ids() {
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme\\En", vec![File::new("en\\readme.txt").into()]))
      .unwrap();
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme\\De", vec![File::new("de\\readme.txt").into()]))
      .unwrap();

    let compiled = compile(&project).unwrap();

    assert_eq!(file_by_source(&compiled, "en\\readme.txt").attr("Id"), Some("readme.txt"));
    assert_eq!(file_by_source(&compiled, "de\\readme.txt").attr("Id"), Some("readme.txt.1"));

    let components: Vec<&str> = compiled
      .ids
      .iter()
      .filter(|a| a.kind == "Component")
      .map(|a| a.id.as_str())
      .collect();
    assert_eq!(components, vec!["Component.readme.txt", "Component.readme.txt.1"]);
  }

  #[test]
  fn ids_are_unique_per_kind() {
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![
        File::new("a\\setup.ini").into(),
        File::new("b\\SETUP.INI").into(),
        File::new("c\\setup.ini").into(),
      ]))
      .unwrap();

    let compiled = compile(&project).unwrap();
    let mut ids: Vec<String> = files(&compiled)
      .iter()
      .filter_map(|f| f.attr("Id"))
      .map(str::to_lowercase)
      .collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 3);
  }

  #[test]
  fn explicit_id_is_kept_verbatim() {
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![
        File::new("acme.exe").with_id("MainExecutable").into(),
      ]))
      .unwrap();

    let compiled = compile(&project).unwrap();

    assert_eq!(file_by_source(&compiled, "acme.exe").attr("Id"), Some("MainExecutable"));
  }

  #[test]
  fn second_pass_over_same_project_reproduces_ids() {
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![
        File::new("x\\app.exe").into(),
        File::new("y\\app.exe").into(),
      ]))
      .unwrap();

    let first = compile(&project).unwrap();
    let second = compile(&project).unwrap();

    assert_eq!(first.ids, second.ids);
    assert_eq!(first.to_xml().unwrap(), second.to_xml().unwrap());
  }
}

mod projection {
  use super::*;

  #[test]
  fn unset_tri_state_flags_are_omitted() {
    let mut hidden = File::new("hidden.dat");
    hidden.hidden = Some(false);
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![File::new("plain.dat").into(), hidden.into()]))
      .unwrap();

    let compiled = compile(&project).unwrap();

    assert_eq!(file_by_source(&compiled, "plain.dat").attr("Hidden"), None);
    assert_eq!(file_by_source(&compiled, "hidden.dat").attr("Hidden"), Some("no"));
  }

  #[test]
  fn raw_attributes_override_and_route_to_component() {
    let mut file = File::new("driver.sys")
      .with_attribute("Vital", "no")
      .with_attribute("Component:Permanent", "yes");
    file.vital = Some(true);

    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![file.into()]))
      .unwrap();

    let compiled = compile(&project).unwrap();
    let element = file_by_source(&compiled, "driver.sys");
    let component = compiled
      .document
      .descendants_named("Component")
      .into_iter()
      .find(|c| c.attr("Id") == Some("Component.driver.sys"))
      .unwrap();

    assert_eq!(element.attr("Vital"), Some("no"));
    assert_eq!(element.attr("Component:Permanent"), None);
    assert_eq!(component.attr("Permanent"), Some("yes"));
  }
}

mod documents {
  use super::*;

  #[test]
  fn rendered_document_has_declaration_and_namespace() {
    let mut project = Project::new("Acme");
    project
      .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![File::new("acme.exe").into()]))
      .unwrap();

    let xml = compile(&project).unwrap().to_xml().unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<Wix xmlns=\"http://schemas.microsoft.com/wix/2006/wi\">"));
    assert!(xml.contains("<Directory Id=\"TARGETDIR\" Name=\"SourceDir\">"));
  }

  #[test]
  fn component_guids_follow_the_guid_seed() {
    let build = |seed: &str| {
      let mut project = Project::new("Acme");
      project.guid = Some(seed.to_string());
      project
        .add_dir(Dir::new("%ProgramFiles%\\Acme", vec![File::new("acme.exe").into()]))
        .unwrap();
      let compiled = compile(&project).unwrap();
      compiled.document.descendants_named("Component")[0]
        .attr("Guid")
        .map(str::to_string)
        .unwrap()
    };

    assert_eq!(build("seed-a"), build("seed-a"));
    assert_ne!(build("seed-a"), build("seed-b"));
  }
}
