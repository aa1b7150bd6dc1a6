use tracing::{debug, warn};

use crate::entity::Feature;
use crate::projection;
use crate::xml::Element;

use super::{CompileError, CompilePass};

/// Component ids per feature name, matched case-insensitively, in first-use order.
#[derive(Debug, Default)]
struct FeatureRefs {
  entries: Vec<(String, Vec<String>)>,
}

impl FeatureRefs {
  fn add(&mut self, feature: &str, component: &str) {
    match self.entries.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(feature)) {
      Some((_, components)) => components.push(component.to_string()),
      None => self.entries.push((feature.to_string(), vec![component.to_string()])),
    }
  }

  fn contains(&self, feature: &str) -> bool {
    self.entries.iter().any(|(name, _)| name.eq_ignore_ascii_case(feature))
  }

  fn take(&mut self, feature: &str) -> Vec<String> {
    match self.entries.iter().position(|(name, _)| name.eq_ignore_ascii_case(feature)) {
      Some(index) => self.entries.remove(index).1,
      None => Vec::new(),
    }
  }

  fn remaining(&self) -> Vec<String> {
    self.entries.iter().map(|(name, _)| name.clone()).collect()
  }
}

impl CompilePass<'_> {
  /// Emit the feature tree with a `ComponentRef` for every component.
  ///
  /// Components with no feature go to the default feature, which is only
  /// synthesized when it is needed and not declared.
  pub(super) fn emit_features(&mut self) -> Result<Vec<Element>, CompileError> {
    let project = self.project;
    let default_name = project.options.default_feature.as_str();

    let mut refs = FeatureRefs::default();
    for component in &self.component_refs {
      if component.features.is_empty() {
        refs.add(default_name, &component.id);
      }
      for feature in &component.features {
        refs.add(feature, &component.id);
      }
    }

    let mut elements = Vec::new();
    if project.feature(default_name).is_none() && (refs.contains(default_name) || project.features.is_empty()) {
      debug!(feature = default_name, "adding default feature");
      elements.push(self.feature_element(&Feature::new(default_name), &mut refs)?);
    }

    for feature in &project.features {
      elements.push(self.feature_element(feature, &mut refs)?);
    }

    for name in refs.remaining() {
      warn!(feature = %name, "feature referenced by a component was never declared, adding it");
      elements.push(self.feature_element(&Feature::new(name), &mut refs)?);
    }

    Ok(elements)
  }

  fn feature_element(&mut self, feature: &Feature, refs: &mut FeatureRefs) -> Result<Element, CompileError> {
    let mut element = projection::project(feature, &mut self.ids)?.element;
    let id = element.attr("Id").unwrap_or_default().to_string();
    self.record("Feature", id, feature.name.clone());

    for component in refs.take(&feature.name) {
      element.push(Element::new("ComponentRef").with_attr("Id", component));
    }
    for child in &feature.children {
      element.push(self.feature_element(child, refs)?);
    }
    Ok(element)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn refs_match_names_case_insensitively() {
    let mut refs = FeatureRefs::default();
    refs.add("Docs", "Component.a");
    refs.add("docs", "Component.b");
    refs.add("Main", "Component.c");

    assert!(refs.contains("DOCS"));
    assert_eq!(refs.take("Docs"), vec!["Component.a", "Component.b"]);
    assert!(refs.take("Docs").is_empty());
    assert_eq!(refs.remaining(), vec!["Main"]);
  }
}
