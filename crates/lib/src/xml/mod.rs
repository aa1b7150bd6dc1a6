//! In-memory output document and its text rendering.
//!
//! The compiler builds a plain [`Element`] tree. Rendering to text is a
//! separate step ([`to_string`]) so callers decide where the document goes;
//! nothing in the engine writes files.

use std::fmt;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  Text(String),
  CData(String),
}

/// One output element with ordered attributes and children.
///
/// Attribute names are unique: [`Element::set_attr`] replaces an existing
/// value in place, so the first writer of a name fixes its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
  pub name: String,
  pub attributes: Vec<(String, String)>,
  pub children: Vec<Node>,
}

impl Element {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      attributes: Vec::new(),
      children: Vec::new(),
    }
  }

  /// Builder form of [`Element::set_attr`].
  pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.set_attr(name, value);
    self
  }

  /// Builder form of [`Element::push`].
  pub fn with_child(mut self, child: Element) -> Self {
    self.push(child);
    self
  }

  pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    match self.attributes.iter_mut().find(|(k, _)| *k == name) {
      Some(slot) => slot.1 = value,
      None => self.attributes.push((name, value)),
    }
  }

  /// Insert an attribute at the front, replacing any existing value.
  pub fn set_attr_first(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    self.attributes.retain(|(k, _)| *k != name);
    self.attributes.insert(0, (name, value.into()));
  }

  pub fn attr(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }

  pub fn has_attr(&self, name: &str) -> bool {
    self.attr(name).is_some()
  }

  pub fn push(&mut self, child: Element) {
    self.children.push(Node::Element(child));
  }

  pub fn push_text(&mut self, text: impl Into<String>) {
    self.children.push(Node::Text(text.into()));
  }

  pub fn push_cdata(&mut self, data: impl Into<String>) {
    self.children.push(Node::CData(data.into()));
  }

  /// Concatenated text content of direct text children.
  pub fn text(&self) -> String {
    self
      .children
      .iter()
      .filter_map(|c| match c {
        Node::Text(t) | Node::CData(t) => Some(t.as_str()),
        Node::Element(_) => None,
      })
      .collect()
  }

  /// Direct child elements.
  pub fn elements(&self) -> impl Iterator<Item = &Element> {
    self.children.iter().filter_map(|c| match c {
      Node::Element(e) => Some(e),
      _ => None,
    })
  }

  pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
    self.children.iter_mut().filter_map(|c| match c {
      Node::Element(e) => Some(e),
      _ => None,
    })
  }

  /// Direct child elements with the given name.
  pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    self.elements().filter(move |e| e.name == name)
  }

  pub fn child(&self, name: &str) -> Option<&Element> {
    self.elements().find(|e| e.name == name)
  }

  /// First direct child with the given name and attribute value.
  pub fn child_where(&self, name: &str, attr: &str, value: &str) -> Option<&Element> {
    self
      .elements()
      .find(|e| e.name == name && e.attr(attr) == Some(value))
  }

  pub fn child_where_mut(&mut self, name: &str, attr: &str, value: &str) -> Option<&mut Element> {
    self
      .elements_mut()
      .find(|e| e.name == name && e.attr(attr) == Some(value))
  }

  /// All descendant elements with the given name, depth first, document order.
  pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    self.collect_named(name, &mut found);
    found
  }

  fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
    for child in self.elements() {
      if child.name == name {
        found.push(child);
      }
      child.collect_named(name, found);
    }
  }
}

/// Errors that can occur while rendering a document to text.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("failed to write xml: {0}")]
  Write(String),

  #[error("rendered document is not valid utf-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
}

/// Render an element tree as an indented XML document with a declaration.
pub fn to_string(root: &Element) -> Result<String, RenderError> {
  let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

  writer
    .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
    .map_err(|e| RenderError::Write(e.to_string()))?;
  write_element(&mut writer, root)?;

  let mut text = String::from_utf8(writer.into_inner())?;
  text.push('\n');
  Ok(text)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), RenderError> {
  let mut start = BytesStart::new(element.name.as_str());
  for (name, value) in &element.attributes {
    start.push_attribute((name.as_str(), value.as_str()));
  }

  if element.children.is_empty() {
    return writer
      .write_event(Event::Empty(start))
      .map_err(|e| RenderError::Write(e.to_string()));
  }

  writer
    .write_event(Event::Start(start))
    .map_err(|e| RenderError::Write(e.to_string()))?;

  for child in &element.children {
    match child {
      Node::Element(e) => write_element(writer, e)?,
      Node::Text(t) => writer
        .write_event(Event::Text(BytesText::new(t)))
        .map_err(|e| RenderError::Write(e.to_string()))?,
      Node::CData(d) => {
        for section in cdata_sections(d) {
          writer
            .write_event(Event::CData(BytesCData::new(section)))
            .map_err(|e| RenderError::Write(e.to_string()))?;
        }
      }
    }
  }

  writer
    .write_event(Event::End(BytesEnd::new(element.name.as_str())))
    .map_err(|e| RenderError::Write(e.to_string()))
}

/// Split CDATA content so no section contains the `]]>` terminator.
fn cdata_sections(data: &str) -> Vec<String> {
  let parts: Vec<&str> = data.split("]]>").collect();
  let last = parts.len() - 1;
  parts
    .iter()
    .enumerate()
    .map(|(i, part)| {
      let open = if i > 0 { ">" } else { "" };
      let close = if i < last { "]]" } else { "" };
      format!("{}{}{}", open, part, close)
    })
    .collect()
}

impl fmt::Display for Element {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match to_string(self) {
      Ok(text) => f.write_str(&text),
      Err(_) => Err(fmt::Error),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cdata_terminator_is_split_across_sections() {
    let mut el = Element::new("Condition");
    el.push_cdata("A]]>B");
    let text = to_string(&el).unwrap();

    assert!(text.contains("<Condition><![CDATA[A]]]]><![CDATA[>B]]></Condition>"));
    assert_eq!(cdata_sections("plain"), vec!["plain"]);
  }

  #[test]
  fn set_attr_replaces_in_place() {
    let mut el = Element::new("File").with_attr("Id", "a").with_attr("Name", "a.txt");
    el.set_attr("Id", "b");

    assert_eq!(el.attributes, vec![
      ("Id".to_string(), "b".to_string()),
      ("Name".to_string(), "a.txt".to_string()),
    ]);
  }

  #[test]
  fn set_attr_first_moves_to_front() {
    let mut el = Element::new("File").with_attr("Name", "a.txt").with_attr("Id", "x");
    el.set_attr_first("Id", "a.txt");

    assert_eq!(el.attributes[0], ("Id".to_string(), "a.txt".to_string()));
    assert_eq!(el.attributes.len(), 2);
  }

  #[test]
  fn renders_nested_document() {
    let mut component = Element::new("Component").with_attr("Id", "Component.a.txt");
    component.push(Element::new("File").with_attr("Source", "files\\a & b.txt"));
    let root = Element::new("Directory").with_attr("Id", "TARGETDIR").with_child(component);

    let text = to_string(&root).unwrap();

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(text.contains("<Directory Id=\"TARGETDIR\">"));
    assert!(text.contains("Source=\"files\\a &amp; b.txt\""));
    assert!(text.contains("</Directory>"));
  }

  #[test]
  fn descendants_are_found_in_document_order() {
    let root = Element::new("Root")
      .with_child(Element::new("Directory").with_attr("Id", "a").with_child(Element::new("Directory").with_attr("Id", "b")))
      .with_child(Element::new("Directory").with_attr("Id", "c"));

    let ids: Vec<_> = root
      .descendants_named("Directory")
      .iter()
      .filter_map(|d| d.attr("Id"))
      .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
  }
}
