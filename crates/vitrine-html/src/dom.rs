//! Region replacement on a parsed HTML page.
//!
//! Pages are parsed once, regions are located with CSS selectors, and freshly
//! rendered fragments are spliced in before the page is serialized back.

use color_eyre::eyre::{Context, Result};
use kuchikikiki::{NodeRef, parse_html};
use log::debug;
use tendril::TendrilSink;

/// A parsed HTML document.
pub struct Page {
  document: NodeRef,
}

/// Parse an HTML fragment into the nodes it produces inside `<body>`.
fn parse_fragment(html: &str) -> Vec<NodeRef> {
  let wrapper = parse_html().one(format!("<body>{html}</body>").as_str());
  let Ok(body) = wrapper.select_first("body") else {
    return Vec::new();
  };
  let nodes: Vec<NodeRef> = body.as_node().children().collect();
  for node in &nodes {
    node.detach();
  }
  nodes
}

impl Page {
  #[must_use]
  pub fn parse(html: &str) -> Self {
    Self {
      document: parse_html().one(html),
    }
  }

  /// Serialize the document back to HTML.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails or produces invalid UTF-8.
  pub fn to_html(&self) -> Result<String> {
    let mut buf = Vec::new();
    self
      .document
      .serialize(&mut buf)
      .wrap_err("Failed to serialize HTML document")?;
    String::from_utf8(buf).wrap_err("Serialized HTML is not valid UTF-8")
  }

  fn select_all(&self, selector: &str) -> Vec<NodeRef> {
    match self.document.select(selector) {
      Ok(matches) => matches.map(|m| m.as_node().clone()).collect(),
      Err(()) => {
        debug!("Invalid selector: {selector}");
        Vec::new()
      },
    }
  }

  fn select_one(&self, selector: &str) -> Option<NodeRef> {
    let found = self
      .document
      .select_first(selector)
      .ok()
      .map(|m| m.as_node().clone());
    if found.is_none() {
      debug!("No region matches '{selector}'");
    }
    found
  }

  #[must_use]
  pub fn exists(&self, selector: &str) -> bool {
    self.document.select_first(selector).is_ok()
  }

  /// Replace the inner content of every element matching `selector`.
  pub fn replace_children(&self, selector: &str, fragment: &str) -> bool {
    let targets = self.select_all(selector);
    if targets.is_empty() {
      debug!("No region matches '{selector}'");
      return false;
    }
    for target in targets {
      for child in target.children().collect::<Vec<_>>() {
        child.detach();
      }
      for node in parse_fragment(fragment) {
        target.append(node);
      }
    }
    true
  }

  /// Replace every element matching `selector` with the fragment.
  pub fn replace_element(&self, selector: &str, fragment: &str) -> bool {
    let targets = self.select_all(selector);
    if targets.is_empty() {
      debug!("No region matches '{selector}'");
      return false;
    }
    for target in targets {
      for node in parse_fragment(fragment) {
        target.insert_before(node);
      }
      target.detach();
    }
    true
  }

  /// Insert the fragment right after the first element matching `selector`.
  pub fn insert_after(&self, selector: &str, fragment: &str) -> bool {
    let Some(target) = self.select_one(selector) else {
      return false;
    };
    // Inserting each node after the previous one keeps fragment order.
    let mut anchor = target;
    for node in parse_fragment(fragment) {
      anchor.insert_after(node.clone());
      anchor = node;
    }
    true
  }

  /// Append the fragment to the first element matching `selector`.
  pub fn append_to(&self, selector: &str, fragment: &str) -> bool {
    let Some(target) = self.select_one(selector) else {
      return false;
    };
    for node in parse_fragment(fragment) {
      target.append(node);
    }
    true
  }

  /// Prepend the fragment to the first element matching `selector`.
  pub fn prepend_to(&self, selector: &str, fragment: &str) -> bool {
    let Some(target) = self.select_one(selector) else {
      return false;
    };
    for node in parse_fragment(fragment).into_iter().rev() {
      target.prepend(node);
    }
    true
  }

  /// Detach every element matching `selector`. Returns how many were removed.
  pub fn remove(&self, selector: &str) -> usize {
    let targets = self.select_all(selector);
    let count = targets.len();
    for target in targets {
      target.detach();
    }
    count
  }

  /// Detach matching elements whose `attr` satisfies `predicate`.
  pub fn remove_where<F>(
    &self,
    selector: &str,
    attr: &str,
    predicate: F,
  ) -> usize
  where
    F: Fn(&str) -> bool,
  {
    let mut removed = 0;
    for target in self.select_all(selector) {
      let matches = target.as_element().is_some_and(|element| {
        element.attributes.borrow().get(attr).is_some_and(&predicate)
      });
      if matches {
        target.detach();
        removed += 1;
      }
    }
    removed
  }

  /// Rewrite the text of every element matching `selector`. `update` returns
  /// `None` to leave an element alone. Returns how many elements changed.
  pub fn update_text<F>(&self, selector: &str, mut update: F) -> usize
  where
    F: FnMut(&str) -> Option<String>,
  {
    let mut changed = 0;
    for target in self.select_all(selector) {
      let Some(text) = update(&target.text_contents()) else {
        continue;
      };
      for child in target.children().collect::<Vec<_>>() {
        child.detach();
      }
      target.append(NodeRef::new_text(text));
      changed += 1;
    }
    changed
  }

  /// Set an attribute on every element matching `selector`.
  pub fn set_attr(&self, selector: &str, name: &str, value: &str) -> bool {
    let targets = self.select_all(selector);
    if targets.is_empty() {
      debug!("No region matches '{selector}'");
      return false;
    }
    for target in targets {
      if let Some(element) = target.as_element() {
        element
          .attributes
          .borrow_mut()
          .insert(name, value.to_string());
      }
    }
    true
  }

  /// Attribute of the first element matching `selector`.
  #[must_use]
  pub fn attr(&self, selector: &str, name: &str) -> Option<String> {
    let node = self.document.select_first(selector).ok()?;
    let attributes = node.attributes.borrow();
    attributes.get(name).map(ToString::to_string)
  }

  /// Replace the content of every element matching `selector` with text.
  pub fn set_text(&self, selector: &str, text: &str) -> bool {
    let targets = self.select_all(selector);
    if targets.is_empty() {
      debug!("No region matches '{selector}'");
      return false;
    }
    for target in targets {
      for child in target.children().collect::<Vec<_>>() {
        child.detach();
      }
      target.append(NodeRef::new_text(text));
    }
    true
  }

  /// Text content of the first element matching `selector`.
  #[must_use]
  pub fn text(&self, selector: &str) -> Option<String> {
    self
      .document
      .select_first(selector)
      .ok()
      .map(|node| node.text_contents())
  }

  /// Number of elements matching `selector`.
  #[must_use]
  pub fn count(&self, selector: &str) -> usize {
    self.select_all(selector).len()
  }
}
