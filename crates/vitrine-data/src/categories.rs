use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Entry of `config/categories.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:         u32,
  #[serde(default)]
  pub slug:       String,
  #[serde(default)]
  pub name:       String,
  #[serde(default)]
  pub page:       String,
  #[serde(default)]
  pub image:      String,
  #[serde(default = "default_menu_order")]
  pub menu_order: u32,
}

const fn default_menu_order() -> u32 {
  999
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryMap {
  #[serde(default)]
  pub categories: Vec<Category>,
}

impl CategoryMap {
  /// Load the category map. A missing file yields an empty map.
  ///
  /// # Errors
  ///
  /// Returns an error if the file exists but cannot be read or parsed.
  pub fn load(path: &Path) -> Result<Self, DataError> {
    if !path.exists() {
      return Ok(Self::default());
    }
    let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Categories sorted by `menu_order`.
  #[must_use]
  pub fn sorted(&self) -> Vec<&Category> {
    let mut sorted: Vec<&Category> = self.categories.iter().collect();
    sorted.sort_by_key(|c| c.menu_order);
    sorted
  }

  #[must_use]
  pub fn by_id(&self, id: u32) -> Option<&Category> {
    self.categories.iter().find(|c| c.id == id)
  }

  #[must_use]
  pub fn by_slug(&self, slug: &str) -> Option<&Category> {
    self.categories.iter().find(|c| c.slug == slug)
  }

  /// Look up by numeric id when `query` parses as one, else by slug.
  #[must_use]
  pub fn lookup(&self, query: &str) -> Option<&Category> {
    query
      .parse()
      .ok()
      .and_then(|id| self.by_id(id))
      .or_else(|| self.by_slug(query))
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  const JSON: &str = r#"{
    "categories": [
      {"id": 3, "slug": "couchage", "name": "Couchage", "page": "3.html", "image": "3.webp", "menu_order": 2},
      {"id": 1, "slug": "tentes", "name": "Tentes", "page": "1.html", "image": "1.webp", "menu_order": 1},
      {"id": 7, "slug": "divers", "name": "Divers"}
    ]
  }"#;

  #[test]
  fn test_sorted_and_lookup() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let path = dir.path().join("categories.json");
    fs::write(&path, JSON).unwrap();

    let map = CategoryMap::load(&path).unwrap();
    let ids: Vec<_> = map.sorted().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 3, 7]);
    assert_eq!(map.lookup("3").unwrap().slug, "couchage");
    assert_eq!(map.lookup("tentes").unwrap().id, 1);
    assert!(map.lookup("missing").is_none());
  }

  #[test]
  fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let map = CategoryMap::load(&dir.path().join("nope.json")).unwrap();
    assert!(map.categories.is_empty());
  }
}
