use std::{collections::HashMap, fs::File, io::Read, path::Path};

use log::debug;

use crate::error::DataError;

const MENU_PREFIX: &str = "menu.";
const FOOTER_LINK_PREFIX: &str = "footer.link.";

/// UI copy for one language, keyed by dot-namespaced translation keys.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
  language: String,
  column:   Option<String>,
  entries:  HashMap<String, String>,
}

/// A category entry of the site menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
  /// 1-based position in the sorted `menu.*` keys; doubles as the category id.
  pub number: usize,
  pub key:    String,
  pub text:   String,
}

/// What a footer link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FooterTarget {
  Home,
  Sitemap,
  Legal { slug: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLink {
  pub key:    String,
  pub text:   String,
  pub target: FooterTarget,
}

impl TranslationTable {
  /// Load the translations for `language` from a CSV file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be opened or is not valid CSV.
  pub fn load(path: &Path, language: &str) -> Result<Self, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let table = Self::from_reader(file, language)?;
    debug!(
      "Loaded {} translation keys from {} (column {})",
      table.len(),
      path.display(),
      table.column.as_deref().unwrap_or("<none>")
    );
    Ok(table)
  }

  /// Parse translations from any CSV source.
  ///
  /// The value column is `{language}_auto` when present, then `{language}`,
  /// then `en`. Blank cells and spreadsheet formulas are skipped.
  ///
  /// # Errors
  ///
  /// Returns an error if the CSV cannot be parsed.
  pub fn from_reader<R: Read>(
    reader: R,
    language: &str,
  ) -> Result<Self, DataError> {
    let mut reader =
      csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let key_index = position("key");
    let auto_column = format!("{language}_auto");
    let column = [auto_column.as_str(), language, "en"]
      .into_iter()
      .find_map(|name| position(name).map(|index| (name.to_string(), index)));

    let mut entries = HashMap::new();
    if let (Some(key_index), Some((_, value_index))) = (key_index, &column) {
      for record in reader.records() {
        let record = record?;
        let key = record.get(key_index).unwrap_or("").trim();
        if key.is_empty() {
          continue;
        }
        let value = record.get(*value_index).unwrap_or("").trim();
        if value.is_empty() || value.starts_with('=') {
          continue;
        }
        entries
          .entry(key.to_string())
          .or_insert_with(|| value.to_string());
      }
    }

    Ok(Self {
      language: language.to_string(),
      column: column.map(|(name, _)| name),
      entries,
    })
  }

  /// Build a table directly from key/value pairs.
  #[must_use]
  pub fn from_entries<I, K, V>(language: &str, entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      language: language.to_string(),
      column:   None,
      entries:  entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }

  #[must_use]
  pub fn language(&self) -> &str {
    &self.language
  }

  /// The CSV column the values were read from.
  #[must_use]
  pub fn column(&self) -> Option<&str> {
    self.column.as_deref()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  /// Look up `key`, falling back to `default` when it is missing.
  #[must_use]
  pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
    self.get(key).unwrap_or(default)
  }

  /// Category menu entries, numbered by the byte order of their keys.
  #[must_use]
  pub fn menu_entries(&self) -> Vec<MenuEntry> {
    let mut items: Vec<(&String, &String)> = self
      .entries
      .iter()
      .filter(|(key, _)| key.starts_with(MENU_PREFIX))
      .collect();
    items.sort_by(|a, b| a.0.cmp(b.0));

    items
      .into_iter()
      .enumerate()
      .map(|(index, (key, text))| {
        MenuEntry {
          number: index + 1,
          key:    key.clone(),
          text:   text.clone(),
        }
      })
      .collect()
  }

  /// Footer links ordered home, sitemap, then legal pages by key.
  #[must_use]
  pub fn footer_links(&self) -> Vec<FooterLink> {
    let mut home = None;
    let mut sitemap = None;
    let mut legal = Vec::new();

    for (key, text) in &self.entries {
      let Some(name) = key.strip_prefix(FOOTER_LINK_PREFIX) else {
        continue;
      };
      if name.contains("home") {
        home = Some((key, text, FooterTarget::Home));
      } else if name.contains("sitemap") {
        sitemap = Some((key, text, FooterTarget::Sitemap));
      } else {
        legal.push((key, text, FooterTarget::Legal {
          slug: name.to_string(),
        }));
      }
    }
    legal.sort_by(|a, b| a.0.cmp(b.0));

    home
      .into_iter()
      .chain(sitemap)
      .chain(legal)
      .map(|(key, text, target)| {
        FooterLink {
          key: key.clone(),
          text: text.clone(),
          target,
        }
      })
      .collect()
  }

  /// Legal pages linked from the footer.
  #[must_use]
  pub fn legal_links(&self) -> Vec<FooterLink> {
    self
      .footer_links()
      .into_iter()
      .filter(|link| matches!(link.target, FooterTarget::Legal { .. }))
      .collect()
  }

  /// The site's base URL from `site.domain`, normalized.
  #[must_use]
  pub fn domain(&self) -> Option<String> {
    self.get("site.domain").and_then(normalize_domain)
  }
}

/// Placeholder domain shipped in the page templates.
pub const PLACEHOLDER_DOMAIN: &str = "https://votresite.com";

/// Prepend `https://` when the scheme is missing and drop trailing slashes.
#[must_use]
pub fn normalize_domain(raw: &str) -> Option<String> {
  let trimmed = raw.trim().trim_end_matches('/');
  if trimmed.is_empty() || trimmed.starts_with('=') || trimmed.starts_with('#')
  {
    return None;
  }
  if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    Some(trimmed.to_string())
  } else {
    Some(format!("https://{trimmed}"))
  }
}

/// Every usable value of the `site.domain` row, across all columns.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn raw_domain_values(path: &Path) -> Result<Vec<String>, DataError> {
  let file = File::open(path).map_err(|e| DataError::io(path, e))?;
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
  let headers = reader.headers()?.clone();
  let Some(key_index) = headers.iter().position(|h| h.trim() == "key") else {
    return Ok(Vec::new());
  };

  let mut values = Vec::new();
  for record in reader.records() {
    let record = record?;
    if record.get(key_index).map(str::trim) != Some("site.domain") {
      continue;
    }
    for (index, value) in record.iter().enumerate() {
      let value = value.trim();
      if index == key_index
        || value.is_empty()
        || value.starts_with('=')
        || value.starts_with('#')
      {
        continue;
      }
      values.push(value.to_string());
    }
  }
  Ok(values)
}
