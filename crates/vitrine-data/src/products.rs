use std::{
  collections::HashMap,
  fs::{self, File},
  io::Read,
  path::Path,
  sync::LazyLock,
};

use csv::StringRecord;
use log::{debug, info};
use regex::Regex;

use crate::error::DataError;

/// Columns that may have a per-language `{base}_{lang}_auto` variant.
pub const TRANSLATABLE_COLUMNS: &[&str] = &[
  "titre",
  "description",
  "name",
  "description_short",
  "meta_title",
  "meta_description",
];

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\s]+)")
    .expect("Invalid YouTube id regex")
});

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex")
});

/// One row of `all_products.csv`, resolved for a single language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
  /// The id as written in the CSV, possibly with a leading apostrophe.
  pub raw_id:            String,
  /// The id with whitespace and the leading apostrophe removed.
  pub id:                String,
  pub name:              String,
  pub titre:             String,
  pub description:       String,
  pub description_short: String,
  pub meta_title:        String,
  pub meta_description:  String,
  pub price:             String,
  pub image_paths:       Vec<String>,
  pub affiliate_link:    String,
  pub category_id:       String,
  pub youtube_url:       String,
}

impl Product {
  /// Name shown on cards and headings.
  #[must_use]
  pub fn display_name(&self) -> &str {
    if !self.name.is_empty() {
      &self.name
    } else if !self.titre.is_empty() {
      &self.titre
    } else {
      "Product"
    }
  }

  /// Short card title: `titre` when set, else [`Product::card_title`].
  #[must_use]
  pub fn short_title(&self) -> String {
    if !self.titre.is_empty() {
      return strip_html(&self.titre);
    }
    self.card_title()
  }

  /// The display name stripped of markup and cut at a word boundary near
  /// 100 characters.
  #[must_use]
  pub fn card_title(&self) -> String {
    let plain = strip_html(self.display_name());
    if plain.chars().count() <= 100 {
      return plain;
    }
    let cut: String = plain.chars().take(100).collect();
    let cut = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}...", cut.trim_end())
  }

  /// File names of the listed images, directories stripped.
  #[must_use]
  pub fn image_file_names(&self) -> Vec<String> {
    self
      .image_paths
      .iter()
      .filter_map(|path| {
        path
          .rsplit(['/', '\\'])
          .next()
          .filter(|name| !name.is_empty())
          .map(ToString::to_string)
      })
      .collect()
  }

  /// The video id of `youtube_url`, if it is a YouTube watch or short link.
  #[must_use]
  pub fn youtube_id(&self) -> Option<&str> {
    YOUTUBE_ID
      .captures(&self.youtube_url)
      .and_then(|caps| caps.get(1))
      .map(|m| m.as_str())
  }

  #[must_use]
  pub fn has_affiliate_link(&self) -> bool {
    !self.affiliate_link.is_empty()
  }

  /// Stable pseudo review count in `15..=150`.
  ///
  /// Seeded from the last six digits of the id so a product shows the same
  /// count on every page and every build.
  #[must_use]
  pub fn review_count(&self) -> u32 {
    let cleaned = self
      .id
      .replace('.', "")
      .replace("E+", "")
      .replace("e+", "");
    let seed = cleaned
      .len()
      .checked_sub(6)
      .and_then(|start| cleaned.get(start..))
      .and_then(|tail| tail.parse::<u64>().ok())
      .unwrap_or_else(|| fnv1a(self.id.as_bytes()));

    #[allow(
      clippy::cast_possible_truncation,
      reason = "Value is reduced modulo 136 first"
    )]
    let offset = (mix(seed) % 136) as u32;
    15 + offset
  }
}

fn fnv1a(bytes: &[u8]) -> u64 {
  bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
    (hash ^ u64::from(*byte)).wrapping_mul(0x0100_0000_01b3)
  })
}

// splitmix64 finalizer
const fn mix(seed: u64) -> u64 {
  let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
  z ^ (z >> 31)
}

/// Remove tags and collapse whitespace.
#[must_use]
pub fn strip_html(text: &str) -> String {
  let without_tags = HTML_TAG.replace_all(text, " ");
  let decoded = without_tags
    .replace("&nbsp;", " ")
    .replace("&amp;", "&")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'");
  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the spreadsheet text marker from a product id.
#[must_use]
pub fn clean_product_id(raw: &str) -> String {
  raw.trim().trim_start_matches('\'').trim().to_string()
}

/// Products of one language, in CSV order.
#[derive(Debug, Clone, Default)]
pub struct ProductTable {
  products: Vec<Product>,
}

struct Columns {
  id:          usize,
  translated:  HashMap<&'static str, Vec<usize>>,
  price:       Option<usize>,
  images:      Option<usize>,
  affiliate:   Option<usize>,
  category:    Option<usize>,
  youtube_url: Option<usize>,
}

impl Columns {
  fn resolve(headers: &StringRecord, language: &str) -> Option<Self> {
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let translated = TRANSLATABLE_COLUMNS
      .iter()
      .map(|base| {
        let candidates =
          [format!("{base}_{language}_auto"), (*base).to_string()];
        let indices = candidates.iter().filter_map(|c| position(c)).collect();
        (*base, indices)
      })
      .collect();

    Some(Self {
      id: position("product_id")?,
      translated,
      price: position("price"),
      images: position("image_paths"),
      affiliate: position("affiliate_links")
        .or_else(|| position("affiliate_link")),
      category: position("category_id"),
      youtube_url: position("youtube_url"),
    })
  }

  fn text(record: &StringRecord, index: Option<usize>) -> String {
    index
      .and_then(|i| record.get(i))
      .map(str::trim)
      .unwrap_or_default()
      .to_string()
  }

  /// First usable value among the language variants of `base`.
  fn translated(&self, record: &StringRecord, base: &str) -> String {
    self
      .translated
      .get(base)
      .into_iter()
      .flatten()
      .filter_map(|i| record.get(*i).map(str::trim))
      .find(|value| !value.is_empty() && !value.starts_with('='))
      .unwrap_or_default()
      .to_string()
  }

  fn product(&self, record: &StringRecord) -> Option<Product> {
    let raw_id = record.get(self.id)?.trim().to_string();
    let id = clean_product_id(&raw_id);
    if id.is_empty() {
      return None;
    }

    Some(Product {
      raw_id,
      id,
      name: self.translated(record, "name"),
      titre: self.translated(record, "titre"),
      description: self.translated(record, "description"),
      description_short: self.translated(record, "description_short"),
      meta_title: self.translated(record, "meta_title"),
      meta_description: self.translated(record, "meta_description"),
      price: Self::text(record, self.price),
      image_paths: Self::text(record, self.images)
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect(),
      affiliate_link: Self::text(record, self.affiliate),
      category_id: Self::text(record, self.category),
      youtube_url: Self::text(record, self.youtube_url),
    })
  }
}

impl ProductTable {
  /// Load the product table for `language`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be opened, is not valid CSV, or has
  /// no `product_id` column.
  pub fn load(path: &Path, language: &str) -> Result<Self, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let table = Self::from_reader(file, language).map_err(|e| {
      match e {
        DataError::MissingColumn { column, .. } => {
          DataError::MissingColumn {
            column,
            path: path.to_path_buf(),
          }
        },
        other => other,
      }
    })?;
    debug!("Loaded {} products from {}", table.len(), path.display());
    Ok(table)
  }

  /// Parse products from any CSV source.
  ///
  /// # Errors
  ///
  /// Returns an error if the CSV cannot be parsed or lacks `product_id`.
  pub fn from_reader<R: Read>(
    reader: R,
    language: &str,
  ) -> Result<Self, DataError> {
    let mut reader =
      csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers, language).ok_or_else(|| {
      DataError::MissingColumn {
        column: "product_id".to_string(),
        path:   "<reader>".into(),
      }
    })?;

    let mut products = Vec::new();
    for record in reader.records() {
      if let Some(product) = columns.product(&record?) {
        products.push(product);
      }
    }
    Ok(Self { products })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.products.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.products.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Product> {
    self.products.iter()
  }

  /// First product with the given clean id.
  #[must_use]
  pub fn find(&self, id: &str) -> Option<&Product> {
    self.products.iter().find(|p| p.id == id)
  }

  /// Products whose `category_id` equals the category number.
  #[must_use]
  pub fn in_category(&self, number: usize) -> Vec<&Product> {
    let wanted = number.to_string();
    self
      .products
      .iter()
      .filter(|p| p.category_id == wanted)
      .collect()
  }

  /// Products that get a dedicated page.
  pub fn with_affiliate_link(&self) -> impl Iterator<Item = &Product> {
    self.products.iter().filter(|p| p.has_affiliate_link())
  }

  /// The `limit` products with the highest review count, ties kept in CSV
  /// order.
  #[must_use]
  pub fn best_sellers(&self, limit: usize) -> Vec<&Product> {
    let mut ranked: Vec<&Product> = self.with_affiliate_link().collect();
    ranked.sort_by_key(|p| std::cmp::Reverse(p.review_count()));
    ranked.truncate(limit);
    ranked
  }
}

impl<'a> IntoIterator for &'a ProductTable {
  type Item = &'a Product;
  type IntoIter = std::slice::Iter<'a, Product>;

  fn into_iter(self) -> Self::IntoIter {
    self.products.iter()
  }
}

/// Suffix of the backup written before the CSV is rewritten.
pub const YOUTUBE_BACKUP_SUFFIX: &str = "backup_youtube";

/// Write the `youtube_url` of a single product back into the CSV.
///
/// # Errors
///
/// Returns an error if the CSV cannot be rewritten or the product is not in
/// it.
pub fn set_youtube_url(
  path: &Path,
  product_id: &str,
  url: &str,
) -> Result<(), DataError> {
  let mut urls = HashMap::new();
  urls.insert(clean_product_id(product_id), url.to_string());
  let update = update_youtube_urls(path, &urls)?;
  if update.matched == 0 {
    return Err(DataError::ProductNotFound(product_id.to_string()));
  }
  Ok(())
}

/// Write several `youtube_url` values back into the CSV at once.
///
/// The column is appended when missing. The original file is copied to
/// `all_products.csv.backup_youtube` before it is replaced. Returns the number
/// of rows whose value changed; the file is left alone when that is zero.
///
/// # Errors
///
/// Returns an error if reading, backing up, or writing the CSV fails.
pub fn set_youtube_urls(
  path: &Path,
  urls: &HashMap<String, String>,
) -> Result<usize, DataError> {
  update_youtube_urls(path, urls).map(|update| update.changed)
}

/// Rows of a `youtube_url` update that carried a requested id, and those
/// among them whose value changed.
struct YoutubeUpdate {
  matched: usize,
  changed: usize,
}

fn update_youtube_urls(
  path: &Path,
  urls: &HashMap<String, String>,
) -> Result<YoutubeUpdate, DataError> {
  let (mut headers, mut records) = read_records(path)?;
  let Some(id_index) = headers.iter().position(|h| h.trim() == "product_id")
  else {
    return Err(DataError::MissingColumn {
      column: "product_id".to_string(),
      path:   path.to_path_buf(),
    });
  };

  let url_index = match headers.iter().position(|h| h.trim() == "youtube_url") {
    Some(index) => index,
    None => {
      headers.push_field("youtube_url");
      headers.len() - 1
    },
  };

  let mut matched = 0;
  let mut changed = 0;
  for record in &mut records {
    let Some(url) = record
      .get(id_index)
      .map(clean_product_id)
      .and_then(|id| urls.get(&id))
    else {
      continue;
    };
    matched += 1;
    if record.get(url_index).map(str::trim) == Some(url.as_str()) {
      continue;
    }
    *record = with_field(record, url_index, url);
    changed += 1;
  }

  if changed > 0 {
    let backup = path.with_extension(format!("csv.{YOUTUBE_BACKUP_SUFFIX}"));
    fs::copy(path, &backup).map_err(|e| DataError::io(&backup, e))?;
    write_records(path, &headers, &records)?;
    info!(
      "Updated {changed} youtube_url value(s) in {} (backup: {})",
      path.display(),
      backup.display()
    );
  }
  Ok(YoutubeUpdate { matched, changed })
}

/// Read a CSV file into its header and records.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_records(
  path: &Path,
) -> Result<(StringRecord, Vec<StringRecord>), DataError> {
  let file = File::open(path).map_err(|e| DataError::io(path, e))?;
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
  let headers = reader.headers()?.clone();
  let records = reader.records().collect::<Result<Vec<_>, _>>()?;
  Ok((headers, records))
}

/// Write a header and records to a CSV file, replacing it.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_records(
  path: &Path,
  headers: &StringRecord,
  records: &[StringRecord],
) -> Result<(), DataError> {
  let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
  writer.write_record(headers)?;
  for record in records {
    writer.write_record(record)?;
  }
  writer.flush().map_err(|e| DataError::io(path, e))?;
  Ok(())
}

/// Copy of `record` with field `index` set to `value`, padding short rows.
#[must_use]
pub fn with_field(
  record: &StringRecord,
  index: usize,
  value: &str,
) -> StringRecord {
  let mut fields: Vec<&str> = record.iter().collect();
  if fields.len() <= index {
    fields.resize(index + 1, "");
  }
  let mut updated = StringRecord::new();
  for (i, field) in fields.into_iter().enumerate() {
    updated.push_field(if i == index { value } else { field });
  }
  updated
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  const CSV: &str = "product_id,name,name_fr_auto,titre,description,price,image_paths,affiliate_links,category_id,youtube_url\n\
'1005001234567890,Camping Tent,Tente de camping,,<p>Great tent</p>,19.99,/abs/path/image_1.jpg|image_2.jpg,https://s.click.aliexpress.com/e/abc,1,https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1\n\
 2000,,,Short Titre,,,,,2,\n\
,Orphan,,,,,,,1,\n";

  #[test]
  fn test_load_resolves_language_columns() {
    let fr = ProductTable::from_reader(CSV.as_bytes(), "fr").unwrap();
    assert_eq!(fr.len(), 2);
    let tent = fr.find("1005001234567890").unwrap();
    assert_eq!(tent.raw_id, "'1005001234567890");
    assert_eq!(tent.display_name(), "Tente de camping");

    let en = ProductTable::from_reader(CSV.as_bytes(), "en").unwrap();
    assert_eq!(en.find("1005001234567890").unwrap().name, "Camping Tent");
  }

  #[test]
  fn test_product_accessors() {
    let table = ProductTable::from_reader(CSV.as_bytes(), "en").unwrap();
    let tent = table.find("1005001234567890").unwrap();
    assert_eq!(tent.image_file_names(), vec!["image_1.jpg", "image_2.jpg"]);
    assert_eq!(tent.youtube_id(), Some("dQw4w9WgXcQ"));
    assert!(tent.has_affiliate_link());

    let other = table.find("2000").unwrap();
    assert_eq!(other.display_name(), "Short Titre");
    assert_eq!(other.youtube_id(), None);
    assert!(!other.has_affiliate_link());
  }

  #[test]
  fn test_youtube_id_short_link() {
    let product = Product {
      youtube_url: "https://youtu.be/abc123".to_string(),
      ..Default::default()
    };
    assert_eq!(product.youtube_id(), Some("abc123"));
  }

  #[test]
  fn test_review_count_is_stable_and_bounded() {
    for id in ["1005001234567890", "42", "abcdefgh", "1.0050012E+15", ""] {
      let product = Product {
        id: id.to_string(),
        ..Default::default()
      };
      let count = product.review_count();
      assert!((15..=150).contains(&count), "{id} gave {count}");
      assert_eq!(count, product.review_count());
    }
  }

  #[test]
  fn test_review_count_uses_last_six_digits() {
    let a = Product {
      id: "999123456".to_string(),
      ..Default::default()
    };
    let b = Product {
      id: "111123456".to_string(),
      ..Default::default()
    };
    assert_eq!(a.review_count(), b.review_count());
  }

  #[test]
  fn test_short_title_truncates_on_word_boundary() {
    let product = Product {
      name: format!("<b>{}</b>", "word ".repeat(40)),
      ..Default::default()
    };
    let title = product.short_title();
    assert!(title.ends_with("..."));
    assert!(title.chars().count() <= 103);
    assert!(!title.contains('<'));
    assert!(!title.trim_end_matches("...").ends_with(' '));
  }

  #[test]
  fn test_card_title_prefers_name_over_titre() {
    let product = Product {
      name: "Full <i>Name</i>".to_string(),
      titre: "Short".to_string(),
      ..Default::default()
    };
    assert_eq!(product.card_title(), "Full Name");
    assert_eq!(product.short_title(), "Short");

    let untitled = Product {
      titre: "Only titre".to_string(),
      ..Default::default()
    };
    assert_eq!(untitled.card_title(), "Only titre");
  }

  #[test]
  fn test_in_category_and_best_sellers() {
    let table = ProductTable::from_reader(CSV.as_bytes(), "en").unwrap();
    assert_eq!(table.in_category(1).len(), 1);
    assert_eq!(table.in_category(3).len(), 0);
    // Only products with an affiliate link are ranked
    assert_eq!(table.best_sellers(5).len(), 1);
    assert_eq!(table.best_sellers(0).len(), 0);
  }

  #[test]
  fn test_strip_html() {
    assert_eq!(strip_html("<p>Hello&nbsp;<b>world</b></p>"), "Hello world");
    assert_eq!(strip_html("a &amp; b"), "a & b");
  }

  #[test]
  fn test_set_youtube_url_adds_column_and_backup() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let path = dir.path().join("all_products.csv");
    fs::write(&path, "product_id,name\n'111,A\n222,B\n").unwrap();

    set_youtube_url(&path, "111", "https://youtu.be/x").unwrap();

    let backup = dir.path().join("all_products.csv.backup_youtube");
    assert_eq!(
      fs::read_to_string(&backup).unwrap(),
      "product_id,name\n'111,A\n222,B\n"
    );
    let table = ProductTable::load(&path, "en").unwrap();
    assert_eq!(table.find("111").unwrap().youtube_url, "https://youtu.be/x");
    assert_eq!(table.find("222").unwrap().youtube_url, "");
    assert_eq!(table.find("111").unwrap().raw_id, "'111");
  }

  #[test]
  fn test_set_youtube_url_same_value_is_ok() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let path = dir.path().join("all_products.csv");
    fs::write(&path, "product_id,name,youtube_url\n111,A,https://youtu.be/x\n")
      .unwrap();

    set_youtube_url(&path, "111", "https://youtu.be/x").unwrap();
    assert!(!dir.path().join("all_products.csv.backup_youtube").exists());
  }

  #[test]
  fn test_set_youtube_url_unknown_product() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    let path = dir.path().join("all_products.csv");
    fs::write(&path, "product_id,name\n111,A\n").unwrap();
    assert!(matches!(
      set_youtube_url(&path, "999", "https://youtu.be/x"),
      Err(DataError::ProductNotFound(_))
    ));
  }
}
