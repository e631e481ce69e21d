//! Spreadsheet column additions used when scaffolding a new language.
//!
//! The CSV files round-trip through a spreadsheet, so new language columns are
//! filled with `GOOGLETRANSLATE` formulas pointing at the source cell.

use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::{
  error::DataError,
  products::{TRANSLATABLE_COLUMNS, read_records, with_field, write_records},
};

/// Spreadsheet column name for a zero-based index (`0` is `A`, `26` is `AA`).
#[must_use]
pub fn column_letter(index: usize) -> String {
  let mut n = index + 1;
  let mut letters = Vec::new();
  while n > 0 {
    let rem = (n - 1) % 26;
    #[allow(clippy::cast_possible_truncation, reason = "rem is below 26")]
    letters.push(char::from(b'A' + rem as u8));
    n = (n - 1) / 26;
  }
  letters.iter().rev().collect()
}

fn translate_formula(
  column: usize,
  row: usize,
  source: &str,
  target: &str,
) -> String {
  format!(
    "=GOOGLETRANSLATE({}{row};\"{source}\";\"{target}\")",
    column_letter(column)
  )
}

fn insert_column(
  record: &StringRecord,
  at: usize,
  value: &str,
) -> StringRecord {
  let mut fields: Vec<&str> = record.iter().collect();
  if fields.len() < at {
    fields.resize(at, "");
  }
  fields.insert(at, value);
  fields.into_iter().collect()
}

fn position(headers: &StringRecord, name: &str) -> Option<usize> {
  headers.iter().position(|h| h.trim() == name)
}

// Cells the scaffold may overwrite: empty, plain text, or an older formula.
fn replaceable(value: &str) -> bool {
  value.is_empty()
    || !value.starts_with('=')
    || value.starts_with("=GOOGLETRANSLATE")
}

/// Add a `{target}_auto` column of translate formulas to a translation table.
///
/// The column is inserted after `{source}_auto` or `{source}` (falling back to
/// `en`). An existing `{target}_auto` column is reused.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or written.
pub fn add_translation_column(
  path: &Path,
  source: &str,
  target: &str,
) -> Result<(), DataError> {
  let (mut headers, mut records) = read_records(path)?;
  let target_column = format!("{target}_auto");

  let source_index =
    position(&headers, source).or_else(|| position(&headers, "en"));
  let target_index = if let Some(index) = position(&headers, &target_column) {
    index
  } else {
    let at = position(&headers, &format!("{source}_auto"))
      .or(source_index)
      .map_or(headers.len(), |i| i + 1);
    headers = insert_column(&headers, at, &target_column);
    records = records
      .iter()
      .map(|record| insert_column(record, at, ""))
      .collect();
    at
  };

  // Insertion happens after the source column, so its index is unchanged.
  let source_index = source_index.unwrap_or(1);
  for (offset, record) in records.iter_mut().enumerate() {
    let current = record.get(target_index).unwrap_or("").trim();
    if !replaceable(current) {
      continue;
    }
    let formula = translate_formula(source_index, offset + 2, source, target);
    *record = with_field(record, target_index, &formula);
  }

  write_records(path, &headers, &records)?;
  info!("Added column {target_column} to {}", path.display());
  Ok(())
}

/// Add `{base}_{target}_auto` formula columns to a product table.
///
/// Reads `source_path`, writes `dest_path`. Each new column is placed after the
/// last existing `{base}_*_auto` column, or after `{base}` itself. Product ids
/// gain a leading apostrophe so spreadsheets keep them as text.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or written.
pub fn add_product_columns(
  source_path: &Path,
  dest_path: &Path,
  source: &str,
  target: &str,
) -> Result<(), DataError> {
  let (original_headers, mut records) = read_records(source_path)?;
  let mut headers = original_headers.clone();

  for base in TRANSLATABLE_COLUMNS {
    let column = format!("{base}_{target}_auto");
    if position(&headers, &column).is_some() {
      continue;
    }
    let prefix = format!("{base}_");
    let mut at = None;
    for (index, header) in headers.iter().enumerate() {
      if header.starts_with(&prefix) && header.ends_with("_auto") {
        at = Some(index + 1);
      } else if header == *base && at.is_none() {
        at = Some(index + 1);
      }
    }
    let at = at.unwrap_or(headers.len());
    headers = insert_column(&headers, at, &column);
    records = records
      .iter()
      .map(|record| insert_column(record, at, ""))
      .collect();
  }

  let id_index = position(&headers, "product_id");
  for (offset, record) in records.iter_mut().enumerate() {
    let row = offset + 2;

    if let Some(id_index) = id_index {
      let id = record.get(id_index).unwrap_or("").trim().to_string();
      if !id.is_empty() && !id.starts_with('\'') {
        *record = with_field(record, id_index, &format!("'{id}"));
      }
    }

    for base in TRANSLATABLE_COLUMNS {
      let Some(target_index) =
        position(&headers, &format!("{base}_{target}_auto"))
      else {
        continue;
      };
      let source_auto = format!("{base}_{source}_auto");
      let source_index = [source_auto.as_str(), *base]
        .into_iter()
        .filter(|name| position(&original_headers, name).is_some())
        .filter_map(|name| position(&headers, name))
        .find(|i| record.get(*i).is_some_and(|v| !v.trim().is_empty()));
      let Some(source_index) = source_index else {
        continue;
      };
      if !replaceable(record.get(target_index).unwrap_or("").trim()) {
        continue;
      }
      let formula = translate_formula(source_index, row, source, target);
      *record = with_field(record, target_index, &formula);
    }
  }

  write_records(dest_path, &headers, &records)?;
  info!(
    "Wrote {} with {target} translation columns",
    dest_path.display()
  );
  Ok(())
}
