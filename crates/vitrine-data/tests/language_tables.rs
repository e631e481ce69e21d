#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::{collections::HashMap, fs};

use tempfile::TempDir;
use vitrine_config::Config;
use vitrine_data::{
  FooterTarget,
  ProductTable,
  TranslationTable,
  discover_languages,
  products::set_youtube_urls,
};

fn write_language(root: &std::path::Path, code: Option<&str>) {
  let dir = code.map_or_else(|| root.to_path_buf(), |c| root.join(c));
  fs::create_dir_all(dir.join("CSV")).expect("Failed to create CSV dir");
  fs::write(dir.join("index.html"), "<html><body></body></html>")
    .expect("Failed to write index");
  fs::write(
    dir.join("translations.csv"),
    "key,en,fr_auto\n\
     menu.1,Tents,Tentes\n\
     menu.2,Sleeping,Couchage\n\
     footer.link.home,Home,Accueil\n\
     footer.link.legal-notice,Legal notice,Mentions légales\n\
     site.domain,shop.example,shop.example\n",
  )
  .expect("Failed to write translations");
  fs::write(
    dir.join("CSV/all_products.csv"),
    "product_id,name,name_fr_auto,affiliate_links,category_id\n\
     '100200300400,Tent,Tente,https://a.aliexpress.com/x,1\n\
     100200300401,Mat,Matelas,,2\n",
  )
  .expect("Failed to write products");
}

#[test]
fn test_each_language_reads_its_own_columns() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  let root = temp_dir.path();
  write_language(root, None);
  write_language(root, Some("fr"));

  let config = Config {
    site_root: root.to_path_buf(),
    ..Default::default()
  };
  let sites = discover_languages(&config).expect("Failed to discover");
  assert_eq!(sites.len(), 2);

  let fr = &sites[1];
  let translations =
    TranslationTable::load(&fr.translations_path(), &fr.code).unwrap();
  let menu = translations.menu_entries();
  assert_eq!(menu[0].text, "Tentes");
  assert_eq!(translations.domain().as_deref(), Some("https://shop.example"));

  let links = translations.footer_links();
  assert_eq!(links[0].target, FooterTarget::Home);
  assert_eq!(links[1].target, FooterTarget::Legal {
    slug: "legal-notice".to_string(),
  });

  let products = ProductTable::load(&fr.products_csv(), &fr.code).unwrap();
  assert_eq!(products.find("100200300400").unwrap().display_name(), "Tente");
  assert_eq!(products.with_affiliate_link().count(), 1);
  assert_eq!(products.in_category(2).len(), 1);
}

#[test]
fn test_youtube_urls_round_trip_through_csv() {
  let temp_dir = TempDir::new().expect("Failed to create temp dir");
  write_language(temp_dir.path(), None);
  let csv = temp_dir.path().join("CSV/all_products.csv");

  let urls: HashMap<String, String> = [
    ("100200300400".to_string(), "https://youtu.be/aaa".to_string()),
    ("missing".to_string(), "https://youtu.be/bbb".to_string()),
  ]
  .into_iter()
  .collect();
  assert_eq!(set_youtube_urls(&csv, &urls).unwrap(), 1);
  // Second run changes nothing
  assert_eq!(set_youtube_urls(&csv, &urls).unwrap(), 0);

  let products = ProductTable::load(&csv, "en").unwrap();
  assert_eq!(
    products.find("100200300400").unwrap().youtube_id(),
    Some("aaa")
  );
}
