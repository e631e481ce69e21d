#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]

use std::fs;

use vitrine::pipeline;
use vitrine_config::Config;
use vitrine_html::Stage;

const TRANSLATIONS: &str = "\
key,en,fr
site.domain,shop.test,shop.test
site.meta.title,Camping Shop,Boutique Camping
menu.1,Tents,Tentes
footer.link.privacy,Privacy,Confidentialite
legal.privacy.content,We keep nothing.,Rien.
";

const PRODUCTS: &str = "\
product_id,name,description,price,image_paths,affiliate_links,category_id
1005001,Dome tent,<p>Two people</p>,49.99,a.jpg,https://s.click.aliexpress.com/e/x,1
";

fn site(translations: &[(&str, &str)]) -> (tempfile::TempDir, Config) {
  let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
  let config = Config {
    site_root: dir.path().to_path_buf(),
    ..Config::default()
  };
  for (code, table) in translations {
    let lang_dir = if *code == "en" {
      dir.path().to_path_buf()
    } else {
      dir.path().join(code)
    };
    fs::create_dir_all(lang_dir.join("CSV")).unwrap();
    fs::write(lang_dir.join("translations.csv"), table).unwrap();
    fs::write(lang_dir.join("CSV").join("all_products.csv"), PRODUCTS)
      .unwrap();
    fs::write(lang_dir.join("index.html"), vitrine_templates::INDEX_TEMPLATE)
      .unwrap();
  }
  (dir, config)
}

#[test]
fn test_all_builds_rewrites_and_writes_sitemaps() {
  let (dir, config) = site(&[("en", TRANSLATIONS), ("fr", TRANSLATIONS)]);
  let languages = pipeline::discover(&config).unwrap();
  let codes: Vec<&str> = languages.iter().map(|s| s.code.as_str()).collect();
  assert_eq!(codes, ["en", "fr"]);

  let selected = pipeline::select(&languages, &[]).unwrap();
  pipeline::all(&config, &languages, &selected).unwrap();

  let index = fs::read_to_string(dir.path().join("fr").join("index.html"))
    .unwrap();
  assert!(!index.contains("https://votresite.com"));
  assert!(index.contains("https://shop.test/fr"));
  assert!(
    dir
      .path()
      .join("fr/page_html/products/produit-1005001.html")
      .is_file()
  );

  let sitemap = fs::read_to_string(dir.path().join("sitemap-fr.xml")).unwrap();
  assert!(
    sitemap.contains("https://shop.test/fr/page_html/legal/privacy.html")
  );
  let root = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
  assert!(root.contains("<sitemapindex"));
  assert!(root.contains("sitemap-en.xml"));

  assert_eq!(pipeline::check(&languages).unwrap(), "https://shop.test");
}

#[test]
fn test_build_only_some_stages() {
  let (dir, config) = site(&[("en", TRANSLATIONS)]);
  let languages = pipeline::discover(&config).unwrap();
  let selected = pipeline::select(&languages, &["EN".to_string()]).unwrap();

  let summary =
    pipeline::build(&config, &languages, &selected, &[Stage::Legal]).unwrap();
  assert!(summary.is_success());
  assert_eq!(summary.languages.len(), 1);
  assert!(summary.languages[0].domain.is_none());
  assert!(dir.path().join("page_html/legal/privacy.html").is_file());
  assert!(!dir.path().join("page_html/products").exists());
}

#[test]
fn test_unknown_language_is_rejected() {
  let (_dir, config) = site(&[("en", TRANSLATIONS)]);
  let languages = pipeline::discover(&config).unwrap();
  let err = pipeline::select(&languages, &["de".to_string()]).unwrap_err();
  assert!(err.to_string().contains("available: en"));
}

#[test]
fn test_broken_language_fails_the_build() {
  let (dir, config) = site(&[("en", TRANSLATIONS), ("fr", TRANSLATIONS)]);
  fs::write(
    dir.path().join("fr/CSV/all_products.csv"),
    "name,price\nTent,1\n",
  )
  .unwrap();

  let languages = pipeline::discover(&config).unwrap();
  let selected = pipeline::select(&languages, &[]).unwrap();
  let summary = pipeline::build(&config, &languages, &selected, &[]).unwrap();
  assert_eq!(summary.failed(), ["fr"]);
  assert!(pipeline::ensure_success(&summary).is_err());
  assert!(dir.path().join("page_html/legal/privacy.html").is_file());
}

#[test]
fn test_domain_check_reports_mismatch() {
  let other = TRANSLATIONS.replace("shop.test,shop.test", "other.test,x");
  let (_dir, config) = site(&[("en", TRANSLATIONS), ("de", &other)]);
  let languages = pipeline::discover(&config).unwrap();
  assert!(pipeline::check(&languages).is_err());
}
