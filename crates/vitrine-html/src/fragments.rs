//! Tera partials that render the dynamic regions of a page.
//!
//! Each partial can be overridden by a file of the same name in the configured
//! template directory.

use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tera::Tera;
use vitrine_config::Config;
use vitrine_data::{Product, TranslationTable};
use vitrine_templates as templates;

use crate::links::PageKind;

#[derive(Debug, Clone, Serialize)]
pub struct Link {
  pub url:  String,
  pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
  pub page_url:      String,
  pub image_url:     String,
  pub title:         String,
  pub review_count:  u32,
  pub affiliate_url: String,
  pub cta_text:      String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCard {
  pub url:       String,
  pub image_url: String,
  pub name:      String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
  pub title:       String,
  pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stat {
  pub number: String,
  pub label:  String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Faq {
  pub question: String,
  pub answer:   String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
  pub name:   String,
  pub text:   String,
  pub avatar: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alternate {
  pub lang: String,
  pub url:  String,
}

/// Everything the product detail partial needs.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
  pub main_image:        String,
  pub title:             String,
  pub youtube_id:        Option<String>,
  pub show_thumbnails:   bool,
  pub images:            Vec<String>,
  pub price:             String,
  pub description_short: String,
  pub review_count:      u32,
  pub affiliate_url:     String,
  pub cta_text:          String,
  pub description_long:  String,
}

pub const DEFAULT_CTA: &str = "View on AliExpress";
pub const EMPTY_CATEGORY: &str = "No products available for this category.";

/// Read a template override from the template directory, or use the
/// embedded default.
///
/// # Errors
///
/// Returns an error if an override exists but cannot be read.
pub fn load_template_content(
  config: &Config,
  name: &str,
  fallback: &str,
) -> Result<String> {
  if let Some(path) = config.get_template_file(name)
    && path.exists()
  {
    return fs::read_to_string(&path).wrap_err_with(|| {
      format!("Failed to read template file: {}", path.display())
    });
  }
  Ok(fallback.to_string())
}

/// Source of a page template: the language's own copy under
/// `page_html/templates/`, then the template directory, then the embedded
/// default.
///
/// # Errors
///
/// Returns an error if an existing template file cannot be read.
pub fn load_page_template(
  config: &Config,
  site_template: &Path,
  name: &str,
  fallback: &str,
) -> Result<String> {
  if site_template.is_file() {
    return fs::read_to_string(site_template).wrap_err_with(|| {
      format!("Failed to read template file: {}", site_template.display())
    });
  }
  load_template_content(config, name, fallback)
}

/// Renderer for every partial, built once per language.
pub struct Fragments {
  tera: Tera,
}

impl Fragments {
  /// Register the partials, preferring overrides from the template directory.
  ///
  /// # Errors
  ///
  /// Returns an error if an override cannot be read or does not parse.
  pub fn new(config: &Config) -> Result<Self> {
    let mut tera = Tera::default();
    for (name, fallback) in templates::partials() {
      let content = load_template_content(config, name, fallback)?;
      tera
        .add_raw_template(name, &content)
        .wrap_err_with(|| format!("Failed to parse template {name}"))?;
    }
    Ok(Self { tera })
  }

  fn render(&self, name: &str, context: &tera::Context) -> Result<String> {
    self
      .tera
      .render(name, context)
      .wrap_err_with(|| format!("Failed to render {name}"))
  }

  /// Menu items, home first, texts uppercased.
  ///
  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn menu(&self, items: &[Link]) -> Result<String> {
    let items: Vec<Link> = items
      .iter()
      .map(|item| {
        Link {
          url:  item.url.clone(),
          text: item.text.to_uppercase(),
        }
      })
      .collect();
    let mut context = tera::Context::new();
    context.insert("items", &items);
    self.render("menu.html", &context)
  }

  /// Footer links followed by the contact and copyright lines.
  ///
  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn footer(
    &self,
    links: &[Link],
    translations: &TranslationTable,
  ) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("links", links);
    context.insert(
      "contact_text",
      translations.get_or("footer.contact", "Contact us:"),
    );
    context.insert("contact_email", &translations.get("site.contact.email"));
    context.insert("copyright", &copyright(translations));
    self.render("footer.html", &context)
  }

  /// Product cards, or the empty-category placeholder.
  ///
  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn product_cards(
    &self,
    cards: &[ProductCard],
    empty_text: &str,
  ) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("cards", cards);
    context.insert("empty_text", empty_text);
    self.render("product_cards.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn product_detail(&self, detail: &ProductDetail) -> Result<String> {
    let context = tera::Context::from_serialize(detail)
      .wrap_err("Failed to build product detail context")?;
    self.render("product_detail.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn category_cards(&self, cards: &[CategoryCard]) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("cards", cards);
    self.render("category_cards.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn category_description(&self, content: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("content", content);
    self.render("category_description.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn features(&self, features: &[Feature]) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("features", features);
    self.render("features.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn stats(&self, stats: &[Stat]) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("stats", stats);
    self.render("stats.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn faq(&self, items: &[Faq]) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("items", items);
    self.render("faq.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn testimonials(&self, items: &[Testimonial]) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("items", items);
    self.render("testimonials.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn presentation(
    &self,
    title: &str,
    paragraphs: &[&str],
  ) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("title", title);
    context.insert("paragraphs", paragraphs);
    self.render("presentation.html", &context)
  }

  /// Legal page section. `body` is trusted HTML.
  ///
  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn legal(&self, title: &str, body: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("title", title);
    context.insert("body", body);
    self.render("legal.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn head_links(
    &self,
    canonical: &str,
    alternates: &[Alternate],
  ) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("canonical", canonical);
    context.insert("alternates", alternates);
    self.render("head_links.html", &context)
  }

  /// # Errors
  ///
  /// Returns an error if the partial fails to render.
  pub fn analytics(&self, id: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("id", id);
    self.render("analytics.html", &context)
  }
}

/// `footer.copyright`, or a default stamped with the current year.
#[must_use]
pub fn copyright(translations: &TranslationTable) -> String {
  translations.get("footer.copyright").map_or_else(
    || {
      let year = jiff::Zoned::now().year();
      format!("© {year} AliExpress Affiliate. All rights reserved.")
    },
    ToString::to_string,
  )
}

/// Menu links for a page: home first, then every category.
#[must_use]
pub fn menu_links(
  kind: PageKind,
  translations: &TranslationTable,
  home_text: &str,
) -> Vec<Link> {
  std::iter::once(Link {
    url:  kind.home().to_string(),
    text: home_text.to_string(),
  })
  .chain(translations.menu_entries().iter().map(|entry| {
    Link {
      url:  kind.menu_url(entry),
      text: entry.text.clone(),
    }
  }))
  .collect()
}

/// Footer links for a page, in footer order.
#[must_use]
pub fn footer_links(
  kind: PageKind,
  translations: &TranslationTable,
) -> Vec<Link> {
  translations
    .footer_links()
    .iter()
    .map(|link| {
      Link {
        url:  kind.footer_url(link),
        text: link.text.clone(),
      }
    })
    .collect()
}

/// Card data for one product as seen from a page of `kind`.
#[must_use]
pub fn product_card(
  kind: PageKind,
  images_prefix: &str,
  product: &Product,
  title: String,
  cta_text: &str,
) -> ProductCard {
  let image = product
    .image_file_names()
    .into_iter()
    .next()
    .unwrap_or_else(|| "image_1.jpg".to_string());
  let affiliate_url = if product.affiliate_link.is_empty() {
    "#".to_string()
  } else {
    product.affiliate_link.clone()
  };

  ProductCard {
    page_url: kind.product(&product.id),
    image_url: format!("{images_prefix}products/{}/{image}", product.id),
    title,
    review_count: product.review_count(),
    affiliate_url,
    cta_text: cta_text.to_string(),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  fn translations() -> TranslationTable {
    TranslationTable::from_entries("en", [
      ("menu.1", "Tents"),
      ("menu.2", "Bags & Packs"),
      ("footer.link.home", "Home"),
      ("footer.link.sitemap", "Sitemap"),
      ("footer.link.privacy", "Privacy"),
      ("footer.copyright", "© Shop"),
      ("site.contact.email", "hi@shop.test"),
    ])
  }

  #[test]
  fn test_menu_is_uppercased_and_escaped() {
    let fragments = Fragments::new(&Config::default()).unwrap();
    let links = menu_links(PageKind::Category, &translations(), "Home");
    let html = fragments.menu(&links).unwrap();
    assert!(html.contains("HOME"));
    assert!(html.contains("BAGS &amp; PACKS"));
    assert_eq!(html.matches("<li>").count(), 3);
  }

  #[test]
  fn test_footer_includes_contact_and_copyright() {
    let fragments = Fragments::new(&Config::default()).unwrap();
    let table = translations();
    let links = footer_links(PageKind::Legal, &table);
    assert_eq!(links[0].url, "../../");
    assert_eq!(links[1].url, "../../sitemap.xml");
    assert_eq!(links[2].url, "privacy.html");

    let html = fragments.footer(&links, &table).unwrap();
    assert!(html.contains("footer-links"));
    assert!(html.contains("Contact us:"));
    assert!(html.contains("hi@shop.test"));
    assert!(html.contains("© Shop"));
  }

  #[test]
  fn test_footer_without_email_omits_contact() {
    let fragments = Fragments::new(&Config::default()).unwrap();
    let table = TranslationTable::from_entries("en", [("footer.link.home", "Home")]);
    let html = fragments.footer(&[], &table).unwrap();
    assert!(!html.contains("mailto:"));
    assert!(html.contains("All rights reserved."));
  }

  #[test]
  fn test_product_cards_and_placeholder() {
    let fragments = Fragments::new(&Config::default()).unwrap();
    let empty = fragments.product_cards(&[], EMPTY_CATEGORY).unwrap();
    assert!(empty.contains(r#"<div class="loading">"#));

    let product = Product {
      id: "123456".to_string(),
      name: "Tent".to_string(),
      ..Default::default()
    };
    let card = product_card(
      PageKind::Category,
      "../../../images/",
      &product,
      product.display_name().to_string(),
      DEFAULT_CTA,
    );
    assert_eq!(card.image_url, "../../../images/products/123456/image_1.jpg");
    assert_eq!(card.affiliate_url, "#");
    let html = fragments.product_cards(&[card], EMPTY_CATEGORY).unwrap();
    assert!(html.contains("product-card"));
    assert!(!html.contains("loading"));
  }

  #[test]
  fn test_template_override() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir in test");
    fs::write(
      dir.path().join("menu.html"),
      "{% for item in items %}<li class=\"custom\">{{ item.text }}</li>{% endfor %}",
    )
    .unwrap();
    let config = Config {
      template_dir: Some(dir.path().to_path_buf()),
      ..Default::default()
    };
    let fragments = Fragments::new(&config).unwrap();
    let html = fragments
      .menu(&[Link {
        url:  "/".to_string(),
        text: "home".to_string(),
      }])
      .unwrap();
    assert_eq!(html, r#"<li class="custom">HOME</li>"#);
  }
}
