//! In-place update of a language's home page.

use std::fs;

use color_eyre::eyre::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use vitrine_data::TranslationTable;
use vitrine_utils::output::write_page;

use crate::{
  StageReport,
  context::LanguageContext,
  dom::Page,
  fragments::{
    CategoryCard,
    DEFAULT_CTA,
    EMPTY_CATEGORY,
    Faq,
    Feature,
    Stat,
    Testimonial,
    product_card,
  },
  head::{self, PageMeta},
  links::PageKind,
  nav,
};

pub const DEFAULT_SITE_TITLE: &str =
  "AliExpress Affiliate Program - Best Products";
pub const DEFAULT_SITE_DESCRIPTION: &str =
  "Discover the best AliExpress products";

/// Section title keys and the heading each one fills.
const SECTION_TITLES: &[(&str, &str)] = &[
  ("categories", "section.categories-section h2.section-title"),
  ("bestsellers", "section#produits h2.section-title"),
  ("advantages", "section#avantages h2"),
  ("stats", "section.stats-section h2.section-title"),
  ("faq", "section.faq-section h2.section-title"),
  ("testimonials", "section.testimonials-section h2.section-title"),
];

const ADVANTAGES: &[&str] = &[
  "factory_price",
  "worldwide_shipping",
  "customer_service",
  "secure_payment",
];

const STATS: &[(&str, &str, &str)] = &[
  ("products", "1500+", "Products Available"),
  ("countries", "150+", "Country of Delivery"),
  ("satisfaction", "98%", "Customer Satisfaction"),
  ("support", "24/7", "Customer Service"),
];

const FAQ_ITEMS: usize = 10;
const TESTIMONIALS: usize = 4;

/// Update `index.html` of the language in place.
#[must_use]
pub fn generate_index(context: &LanguageContext) -> StageReport {
  let mut report = StageReport::default();
  let path = context.site.index_path();
  let result = fs::read_to_string(&path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))
    .and_then(|source| render_index(context, &source))
    .and_then(|html| write_page(&path, &html, &context.postprocess()));
  report.record(&path, result);
  info!("[{}] index: {report}", context.site.code);
  report
}

/// Apply every index section to `source`.
///
/// # Errors
///
/// Returns an error if a partial fails to render.
pub fn render_index(context: &LanguageContext, source: &str) -> Result<String> {
  let kind = PageKind::for_index(context.site);
  let translations = &context.translations;
  let page = Page::parse(source);

  head::apply(&page, context, &PageMeta {
    title:       translations.get_or("site.meta.title", DEFAULT_SITE_TITLE),
    description: translations
      .get_or("site.meta.description", DEFAULT_SITE_DESCRIPTION),
    path:        "",
  })?;
  if let Some(email) = translations.get("site.contact.email") {
    update_json_ld_email(&page, email);
  }

  nav::apply_logo(&page, context, kind);
  nav::apply_navigation(&page, context, kind)?;

  apply_categories(&page, context, kind)?;
  apply_hero(&page, translations);
  for (section, selector) in SECTION_TITLES {
    if let Some(title) = translations.get(&format!("homepage.{section}.title"))
    {
      page.set_text(selector, title);
    }
  }
  apply_presentation(&page, context)?;
  apply_advantages(&page, context)?;
  apply_stats(&page, context)?;
  apply_faq(&page, context)?;
  apply_testimonials(&page, context, kind)?;
  apply_best_sellers(&page, context, kind)?;

  page.to_html()
}

/// Set the contact email of every JSON-LD block.
fn update_json_ld_email(page: &Page, email: &str) {
  let selector = r#"script[type="application/ld+json"]"#;
  page.update_text(selector, |text| {
    let Ok(mut data) = serde_json::from_str::<Value>(text) else {
      debug!("Skipping JSON-LD that does not parse");
      return None;
    };
    let object = data.as_object_mut()?;
    match object.get_mut("contactPoint").and_then(Value::as_object_mut) {
      Some(contact) => {
        contact.insert("email".to_string(), Value::from(email));
      },
      None => {
        object.insert("email".to_string(), Value::from(email));
      },
    }
    let json = serde_json::to_string_pretty(&data).ok()?;
    Some(format!("\n{json}\n"))
  });
}

fn apply_categories(
  page: &Page,
  context: &LanguageContext,
  kind: PageKind,
) -> Result<()> {
  let images = kind.images_prefix(context.site);
  let cards: Vec<CategoryCard> = context
    .translations
    .menu_entries()
    .into_iter()
    .map(|entry| {
      CategoryCard {
        url:       kind.category(entry.number),
        image_url: format!("{images}categories/{}.webp", entry.number),
        name:      entry.text,
      }
    })
    .collect();
  let html = context.fragments.category_cards(&cards)?;
  page.replace_children(".categories-grid", &html);
  Ok(())
}

fn apply_hero(page: &Page, translations: &TranslationTable) {
  if let Some(title) = translations.get("homepage.hero.title") {
    page.set_text("#hero-title", title);
  }
  if let Some(subtitle) = translations.get("homepage.hero.subtitle") {
    page.set_text("#hero-subtitle", subtitle);
  }
  if let Some(button) = translations.get("homepage.hero.button") {
    page.set_text("#hero-button", button);
  }
  let url = translations.get_or("homepage.hero.button.url", "#produits");
  page.set_attr("#hero-button", "href", url);
}

fn apply_presentation(page: &Page, context: &LanguageContext) -> Result<()> {
  let translations = &context.translations;
  let Some(content) = translations.get("homepage.presentation.content") else {
    if let Some(title) = translations.get("homepage.presentation.title") {
      page.set_text(".presentation-content h2", title);
    }
    return Ok(());
  };

  let current = page.text(".presentation-content h2");
  let title = translations
    .get("homepage.presentation.title")
    .or(current.as_deref())
    .unwrap_or_default();
  let paragraphs: Vec<&str> = content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect();
  let html = context.fragments.presentation(title, &paragraphs)?;
  page.replace_children(".presentation-content", &html);
  Ok(())
}

fn apply_advantages(page: &Page, context: &LanguageContext) -> Result<()> {
  let translations = &context.translations;
  let features: Vec<Feature> = ADVANTAGES
    .iter()
    .filter_map(|name| {
      let prefix = format!("homepage.advantages.{name}");
      Some(Feature {
        title:       translations.get(&format!("{prefix}.title"))?.to_string(),
        description: translations
          .get_or(&format!("{prefix}.description"), "")
          .to_string(),
      })
    })
    .collect();
  if features.is_empty() {
    return Ok(());
  }
  let html = context.fragments.features(&features)?;
  page.replace_children("div.features", &html);
  Ok(())
}

fn apply_stats(page: &Page, context: &LanguageContext) -> Result<()> {
  let translations = &context.translations;
  let stats: Vec<Stat> = STATS
    .iter()
    .map(|(name, number, label)| {
      let prefix = format!("homepage.stats.{name}");
      Stat {
        number: translations
          .get_or(&format!("{prefix}.number"), number)
          .to_string(),
        label:  translations
          .get_or(&format!("{prefix}.label"), label)
          .to_string(),
      }
    })
    .collect();
  let html = context.fragments.stats(&stats)?;
  page.replace_children(".stats-grid", &html);
  Ok(())
}

fn apply_faq(page: &Page, context: &LanguageContext) -> Result<()> {
  let translations = &context.translations;
  let items: Vec<Faq> = (1..=FAQ_ITEMS)
    .filter_map(|i| {
      Some(Faq {
        question: translations
          .get(&format!("homepage.faq.{i}.question"))?
          .to_string(),
        answer:   translations
          .get(&format!("homepage.faq.{i}.answer"))?
          .to_string(),
      })
    })
    .collect();
  if items.is_empty() {
    return Ok(());
  }
  let html = context.fragments.faq(&items)?;
  page.replace_children(".faq-container", &html);
  Ok(())
}

fn apply_testimonials(
  page: &Page,
  context: &LanguageContext,
  kind: PageKind,
) -> Result<()> {
  let translations = &context.translations;
  let images = kind.images_prefix(context.site);
  let items: Vec<Testimonial> = (1..=TESTIMONIALS)
    .filter_map(|i| {
      Some(Testimonial {
        name:   translations
          .get(&format!("homepage.testimonials.{i}.name"))?
          .to_string(),
        text:   translations
          .get(&format!("homepage.testimonials.{i}.text"))?
          .to_string(),
        avatar: format!("{images}testimonials/client{i}.webp"),
      })
    })
    .collect();
  if items.is_empty() {
    return Ok(());
  }
  let html = context.fragments.testimonials(&items)?;
  page.replace_children(".testimonials-grid", &html);
  Ok(())
}

fn apply_best_sellers(
  page: &Page,
  context: &LanguageContext,
  kind: PageKind,
) -> Result<()> {
  let images = kind.images_prefix(context.site);
  let cta = context
    .translations
    .get_or("button.view_on_aliexpress", DEFAULT_CTA);
  let cards: Vec<_> = context
    .products
    .best_sellers(context.config.best_sellers)
    .into_iter()
    .map(|product| {
      product_card(kind, &images, product, product.short_title(), cta)
    })
    .collect();
  let html = context.fragments.product_cards(&cards, EMPTY_CATEGORY)?;
  page.replace_children("#products-container", &html);
  Ok(())
}
