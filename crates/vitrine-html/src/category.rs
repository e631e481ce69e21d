use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use log::info;
use vitrine_data::MenuEntry;
use vitrine_templates as templates;
use vitrine_utils::output::write_page;

use crate::{
  StageReport,
  context::LanguageContext,
  dom::Page,
  fragments::{DEFAULT_CTA, EMPTY_CATEGORY, load_page_template, product_card},
  head::{self, PageMeta},
  links::{PageKind, category_path},
  nav,
};

const KIND: PageKind = PageKind::Category;

/// Regenerate `page_html/categories/{n}.html` for every menu entry.
#[must_use]
pub fn generate_categories(context: &LanguageContext) -> StageReport {
  let mut report = StageReport::default();
  let dir = context.site.categories_dir();
  for entry in context.translations.menu_entries() {
    let path = dir.join(format!("{}.html", entry.number));
    let result = render_category(context, &entry, &path)
      .and_then(|html| write_page(&path, &html, &context.postprocess()));
    report.record(&path, result);
  }
  info!("[{}] categories: {report}", context.site.code);
  report
}

/// Render one category page, updating the existing page when there is one.
///
/// # Errors
///
/// Returns an error if the source page cannot be read or a partial fails to
/// render.
pub fn render_category(
  context: &LanguageContext,
  entry: &MenuEntry,
  existing: &Path,
) -> Result<String> {
  let source = if existing.is_file() {
    fs::read_to_string(existing)
      .wrap_err_with(|| format!("Failed to read {}", existing.display()))?
  } else {
    load_page_template(
      context.config,
      &context.site.category_template(),
      "category.html",
      templates::CATEGORY_TEMPLATE,
    )?
  };

  let translations = &context.translations;
  let n = entry.number;
  let name = entry.text.as_str();
  let default_title = format!("{name} - AliExpress Affiliate");
  let default_description = format!("Discover our selection of {name}");
  let path = category_path(n);

  let title_key = format!("meta.title.menu.{n}");
  let description_key = format!("meta.des.menu.{n}");

  let page = Page::parse(&source);
  head::apply(&page, context, &PageMeta {
    title:       translations.get_or(&title_key, &default_title),
    description: translations.get_or(&description_key, &default_description),
    path:        &path,
  })?;

  page.set_text("h1.section-title", name);
  if let Some(description) = translations.get(&format!("descripton.{n}")) {
    let html = context.fragments.category_description(description)?;
    if !page.replace_element("div.category-description", &html) {
      page.insert_after("h1.section-title", &html);
    }
  }

  let images = KIND.images_prefix(context.site);
  let cta = translations.get_or("button.view_on_aliexpress", DEFAULT_CTA);
  let cards: Vec<_> = context
    .products
    .in_category(n)
    .into_iter()
    .map(|product| {
      product_card(KIND, &images, product, product.card_title(), cta)
    })
    .collect();
  let cards = context.fragments.product_cards(&cards, EMPTY_CATEGORY)?;
  page.replace_children("#products-container", &cards);

  nav::apply_navigation(&page, context, KIND)?;
  page.to_html()
}
