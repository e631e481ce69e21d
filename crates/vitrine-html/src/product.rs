use std::{collections::HashSet, sync::LazyLock};

use color_eyre::eyre::Result;
use log::{info, warn};
use regex::Regex;
use vitrine_data::{Product, products::strip_html};
use vitrine_templates as templates;
use vitrine_utils::output::{remove_orphans, write_page};

use crate::{
  StageReport,
  context::LanguageContext,
  dom::Page,
  fragments::{
    DEFAULT_CTA,
    ProductDetail,
    load_page_template,
    load_template_content,
  },
  head::{self, PageMeta},
  links::{PageKind, product_path},
  nav,
};

const KIND: PageKind = PageKind::Product;
const PAGE_PREFIX: &str = "produit-";
const DEFAULT_DESCRIPTION: &str = "Discover this AliExpress product";

static HEADINGS: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"(?s)<h[1-6][^>]*>.*?</h[1-6]>").expect("Invalid heading regex")
});

/// Generate a page for every product with an affiliate link, then delete
/// pages of products that left the CSV.
#[must_use]
pub fn generate_products(context: &LanguageContext) -> StageReport {
  let mut report = StageReport::default();
  let dir = context.site.products_dir();

  let template = match load_product_template(context) {
    Ok(template) => template,
    Err(e) => {
      report.record(&dir, Err(e));
      return report;
    },
  };

  for product in context.products.with_affiliate_link() {
    let path = dir.join(format!("{PAGE_PREFIX}{}.html", product.id));
    let result = render_product(context, &template, product)
      .and_then(|html| write_page(&path, &html, &context.postprocess()));
    report.record(&path, result);
  }

  let known: HashSet<String> =
    context.products.iter().map(|p| p.id.clone()).collect();
  match remove_orphans(&dir, PAGE_PREFIX, &known) {
    Ok(removed) if !removed.is_empty() => {
      info!(
        "[{}] removed {} orphaned product page(s)",
        context.site.code,
        removed.len()
      );
    },
    Ok(_) => {},
    Err(e) => warn!("[{}] orphan cleanup failed: {e}", context.site.code),
  }

  info!("[{}] product pages: {report}", context.site.code);
  report
}

/// Page template plus gallery script, loaded once per language.
pub struct ProductTemplate {
  html:   String,
  script: String,
}

/// # Errors
///
/// Returns an error if a template override cannot be read.
pub fn load_product_template(
  context: &LanguageContext,
) -> Result<ProductTemplate> {
  Ok(ProductTemplate {
    html:   load_page_template(
      context.config,
      &context.site.product_template(),
      "produit.html",
      templates::PRODUCT_TEMPLATE,
    )?,
    script: load_template_content(
      context.config,
      "product.js",
      templates::PRODUCT_JS,
    )?,
  })
}

/// Render the page of a single product.
///
/// # Errors
///
/// Returns an error if a partial fails to render.
pub fn render_product(
  context: &LanguageContext,
  template: &ProductTemplate,
  product: &Product,
) -> Result<String> {
  let title = if product.meta_title.is_empty() {
    strip_html(product.display_name())
  } else {
    strip_html(&product.meta_title)
  };
  let description = [&product.meta_description, &product.description_short]
    .into_iter()
    .map(|text| strip_html(text))
    .find(|text| !text.is_empty())
    .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

  let page = Page::parse(&template.html);
  head::apply(&page, context, &PageMeta {
    title:       &title,
    description: &description,
    path:        &product_path(&product.id),
  })?;
  head::fix_favicon(&page);

  nav::apply_logo(&page, context, KIND);
  nav::apply_navigation(&page, context, KIND)?;

  let detail = product_detail(context, product);
  let detail = context.fragments.product_detail(&detail)?;
  page.replace_children("#product-container", &detail);

  page.remove("body script:not([src])");
  page.append_to("body", &format!("<script>{}</script>", template.script));

  page.to_html()
}

/// Data for the product detail partial.
#[must_use]
pub fn product_detail(
  context: &LanguageContext,
  product: &Product,
) -> ProductDetail {
  let base = format!(
    "{}products/{}/",
    KIND.images_prefix(context.site),
    product.id
  );
  let images: Vec<String> = product
    .image_file_names()
    .iter()
    .map(|name| format!("{base}{name}"))
    .collect();
  let main_image = images
    .first()
    .cloned()
    .unwrap_or_else(|| format!("{base}image_1.jpg"));
  let youtube_id = product.youtube_id().map(ToString::to_string);

  ProductDetail {
    main_image,
    title: strip_html(product.display_name()),
    show_thumbnails: images.len() > 1 || youtube_id.is_some(),
    youtube_id,
    images,
    price: product.price.clone(),
    description_short: remove_headings(&product.description_short),
    review_count: product.review_count(),
    affiliate_url: product.affiliate_link.clone(),
    cta_text: context
      .translations
      .get_or("button.view_on_aliexpress", DEFAULT_CTA)
      .to_string(),
    description_long: remove_headings(&product.description),
  }
}

/// Drop `<h1>`..`<h6>` elements from description HTML.
#[must_use]
pub fn remove_headings(html: &str) -> String {
  HEADINGS.replace_all(html, "").trim().to_string()
}
