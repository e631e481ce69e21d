use std::collections::HashMap;

pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
pub const CATEGORY_TEMPLATE: &str = include_str!("../templates/category.html");
pub const PRODUCT_TEMPLATE: &str = include_str!("../templates/produit.html");
pub const PRODUCT_JS: &str = include_str!("../templates/product.js");

pub const MENU_PARTIAL: &str = include_str!("../templates/partials/menu.html");
pub const FOOTER_PARTIAL: &str =
  include_str!("../templates/partials/footer.html");
pub const PRODUCT_CARDS_PARTIAL: &str =
  include_str!("../templates/partials/product_cards.html");
pub const PRODUCT_DETAIL_PARTIAL: &str =
  include_str!("../templates/partials/product_detail.html");
pub const CATEGORY_CARDS_PARTIAL: &str =
  include_str!("../templates/partials/category_cards.html");
pub const CATEGORY_DESCRIPTION_PARTIAL: &str =
  include_str!("../templates/partials/category_description.html");
pub const FEATURES_PARTIAL: &str =
  include_str!("../templates/partials/features.html");
pub const STATS_PARTIAL: &str = include_str!("../templates/partials/stats.html");
pub const FAQ_PARTIAL: &str = include_str!("../templates/partials/faq.html");
pub const TESTIMONIALS_PARTIAL: &str =
  include_str!("../templates/partials/testimonials.html");
pub const PRESENTATION_PARTIAL: &str =
  include_str!("../templates/partials/presentation.html");
pub const LEGAL_PARTIAL: &str = include_str!("../templates/partials/legal.html");
pub const HEAD_LINKS_PARTIAL: &str =
  include_str!("../templates/partials/head_links.html");
pub const ANALYTICS_PARTIAL: &str =
  include_str!("../templates/partials/analytics.html");

/// Tera partials keyed by the name they are registered and overridden under.
#[must_use]
pub fn partials() -> HashMap<&'static str, &'static str> {
  let mut partials = HashMap::new();
  partials.insert("menu.html", MENU_PARTIAL);
  partials.insert("footer.html", FOOTER_PARTIAL);
  partials.insert("product_cards.html", PRODUCT_CARDS_PARTIAL);
  partials.insert("product_detail.html", PRODUCT_DETAIL_PARTIAL);
  partials.insert("category_cards.html", CATEGORY_CARDS_PARTIAL);
  partials.insert("category_description.html", CATEGORY_DESCRIPTION_PARTIAL);
  partials.insert("features.html", FEATURES_PARTIAL);
  partials.insert("stats.html", STATS_PARTIAL);
  partials.insert("faq.html", FAQ_PARTIAL);
  partials.insert("testimonials.html", TESTIMONIALS_PARTIAL);
  partials.insert("presentation.html", PRESENTATION_PARTIAL);
  partials.insert("legal.html", LEGAL_PARTIAL);
  partials.insert("head_links.html", HEAD_LINKS_PARTIAL);
  partials.insert("analytics.html", ANALYTICS_PARTIAL);
  partials
}

/// Every embedded file, page templates and partials alike.
#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = partials();
  templates.insert("index.html", INDEX_TEMPLATE);
  templates.insert("category.html", CATEGORY_TEMPLATE);
  templates.insert("produit.html", PRODUCT_TEMPLATE);
  templates.insert("product.js", PRODUCT_JS);
  templates
}
