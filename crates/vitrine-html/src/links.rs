use vitrine_data::{FooterLink, FooterTarget, LanguageSite, MenuEntry};

/// Where a generated page sits inside a language tree.
///
/// Every link a page emits is relative to its own location, so the same
/// translations render correctly at the site root and in language directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
  Category,
  Legal,
  Product,
  Index { root: bool },
}

impl PageKind {
  #[must_use]
  pub fn for_index(site: &LanguageSite) -> Self {
    Self::Index { root: site.is_root }
  }

  /// Directory levels between the page and its language root.
  #[must_use]
  pub const fn depth(self) -> usize {
    match self {
      Self::Index { .. } => 0,
      Self::Category | Self::Legal | Self::Product => 2,
    }
  }

  #[must_use]
  pub const fn home(self) -> &'static str {
    match self {
      Self::Index { root: true } => "/",
      Self::Index { root: false } => "./",
      Self::Category | Self::Legal | Self::Product => "../../",
    }
  }

  #[must_use]
  pub fn category(self, number: usize) -> String {
    match self {
      Self::Category => format!("{number}.html"),
      Self::Legal | Self::Product => format!("../categories/{number}.html"),
      Self::Index { .. } => format!("page_html/categories/{number}.html"),
    }
  }

  #[must_use]
  pub fn legal(self, slug: &str) -> String {
    match self {
      Self::Legal => format!("{slug}.html"),
      Self::Category | Self::Product => format!("../legal/{slug}.html"),
      Self::Index { .. } => format!("page_html/legal/{slug}.html"),
    }
  }

  #[must_use]
  pub const fn sitemap(self) -> &'static str {
    match self {
      Self::Index { .. } => "sitemap.xml",
      Self::Category | Self::Legal | Self::Product => "../../sitemap.xml",
    }
  }

  #[must_use]
  pub fn product(self, id: &str) -> String {
    match self {
      Self::Product => format!("produit-{id}.html"),
      Self::Category | Self::Legal => format!("../products/produit-{id}.html"),
      Self::Index { .. } => format!("page_html/products/produit-{id}.html"),
    }
  }

  /// Relative prefix from this page to the shared site-root `images/`.
  #[must_use]
  pub fn images_prefix(self, site: &LanguageSite) -> String {
    format!("{}images/", "../".repeat(self.depth() + site.depth()))
  }

  #[must_use]
  pub fn menu_url(self, entry: &MenuEntry) -> String {
    self.category(entry.number)
  }

  #[must_use]
  pub fn footer_url(self, link: &FooterLink) -> String {
    match &link.target {
      FooterTarget::Home => self.home().to_string(),
      FooterTarget::Sitemap => self.sitemap().to_string(),
      FooterTarget::Legal { slug } => self.legal(slug),
    }
  }
}

/// Path of a page relative to its language root, as used in public URLs.
#[must_use]
pub fn category_path(number: usize) -> String {
  format!("page_html/categories/{number}.html")
}

#[must_use]
pub fn legal_path(slug: &str) -> String {
  format!("page_html/legal/{slug}.html")
}

#[must_use]
pub fn product_path(id: &str) -> String {
  format!("page_html/products/produit-{id}.html")
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use vitrine_config::Config;

  use super::*;

  #[test]
  fn test_relative_url_table() {
    let kinds = [
      PageKind::Category,
      PageKind::Legal,
      PageKind::Product,
      PageKind::Index { root: true },
      PageKind::Index { root: false },
    ];
    let homes: Vec<_> = kinds.iter().map(|k| k.home()).collect();
    assert_eq!(homes, vec!["../../", "../../", "../../", "/", "./"]);

    let categories: Vec<_> = kinds.iter().map(|k| k.category(3)).collect();
    assert_eq!(categories, vec![
      "3.html",
      "../categories/3.html",
      "../categories/3.html",
      "page_html/categories/3.html",
      "page_html/categories/3.html",
    ]);

    let legal: Vec<_> = kinds.iter().map(|k| k.legal("privacy")).collect();
    assert_eq!(legal, vec![
      "../legal/privacy.html",
      "privacy.html",
      "../legal/privacy.html",
      "page_html/legal/privacy.html",
      "page_html/legal/privacy.html",
    ]);

    let sitemaps: Vec<_> = kinds.iter().map(|k| k.sitemap()).collect();
    assert_eq!(sitemaps, vec![
      "../../sitemap.xml",
      "../../sitemap.xml",
      "../../sitemap.xml",
      "sitemap.xml",
      "sitemap.xml",
    ]);
  }

  #[test]
  fn test_images_prefix_depends_on_language_depth() {
    let config = Config {
      site_root: PathBuf::from("/site"),
      ..Default::default()
    };
    let en = LanguageSite::new(&config, "en");
    let fr = LanguageSite::new(&config, "fr");

    assert_eq!(PageKind::Category.images_prefix(&fr), "../../../images/");
    assert_eq!(PageKind::Category.images_prefix(&en), "../../images/");
    assert_eq!(PageKind::for_index(&fr).images_prefix(&fr), "../images/");
    assert_eq!(PageKind::for_index(&en).images_prefix(&en), "images/");
  }

  #[test]
  fn test_footer_urls() {
    let link = FooterLink {
      key:    "footer.link.sitemap".to_string(),
      text:   "Sitemap".to_string(),
      target: FooterTarget::Sitemap,
    };
    assert_eq!(PageKind::Product.footer_url(&link), "../../sitemap.xml");
    assert_eq!(
      PageKind::Category.product("42"),
      "../products/produit-42.html"
    );
  }
}
