//! Title, description and API resource of a product video.

use serde::Serialize;
use vitrine_data::{Product, products::strip_html};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// "People & Blogs"
pub const CATEGORY_ID: &str = "22";

const FALLBACK_DESCRIPTION: &str = "Product details available on our website.";

/// Metadata sent when creating an upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
  pub title:          String,
  pub description:    String,
  pub privacy_status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
  title:       &'a str,
  description: &'a str,
  category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
  privacy_status:              &'a str,
  self_declared_made_for_kids: bool,
}

#[derive(Serialize)]
struct VideoResource<'a> {
  snippet: Snippet<'a>,
  status:  Status<'a>,
}

impl VideoMetadata {
  /// Metadata for `product`, or `None` when it has no usable title.
  #[must_use]
  pub fn for_product(
    product: &Product,
    product_url: &str,
    privacy_status: &str,
  ) -> Option<Self> {
    let title = video_title(product)?;
    Some(Self {
      title,
      description: video_description(product_url, &product.description_short),
      privacy_status: privacy_status.to_string(),
    })
  }

  /// Request body of the `videos.insert` call.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(&VideoResource {
      snippet: Snippet {
        title:       &self.title,
        description: &self.description,
        category_id: CATEGORY_ID,
      },
      status:  Status {
        privacy_status:              &self.privacy_status,
        self_declared_made_for_kids: false,
      },
    })
  }
}

fn truncate(text: &str, max: usize) -> String {
  if text.chars().count() <= max {
    return text.to_string();
  }
  let head: String = text.chars().take(max - 3).collect();
  format!("{head}...")
}

/// `titre`, then `name`, stripped of markup and cut to 100 characters.
#[must_use]
pub fn video_title(product: &Product) -> Option<String> {
  [&product.titre, &product.name]
    .into_iter()
    .map(|text| strip_html(text))
    .find(|text| !text.is_empty())
    .map(|title| truncate(&title, MAX_TITLE_CHARS))
}

/// Link to the product page followed by the short description.
#[must_use]
pub fn video_description(product_url: &str, description_short: &str) -> String {
  let summary = strip_html(description_short);
  let summary = if summary.is_empty() {
    FALLBACK_DESCRIPTION
  } else {
    summary.as_str()
  };
  truncate(
    &format!("Visit our website for more details: {product_url}\n\n{summary}"),
    MAX_DESCRIPTION_CHARS,
  )
}

/// Public URL of a product page under a language base URL.
#[must_use]
pub fn product_url(base_url: &str, product_id: &str) -> String {
  format!(
    "{}/page_html/products/produit-{product_id}.html",
    base_url.trim_end_matches('/')
  )
}
