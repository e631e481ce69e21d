use std::sync::LazyLock;

use color_eyre::eyre::Result;
use html_escape::encode_text;
use log::info;
use regex::Regex;
use vitrine_data::{FooterLink, FooterTarget};
use vitrine_templates as templates;
use vitrine_utils::output::write_page;

use crate::{
  StageReport,
  context::LanguageContext,
  dom::Page,
  fragments::load_page_template,
  head::{self, PageMeta},
  links::{PageKind, legal_path},
  nav,
};

const KIND: PageKind = PageKind::Legal;
const PARAGRAPH: &str = r#"<p style="margin-bottom: 2rem;">"#;

static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"\d+\.\s+").expect("Invalid section marker regex")
});

/// Generate `page_html/legal/{slug}.html` for every legal footer link.
#[must_use]
pub fn generate_legal_pages(context: &LanguageContext) -> StageReport {
  let mut report = StageReport::default();
  let dir = context.site.legal_dir();
  for link in context.translations.legal_links() {
    let Some(slug) = legal_slug(&link) else {
      continue;
    };
    let path = dir.join(format!("{slug}.html"));
    let result = render_legal(context, &link, slug)
      .and_then(|html| write_page(&path, &html, &context.postprocess()));
    report.record(&path, result);
  }
  info!("[{}] legal pages: {report}", context.site.code);
  report
}

fn legal_slug(link: &FooterLink) -> Option<&str> {
  match &link.target {
    FooterTarget::Legal { slug } => Some(slug),
    FooterTarget::Home | FooterTarget::Sitemap => None,
  }
}

/// Render one legal page from the category template.
///
/// # Errors
///
/// Returns an error if the template cannot be read or a partial fails to
/// render.
pub fn render_legal(
  context: &LanguageContext,
  link: &FooterLink,
  slug: &str,
) -> Result<String> {
  let source = load_page_template(
    context.config,
    &context.site.category_template(),
    "category.html",
    templates::CATEGORY_TEMPLATE,
  )?;

  let translations = &context.translations;
  let default_title = format!("{} - AliExpress Affiliate", link.text);
  let title_key = format!("legal.{slug}.title");
  let title = translations.get_or(&title_key, &default_title);
  let description_key = format!("legal.{slug}.meta.description");
  let description = translations.get_or(&description_key, &link.text);
  let content = translations.get_or(&format!("legal.{slug}.content"), "");

  let page = Page::parse(&source);
  head::apply(&page, context, &PageMeta {
    title,
    description,
    path: &legal_path(slug),
  })?;

  let section = context.fragments.legal(title, &format_legal(content))?;
  page.replace_children("main", &section);

  nav::apply_navigation(&page, context, KIND)?;
  page.to_html()
}

/// Turn plain legal text into headings and paragraphs.
///
/// Content that already starts with a tag is kept as HTML. Otherwise the text
/// is split on numbered markers such as `1. `; without markers every line
/// becomes a paragraph. A numbered heading line always contains a marker, so
/// headings only come out of the marker split.
#[must_use]
pub fn format_legal(content: &str) -> String {
  let content = content.trim();
  if content.is_empty() {
    return String::new();
  }
  if content.starts_with('<') {
    return format!("{content}\n");
  }

  let markers: Vec<_> = SECTION_MARKER.find_iter(content).collect();
  if markers.is_empty() {
    return format_lines(content);
  }

  let mut html = String::new();
  let intro = content[..markers[0].start()].trim();
  if !intro.is_empty() {
    paragraph(&mut html, intro);
  }

  for (i, marker) in markers.iter().enumerate() {
    let end = markers.get(i + 1).map_or(content.len(), |next| next.start());
    let number = marker.as_str().trim();
    let text = content[marker.end()..end].trim();
    if text.is_empty() {
      continue;
    }

    if let Some((title, rest)) = text.split_once(':') {
      let title = title.trim();
      if title.chars().count() < 60 {
        heading(&mut html, number, title);
        let rest = rest.trim();
        if !rest.is_empty() {
          paragraph(&mut html, rest);
        }
      } else {
        paragraph(&mut html, &format!("{number} {text}"));
      }
    } else if text.chars().count() < 80 {
      heading(&mut html, number, text);
    } else {
      paragraph(&mut html, &format!("{number} {text}"));
    }
  }
  html
}

fn format_lines(content: &str) -> String {
  let mut html = String::new();
  for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
    paragraph(&mut html, line);
  }
  html
}

fn heading(html: &mut String, number: &str, title: &str) {
  html.push_str(&format!(
    "<h2>{} {}</h2>\n",
    encode_text(number),
    encode_text(title)
  ));
}

fn paragraph(html: &mut String, text: &str) {
  html.push_str(&format!("{PARAGRAPH}{}</p>\n", encode_text(text)));
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_html_content_is_kept() {
    let html = format_legal("<p>About <b>us</b></p>");
    assert_eq!(html, "<p>About <b>us</b></p>\n");
  }

  #[test]
  fn test_numbered_sections() {
    let text = "Welcome to our store. 1. Data collection: We collect \
                your email. 2. Cookies 3. A very long section without any \
                colon that keeps going well past the eighty character limit \
                for headings.";
    let html = format_legal(text);
    let lines: Vec<_> = html.lines().collect();
    assert_eq!(lines, vec![
      r#"<p style="margin-bottom: 2rem;">Welcome to our store.</p>"#,
      "<h2>1. Data collection</h2>",
      r#"<p style="margin-bottom: 2rem;">We collect your email.</p>"#,
      "<h2>2. Cookies</h2>",
      r#"<p style="margin-bottom: 2rem;">3. A very long section without any colon that keeps going well past the eighty character limit for headings.</p>"#,
    ]);
  }

  #[test]
  fn test_long_title_before_colon_is_a_paragraph() {
    let title = "x".repeat(60);
    let html = format_legal(&format!("1. {title}: rest"));
    assert!(html.starts_with(PARAGRAPH));
    assert!(html.contains(&format!("1. {title}: rest")));
  }

  #[test]
  fn test_line_mode_and_escaping() {
    let html = format_legal("Terms & conditions\n\n1.Intro\nPlain <line>");
    let lines: Vec<_> = html.lines().collect();
    assert_eq!(lines, vec![
      r#"<p style="margin-bottom: 2rem;">Terms &amp; conditions</p>"#,
      r#"<p style="margin-bottom: 2rem;">1.Intro</p>"#,
      r#"<p style="margin-bottom: 2rem;">Plain &lt;line&gt;</p>"#,
    ]);
    assert_eq!(format_legal("  "), "");
  }
}
