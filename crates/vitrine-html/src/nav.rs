//! Menu, footer and logo shared by every page kind.

use color_eyre::eyre::Result;

use crate::{
  context::LanguageContext,
  dom::Page,
  fragments::{footer_links, menu_links},
  links::PageKind,
};

/// Text of the first menu entry.
#[must_use]
pub fn home_text<'a>(context: &'a LanguageContext, kind: PageKind) -> &'a str {
  let translations = &context.translations;
  let footer_home = translations.get_or("footer.link.home", "Home");
  match kind {
    PageKind::Index { .. } => translations.get_or("home.en", footer_home),
    _ => footer_home,
  }
}

/// Regenerate `ul.menu` and the footer of a page.
///
/// # Errors
///
/// Returns an error if a partial fails to render.
pub fn apply_navigation(
  page: &Page,
  context: &LanguageContext,
  kind: PageKind,
) -> Result<()> {
  let translations = &context.translations;
  let menu = menu_links(kind, translations, home_text(context, kind));
  page.replace_children("ul.menu", &context.fragments.menu(&menu)?);

  let footer = footer_links(kind, translations);
  let footer = context.fragments.footer(&footer, translations)?;
  page.replace_children("footer", &footer);
  Ok(())
}

/// Replace the logo link with one pointing home and showing the shared logo.
pub fn apply_logo(page: &Page, context: &LanguageContext, kind: PageKind) {
  let logo = format!(
    r#"<a href="{}" class="logo" id="logo"><img src="{}logo/logo.webp" alt="Logo"></a>"#,
    kind.home(),
    kind.images_prefix(context.site),
  );
  page.replace_element("a#logo", &logo);
}
