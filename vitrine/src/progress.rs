use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a loop over `len` items.
///
/// # Errors
///
/// Returns an error if the progress template is invalid.
pub fn bar(len: usize, message: &'static str) -> Result<ProgressBar> {
  let style = ProgressStyle::with_template(
    "{spinner:.green} {msg:<12} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})",
  )?
  .progress_chars("=> ");
  Ok(
    ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX))
      .with_style(style)
      .with_message(message),
  )
}
