pub mod domain;
pub mod output;
pub mod scaffold;
pub mod sitemap;

// Re-export commonly used utilities
pub use domain::{check_domains, update_language};
pub use output::{write_if_changed, write_page};
pub use scaffold::create_language;
pub use sitemap::generate_sitemaps;
