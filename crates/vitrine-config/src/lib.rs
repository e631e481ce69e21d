pub mod config;
pub mod error;
pub mod postprocess;
pub mod sitemap;
pub mod templates;
pub mod youtube;

pub use config::Config;
pub use error::ConfigError;
