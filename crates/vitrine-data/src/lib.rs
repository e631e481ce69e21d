//! Data model of a vitrine site: translation and product tables read from
//! CSV, the on-disk language layout, and the optional category map.

pub mod categories;
pub mod columns;
pub mod error;
pub mod layout;
pub mod products;
pub mod slug;
pub mod translations;

pub use error::DataError;
pub use layout::{LanguageSite, discover_languages};
pub use products::{Product, ProductTable};
pub use slug::slugify;
pub use translations::{FooterLink, FooterTarget, MenuEntry, TranslationTable};
