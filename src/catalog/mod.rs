pub mod loader;
pub mod word;

pub use loader::{CatalogError, CatalogLoader, CatalogSource};
pub use word::{Catalog, Difficulty, Word};
