pub mod accounts;
pub mod blob;
pub mod catalog;

pub use accounts::{AccountStore, PasswordError, PasswordHasher};
pub use blob::{BlobError, BlobStore, FileUpload, MediaFolder};
pub use catalog::{CatalogError, CatalogStore};
