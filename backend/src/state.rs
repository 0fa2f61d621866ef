use std::sync::Arc;

use solfa_blob::BucketClient;
use solfa_core::services::{AccountService, MediaService};
use solfa_storage::SqliteCatalog;

use crate::auth::{BcryptHasher, TokenIssuer};

pub type Media = MediaService<SqliteCatalog, BucketClient>;
pub type Accounts = AccountService<SqliteCatalog, BcryptHasher>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
  pub media: Arc<Media>,
  pub accounts: Arc<Accounts>,
  pub tokens: Arc<TokenIssuer>,
}
