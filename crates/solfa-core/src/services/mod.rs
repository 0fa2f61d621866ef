pub mod account_service;
pub mod media_service;

pub use account_service::AccountService;
pub use media_service::MediaService;
