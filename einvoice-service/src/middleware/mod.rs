pub mod auth;

pub use auth::{Claims, CurrentUser, DownloadUser, TokenVerifier};
