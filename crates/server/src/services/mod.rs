//! Business services used by route handlers.

pub mod auth;
pub mod uploads;

pub use auth::{AuthError, AuthService, Claims, TokenService};
pub use uploads::{PendingFile, UploadError, UploadStore};
