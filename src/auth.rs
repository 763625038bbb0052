pub mod extractor;
pub mod login;
pub mod models;
pub mod repository;
pub mod security;

pub use extractor::AuthenticatedUser;
pub use models::{Principal, User, UserSummary};
pub use security::auth_middleware;
