//! Business services behind the HTTP handlers

pub mod auth;
pub mod catalog;
pub mod images;
pub mod interactions;
pub mod validation;

pub use auth::{AuthConfig, AuthService, RegisterInput, TokenClaims};
pub use catalog::{CatalogRecord, CatalogService, ImageUpload, ItemForm};
pub use images::ImageStore;
pub use interactions::InteractionService;
