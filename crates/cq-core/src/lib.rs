pub mod assists;
pub mod attachments;
pub mod auth;
pub mod civiq;
pub mod comments;
pub mod csv;
pub mod error;
pub mod files;
pub mod geo;
pub mod requests;
pub mod store;
pub mod validation;

pub mod types;

pub use crate::auth::Actor;
pub use crate::civiq::Civiq;
pub use crate::error::CiviqError;
pub use crate::store::Store;
