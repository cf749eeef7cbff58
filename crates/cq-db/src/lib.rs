pub mod assist_repo;
pub mod attachment_repo;
pub mod comment_repo;
pub mod request_repo;
pub mod schema;
pub mod store;
pub mod util;

pub use crate::store::DbStore;

#[cfg(test)]
mod tests;
