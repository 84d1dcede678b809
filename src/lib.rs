pub mod auth;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ident;

pub use dispatcher::CatalogDispatcher;
pub use error::{AdminError, AdminResult, ErrorKind};
