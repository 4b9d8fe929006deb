pub mod document;
pub mod entities;
pub mod error;

pub use document::{Collection, Document, DocumentMapped, Fields};
pub use error::{AppError, StoreError};
