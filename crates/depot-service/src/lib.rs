//! # depot-service
//!
//! Business logic service layer for Depot. The [`ContentStore`] owns the
//! save/load/delete lifecycle of deduplicated content; the
//! [`FileUserService`] implements the user-facing ownership use cases on
//! top of it.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod content;
pub mod file_user;

#[cfg(test)]
mod test_support;

pub use content::{ContentStore, FileUpload};
pub use file_user::{Download, FileUserService, OwnershipRepository, UploadRequest};
