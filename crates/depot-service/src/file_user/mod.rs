//! Ownership-layer use cases.

pub mod service;

pub use service::{Download, FileUserService, OwnershipRepository, UploadRequest};
