//! Content storage coordination.

pub mod store;

pub use store::{ContentStore, FileUpload};
