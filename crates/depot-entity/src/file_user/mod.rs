//! The `FileUser` ownership record.

pub mod model;

pub use model::{CreateFileUser, FileUser, FileUserEdit, FileUserRecord};
