//! Concrete repository implementations.

pub mod file;
pub mod file_user;

pub use file::FileRepository;
pub use file_user::FileUserRepository;
