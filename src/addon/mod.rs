pub mod summary;
pub mod version;
