pub mod build;
pub mod locate;
pub mod source;
