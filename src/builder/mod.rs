pub mod archive;
pub mod plugin;
