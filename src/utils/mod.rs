pub mod fs;
pub mod logger;
pub mod process;
pub mod spinner;
