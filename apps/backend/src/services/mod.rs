pub mod import;
pub mod progress;
