mod config;
pub mod flags;
pub mod library;

pub use config::Config;
pub use flags::FileFlagStore;
pub use library::Library;
