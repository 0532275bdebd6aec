pub mod init;
pub mod library;
pub mod nav;
pub mod play;
