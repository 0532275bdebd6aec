pub mod cursor;
pub mod engine;
pub mod events;
pub mod keys;
pub mod mpv;
pub mod progress;
pub mod session;
pub mod throttle;

pub use mpv::MpvEngine;
