//! Domain model (listener trait, config, errors).

pub mod config;
pub mod errors;
pub mod listener;

pub use self::config::ListenerListConfig;
pub use self::errors::ListenerError;
pub use self::listener::Listener;
