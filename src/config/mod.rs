//! Configuration management
//!
//! Handles the connection target and user settings.

pub mod dsn;
pub mod settings;

pub use dsn::Dsn;
pub use settings::{Settings, load_settings};
