// Persistent settings, status messages and panel events

pub mod config;
pub mod events;
pub mod settings;
pub mod status;

pub use config::ConfigManager;
pub use events::PanelEvent;
pub use settings::PanelSettings;
pub use status::{StatusLevel, StatusMessage};
