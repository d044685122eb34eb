//! Configuration: global settings resolution, path variables and TOML
//! loading shared by the settings file and the manifest store.
pub mod pathvar;
pub mod settings;
pub mod toml_loader;

pub use settings::{SettingKey, Settings};
