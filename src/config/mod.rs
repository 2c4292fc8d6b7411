pub mod env;
mod loader;

pub use env::{
    ApiFlavor, AppConfig, ClassifierConfig, DetectionConfig, DirectoryConfig, LoggingConfig,
    ParseStrategy,
};
pub use loader::load_config;
