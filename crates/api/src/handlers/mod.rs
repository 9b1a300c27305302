pub mod analytics;
pub mod detection;
pub mod settings;
