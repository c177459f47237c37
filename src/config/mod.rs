pub mod env;
mod loader;

pub use env::{AppConfig, TwilioConfig, WindowPolicy};
pub use loader::load_config;
