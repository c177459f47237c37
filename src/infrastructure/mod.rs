pub mod desktop;
pub mod directories;
pub mod logging;
pub mod notifier;
pub mod shutdown;
