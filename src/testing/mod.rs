pub mod http;
pub mod logs;
