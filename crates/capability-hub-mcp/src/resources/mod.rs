//! Resource providers: host introspection and server configuration.

pub mod config_data;
pub mod system_info;

pub use config_data::config_resources;
pub use system_info::system_resources;
