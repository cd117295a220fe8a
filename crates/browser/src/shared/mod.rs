pub mod js;
pub mod errors;
pub mod config;

pub use config::TimeoutConfig;
pub use errors::to_dom_error;
