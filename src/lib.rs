pub mod config;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod server;
pub mod upload;
pub mod vision;

pub use error::{Error, Result};
