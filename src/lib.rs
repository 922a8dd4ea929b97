pub mod cli;
pub mod config;
pub mod error;
pub mod options;

pub use error::{Error, Result};
