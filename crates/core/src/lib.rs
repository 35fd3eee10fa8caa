pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod stats;

pub use error::{LogstatError, Result};
