pub mod classes;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod google;
pub mod notify;
pub mod replica;

pub use error::{Error, Result};
