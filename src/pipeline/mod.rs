//! Load, validate, accumulate and save.

mod config;
mod process;

pub use config::Config;
pub use process::{Pipeline, Summary};
