pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, PdfToText};
pub use config::toml_config::ProjectConfig;
pub use config::{Cli, Command};
pub use utils::error::{QscriptError, Result};
