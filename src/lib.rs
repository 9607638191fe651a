//! phyloflow
//!
//! Este crate une las piezas del workspace en una aplicación:
//! - `config` arma la configuración (`.env`, entorno, CLI).
//! - `app` elige el backend según el modo y ejecuta el pipeline.
//! - `errors` expone `CoreError`, el error de nivel aplicación.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;

pub use app::{build_backend, load_queries, run};
pub use cli::Cli;
pub use config::{AppConfig, Mode};
pub use errors::CoreError;
