//! CLI command implementations.

mod config;
mod run;
mod search;
mod serve;

pub use config::run_config;
pub use run::run_pipeline;
pub use search::run_search;
pub use serve::run_serve;
