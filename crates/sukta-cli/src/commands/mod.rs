pub mod build;
pub mod config;
pub mod graph;
pub mod query;
pub mod rules;
pub mod status;

pub use build::run_build;
pub use status::show_status;
