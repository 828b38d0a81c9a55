pub mod batch;
pub mod cli;
pub mod config;
pub mod logging;
pub mod renaissance;
pub mod report;
pub mod utils;
