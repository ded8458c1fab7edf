pub mod config;
pub mod extract;
pub mod logging;
pub mod persist;
pub mod predict;
pub mod report;
pub mod state;
pub mod stats;
