pub mod config;
pub mod engine;
pub mod joint;
pub mod matcher;
pub mod osc;
pub mod scheduler;
