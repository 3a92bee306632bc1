pub mod config;
pub mod controller;
pub mod metrics;
pub mod render;
