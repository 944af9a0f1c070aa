pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
pub mod settings_file;
pub mod utils;
