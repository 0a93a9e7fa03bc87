#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod crawl;
pub mod document;
pub mod engine;
pub mod formats;
pub mod logging;
pub mod render;
pub mod resolve;
pub mod state;
