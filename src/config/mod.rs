//! Configuration module for Board-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can also run from command-line flags alone.
//!
//! # Example
//!
//! ```no_run
//! use board_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling board: {}", config.crawler.board);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_articles_path, comments_path_for, Config, CrawlerConfig, GeolocationConfig,
    OutputConfig, DEFAULT_SKIP_TITLES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, parse_config_with_hash};
pub use validation::validate;
