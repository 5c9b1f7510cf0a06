//! Configuration module
//!
//! Handles loading, parsing, and validating TOML configuration files. All
//! settings have defaults, so the CLI works without a config file; a file is
//! only needed to override fetch timing, crawl bounds, or the user agent.
//!
//! # Example
//!
//! ```no_run
//! use autodocs_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("autodocs.toml")).unwrap();
//! println!("Request timeout: {}s", config.fetch.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlConfig, FetchConfig, UserAgentConfig};
pub use validation::validate;
