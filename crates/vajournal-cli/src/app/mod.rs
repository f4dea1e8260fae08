//! Application-level utilities for the VA Journal CLI.
//!
//! This module provides:
//! - Path and account resolution from flags, environment and config
//! - Password prompting with retry logic
//! - A context that opens the store and logs in on demand

mod context;
mod password;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use password::read_new_password;
pub use resolver::{resolve_config_path, DEFAULT_JOURNAL_HINT};
