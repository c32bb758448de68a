//! Utility functions for Gist Sync.

pub mod browser;

pub use browser::{gist_web_url, open_browser};
