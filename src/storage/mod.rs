//! Output sinks for crawl results and profile reports.
//!
//! Each output goes either to stdout or to a file. Files are created when
//! missing and appended to otherwise, so repeated runs accumulate.

pub mod local;

use std::path::PathBuf;

pub use local::LocalStorage;

/// Where one kind of output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// An empty path means stdout.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(trimmed))
        }
    }
}
