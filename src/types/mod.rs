//! Type definitions for costlens

mod cost;
mod error;
mod outcome;
mod period;
mod report;

pub use cost::*;
pub use error::*;
pub use outcome::*;
pub use period::*;
pub use report::*;

/// Report cache warning types
#[derive(Debug, Clone, PartialEq)]
pub enum CacheWarning {
    /// Failed to open or read cache file
    LoadFailed(String),
    /// Cache file was corrupted (invalid JSON)
    Corrupted(String),
    /// Cache written by an incompatible version
    VersionMismatch(String),
}
