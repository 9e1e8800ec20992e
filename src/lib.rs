//! Plain-language cloud cost comparison
//!
//! Resolves a free-text period ("May", "last month", "2025-05-14"), fetches
//! that period and the equal-length period before it, and reports totals,
//! per-dimension shares and changes, a trend and optimization hints.

pub mod cli;
pub mod services;
pub mod types;
