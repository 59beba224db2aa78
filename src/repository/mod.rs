//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against SQLite. Every write is a single auto-committed statement; there
//! are no multi-row transactions.

pub mod analyses;
pub mod comparisons;
pub mod context;
pub mod documents;
pub mod metrics;
pub mod models;
pub mod pool;

pub use analyses::AnalysisRepository;
pub use comparisons::ComparisonRepository;
pub use context::DbContext;
pub use documents::DocumentRepository;
pub use metrics::MetricsRepository;
pub use pool::{AsyncSqlitePool, DieselError};

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
