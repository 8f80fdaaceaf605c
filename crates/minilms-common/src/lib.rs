//! Mini LMS Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Mini LMS components:
//! - Error types and error codes
//! - Day-of-week convention helpers
//! - Common constants

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ConflictReason, EntityKind, ErrorCode, LmsError};
pub use utils::{day_name, day_of_week, day_of_week_for, is_valid_day_of_week};

/// Cache key of the "classes with occupancy" snapshot
pub const CLASSES_CACHE_KEY: &str = "classes:all";

/// Default lifetime of the cached class listing, in seconds
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;

/// Page size of list endpoints; offset 0 with this limit is the cached window
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// Capacity of a class created without an explicit `max_students`
pub const DEFAULT_MAX_STUDENTS: i32 = 30;
