//! Mini LMS Persistence - Database entities and store primitives
//!
//! This crate provides:
//! - SeaORM entity definitions for parents, students, classes, enrollments and subscriptions
//! - Store primitives the enrollment engine runs inside its transactions
//! - Read model types produced by aggregate queries

pub mod entity;
pub mod model;
pub mod store;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export model types
pub use model::{ClassOccupancy, DashboardStats};
