//! Service layer
//!
//! Functions take the database connection explicitly, return `anyhow::Result`
//! and raise [`LmsError`](minilms_common::LmsError) for every refusal the
//! caller should tell apart.

pub mod class;
pub mod dashboard;
pub mod enrollment;
pub mod parent;
pub mod student;
pub mod subscription;

use sea_orm::{DbErr, SqlErr};

/// Whether a store error is a unique constraint violation
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
