//! SeaORM entity definitions
//!
//! Relationships are explicit foreign keys with `ON DELETE CASCADE`; nothing is
//! loaded lazily, every operation issues its own queries.

pub mod prelude;

pub mod class;
pub mod enrollment;
pub mod parent;
pub mod student;
pub mod subscription;
