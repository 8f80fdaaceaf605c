//! Mini LMS schema migrations
//!
//! Tables are created with explicit foreign keys (`ON DELETE CASCADE`) and the
//! `uq_class_student` unique index that backs the one-enrollment-per-pair rule.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_tables::Migration)]
    }
}
