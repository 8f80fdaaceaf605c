//! Common test utilities for the service integration tests
//!
//! This module provides:
//! - `TestContext`: an in-memory SQLite database with the schema applied and a listing cache
//! - `setup_pooled`: a file-backed SQLite database behind a multi-connection pool
//! - Fixture helpers creating parents, students, classes and subscriptions
//! - `UnreachableCache`: a listing cache whose every call fails

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

use minilms_common::{ConflictReason, EntityKind, LmsError};
use minilms_core::model::{NewClass, NewParent, NewStudent, NewSubscription};
use minilms_core::service::{class, parent, student, subscription};
use minilms_core::{ClassListingCache, ListingCache, ListingSnapshot};
use minilms_migration::{Migrator, MigratorTrait};
use minilms_persistence::entity::{class as class_entity, parent as parent_entity};
use minilms_persistence::entity::{student as student_entity, subscription as subscription_entity};

/// Page limit used by every test context
pub const PAGE_LIMIT: u64 = 100;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub cache: ListingCache,
    /// Holds the database file of a pooled context
    _dir: Option<TempDir>,
}

/// Fresh database with an in-process listing cache
pub async fn setup() -> TestContext {
    setup_with_cache(ListingCache::in_memory(Duration::from_secs(60), PAGE_LIMIT)).await
}

/// Fresh database with the given listing cache
pub async fn setup_with_cache(cache: ListingCache) -> TestContext {
    // A single connection keeps every query on the same in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to apply migrations");

    TestContext {
        db,
        cache,
        _dir: None,
    }
}

/// Fresh file-backed database behind a pool of `connections`
///
/// Unlike the in-memory context, transactions here run on separate
/// connections and really contend for the database locks.
pub async fn setup_pooled(connections: u32) -> TestContext {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("minilms.db").display());

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open database file");
    Migrator::up(&db, None)
        .await
        .expect("Failed to apply migrations");

    TestContext {
        db,
        cache: ListingCache::in_memory(Duration::from_secs(60), PAGE_LIMIT),
        _dir: Some(dir),
    }
}

pub fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub async fn create_parent(ctx: &TestContext, phone: &str) -> parent_entity::Model {
    parent::create(
        &ctx.db,
        NewParent {
            name: format!("Parent {}", phone),
            phone: phone.to_string(),
            email: None,
        },
    )
    .await
    .expect("Failed to create parent")
}

pub async fn create_student(ctx: &TestContext, parent_id: i32, name: &str) -> student_entity::Model {
    student::create(
        &ctx.db,
        NewStudent {
            name: name.to_string(),
            parent_id,
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create student")
}

/// A parent with `count` children
pub async fn create_students(ctx: &TestContext, count: usize) -> Vec<student_entity::Model> {
    let parent = create_parent(ctx, "0900000000").await;
    let mut students = Vec::with_capacity(count);
    for i in 0..count {
        students.push(create_student(ctx, parent.id, &format!("Student {}", i)).await);
    }
    students
}

pub async fn create_class(
    ctx: &TestContext,
    name: &str,
    day_of_week: i32,
    start: NaiveTime,
    end: NaiveTime,
    max_students: i32,
) -> class_entity::Model {
    class::create(
        &ctx.db,
        &ctx.cache,
        NewClass {
            name: name.to_string(),
            subject: "Math".to_string(),
            teacher_name: "Ms. Mai".to_string(),
            day_of_week,
            time_start: start,
            time_end: end,
            max_students,
        },
    )
    .await
    .expect("Failed to create class")
}

pub async fn create_subscription(
    ctx: &TestContext,
    student_id: i32,
    total_sessions: i32,
) -> subscription_entity::Model {
    subscription::create(
        &ctx.db,
        NewSubscription {
            student_id,
            package_name: format!("{} sessions", total_sessions),
            total_sessions,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 6, 30),
        },
    )
    .await
    .expect("Failed to create subscription")
}

/// The `LmsError` carried by a failed service call
pub fn lms_error(err: &anyhow::Error) -> &LmsError {
    err.downcast_ref::<LmsError>()
        .unwrap_or_else(|| panic!("not an LmsError: {:?}", err))
}

pub fn assert_not_found(err: &anyhow::Error, kind: EntityKind) {
    match lms_error(err) {
        LmsError::NotFound(found) => assert_eq!(*found, kind),
        other => panic!("expected {} not found, got {:?}", kind, other),
    }
}

pub fn conflict(err: &anyhow::Error) -> &ConflictReason {
    lms_error(err)
        .conflict()
        .unwrap_or_else(|| panic!("expected a conflict, got {:?}", err))
}

/// Listing cache whose every call fails, counting the attempts
#[derive(Default)]
pub struct UnreachableCache {
    pub calls: AtomicUsize,
}

impl UnreachableCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassListingCache for UnreachableCache {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<ListingSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("cache unreachable")
    }

    async fn set(&self, _key: &str, _value: ListingSnapshot, _ttl: Duration) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("cache unreachable")
    }

    async fn delete(&self, _key: &str) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("cache unreachable")
    }
}

pub fn unreachable_cache() -> (Arc<UnreachableCache>, ListingCache) {
    let backend = Arc::new(UnreachableCache::default());
    let cache = ListingCache::new(backend.clone(), Duration::from_secs(60), PAGE_LIMIT);
    (backend, cache)
}
