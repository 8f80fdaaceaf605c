//! Concurrent writes against a file-backed database
//!
//! Every test here runs on a multi-connection pool, so competing transactions
//! really meet in the store. Losers must fail with a domain conflict, never a
//! raw database error.

mod common;

use futures::future::join_all;

use common::*;
use minilms_common::ConflictReason;
use minilms_core::model::SubscriptionPatch;
use minilms_core::service::{enrollment, subscription};

const CONNECTIONS: u32 = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_respects_capacity() {
    let ctx = setup_pooled(CONNECTIONS).await;
    let students = create_students(&ctx, 10).await;
    let class = create_class(&ctx, "Popular", 6, t(9, 0), t(10, 0), 3).await;

    let tasks = students.iter().map(|student| {
        let db = ctx.db.clone();
        let cache = ctx.cache.clone();
        let (class_id, student_id) = (class.id, student.id);
        tokio::spawn(async move { enrollment::register(&db, &cache, class_id, student_id).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 3);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(
            conflict(err),
            &ConflictReason::ClassFull { current: 3, max: 3 }
        );
    }

    let roster = enrollment::list_class_students(&ctx.db, class.id).await.unwrap();
    assert_eq!(roster.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_registrations_admit_one() {
    let ctx = setup_pooled(CONNECTIONS).await;
    let students = create_students(&ctx, 1).await;
    let mut classes = Vec::new();
    for i in 0..5 {
        classes.push(create_class(&ctx, &format!("Slot {}", i), 5, t(10, 0), t(11, 0), 20).await);
    }

    let tasks = classes.iter().map(|class| {
        let db = ctx.db.clone();
        let cache = ctx.cache.clone();
        let (class_id, student_id) = (class.id, students[0].id);
        tokio::spawn(async move { enrollment::register(&db, &cache, class_id, student_id).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            conflict(err),
            ConflictReason::ScheduleOverlap { .. }
        ));
    }

    let timetable = enrollment::list_student_classes(&ctx.db, students[0].id)
        .await
        .unwrap();
    assert_eq!(timetable.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_and_unregister() {
    let ctx = setup_pooled(CONNECTIONS).await;
    let students = create_students(&ctx, 6).await;
    let class = create_class(&ctx, "Math 4", 2, t(8, 0), t(9, 30), 20).await;
    for student in &students[..3] {
        enrollment::register(&ctx.db, &ctx.cache, class.id, student.id)
            .await
            .unwrap();
    }

    let leaving = students[..3].iter().map(|student| {
        let db = ctx.db.clone();
        let cache = ctx.cache.clone();
        let (class_id, student_id) = (class.id, student.id);
        tokio::spawn(async move {
            enrollment::unregister(&db, &cache, class_id, student_id)
                .await
                .map(|_| ())
        })
    });
    let joining = students[3..].iter().map(|student| {
        let db = ctx.db.clone();
        let cache = ctx.cache.clone();
        let (class_id, student_id) = (class.id, student.id);
        tokio::spawn(async move {
            enrollment::register(&db, &cache, class_id, student_id)
                .await
                .map(|_| ())
        })
    });

    for joined in join_all(leaving.chain(joining)).await {
        joined.unwrap().unwrap();
    }

    let roster: Vec<i32> = enrollment::list_class_students(&ctx.db, class.id)
        .await
        .unwrap()
        .into_iter()
        .map(|student| student.id)
        .collect();
    let expected: Vec<i32> = students[3..].iter().map(|student| student.id).collect();
    assert_eq!(roster, expected);

    let listing = enrollment::list_classes_with_occupancy(&ctx.db, &ctx.cache, 0, PAGE_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing[0].current_students, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_use_session_never_overdraws() {
    let ctx = setup_pooled(CONNECTIONS).await;
    let students = create_students(&ctx, 1).await;
    let sub = create_subscription(&ctx, students[0].id, 10).await;
    subscription::update(
        &ctx.db,
        sub.id,
        SubscriptionPatch {
            used_sessions: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let tasks = (0..8).map(|_| {
        let db = ctx.db.clone();
        let subscription_id = sub.id;
        tokio::spawn(async move { subscription::use_session(&db, subscription_id).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 5);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(conflict(err), &ConflictReason::Exhausted);
    }

    let stored = subscription::find_by_id(&ctx.db, sub.id).await.unwrap();
    assert_eq!(stored.used_sessions, 10);
    assert!(!stored.is_active);
}
