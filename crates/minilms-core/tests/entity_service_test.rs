//! Parent, student, subscription and dashboard service integration tests

mod common;

use sea_orm::{EntityTrait, PaginatorTrait};

use common::*;
use minilms_common::{ConflictReason, EntityKind, LmsError, day_of_week_for};
use minilms_core::model::{NewParent, NewStudent, NewSubscription, ParentPatch, StudentPatch, SubscriptionPatch};
use minilms_core::service::{dashboard, enrollment, parent, student, subscription};
use minilms_persistence::entity::{enrollment as enrollment_entity, subscription as subscription_entity};

#[tokio::test]
async fn test_parent_phone_is_unique() {
    let ctx = setup().await;
    let first = create_parent(&ctx, "0901234567").await;
    let second = create_parent(&ctx, "0912345678").await;

    let err = parent::create(
        &ctx.db,
        NewParent {
            name: "Someone else".to_string(),
            phone: "0901234567".to_string(),
            email: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        conflict(&err),
        &ConflictReason::PhoneTaken("0901234567".to_string())
    );

    // Keeping the same phone is not a conflict
    let updated = parent::update(
        &ctx.db,
        first.id,
        ParentPatch {
            name: Some("Nguyen Van A".to_string()),
            phone: Some("0901234567".to_string()),
            email: Some("a@example.com".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Nguyen Van A");
    assert_eq!(updated.email.as_deref(), Some("a@example.com"));

    let err = parent::update(
        &ctx.db,
        second.id,
        ParentPatch {
            phone: Some("0901234567".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(conflict(&err), ConflictReason::PhoneTaken(_)));
}

#[tokio::test]
async fn test_parent_find_and_children() {
    let ctx = setup().await;
    let created = create_parent(&ctx, "0901234567").await;
    let child = create_student(&ctx, created.id, "Minh").await;

    assert_eq!(parent::find_by_id(&ctx.db, created.id).await.unwrap(), created);
    assert_eq!(
        parent::find_students(&ctx.db, created.id).await.unwrap(),
        vec![child]
    );
    assert_eq!(parent::find_all(&ctx.db, 0, 10).await.unwrap().len(), 1);

    let err = parent::find_by_id(&ctx.db, 999).await.unwrap_err();
    assert_not_found(&err, EntityKind::Parent);
}

#[tokio::test]
async fn test_parent_delete_cascades_and_refreshes_listing() {
    let ctx = setup().await;
    let created = create_parent(&ctx, "0901234567").await;
    let child = create_student(&ctx, created.id, "Minh").await;
    let class = create_class(&ctx, "Math 4", 1, t(8, 0), t(9, 30), 20).await;
    enrollment::register(&ctx.db, &ctx.cache, class.id, child.id)
        .await
        .unwrap();
    create_subscription(&ctx, child.id, 10).await;

    let listing = enrollment::list_classes_with_occupancy(&ctx.db, &ctx.cache, 0, PAGE_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing[0].current_students, 1);

    parent::delete(&ctx.db, &ctx.cache, created.id).await.unwrap();

    let err = student::find_by_id(&ctx.db, child.id).await.unwrap_err();
    assert_not_found(&err, EntityKind::Student);
    assert_eq!(
        enrollment_entity::Entity::find().count(&ctx.db).await.unwrap(),
        0
    );
    assert_eq!(
        subscription_entity::Entity::find().count(&ctx.db).await.unwrap(),
        0
    );

    let listing = enrollment::list_classes_with_occupancy(&ctx.db, &ctx.cache, 0, PAGE_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing[0].current_students, 0);

    let err = parent::delete(&ctx.db, &ctx.cache, created.id).await.unwrap_err();
    assert_not_found(&err, EntityKind::Parent);
}

#[tokio::test]
async fn test_student_requires_parent() {
    let ctx = setup().await;

    let err = student::create(
        &ctx.db,
        NewStudent {
            name: "Minh".to_string(),
            parent_id: 42,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_not_found(&err, EntityKind::Parent);

    let err = student::create(
        &ctx.db,
        NewStudent {
            name: "Minh".to_string(),
            gender: Some("Unknown".to_string()),
            parent_id: 42,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(lms_error(&err), LmsError::IllegalArgument(_)));
}

#[tokio::test]
async fn test_student_with_parent_name_and_update() {
    let ctx = setup().await;
    let mother = create_parent(&ctx, "0901234567").await;
    let father = create_parent(&ctx, "0912345678").await;
    let child = create_student(&ctx, mother.id, "Minh").await;

    let found = student::find_by_id(&ctx.db, child.id).await.unwrap();
    assert_eq!(found.student, child);
    assert_eq!(found.parent_name.as_deref(), Some(mother.name.as_str()));

    let updated = student::update(
        &ctx.db,
        child.id,
        StudentPatch {
            current_grade: Some(5),
            parent_id: Some(father.id),
            dob: Some(date(2015, 3, 14)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Minh");
    assert_eq!(updated.current_grade, Some(5));
    assert_eq!(updated.parent_id, father.id);

    let err = student::update(
        &ctx.db,
        child.id,
        StudentPatch {
            parent_id: Some(999),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_not_found(&err, EntityKind::Parent);

    let all = student::find_all(&ctx.db, 0, PAGE_LIMIT).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].parent_name.as_deref(), Some(father.name.as_str()));
}

#[tokio::test]
async fn test_student_delete_refreshes_listing() {
    let ctx = setup().await;
    let students = create_students(&ctx, 1).await;
    let class = create_class(&ctx, "Math 4", 1, t(8, 0), t(9, 30), 20).await;
    enrollment::register(&ctx.db, &ctx.cache, class.id, students[0].id)
        .await
        .unwrap();
    enrollment::list_classes_with_occupancy(&ctx.db, &ctx.cache, 0, PAGE_LIMIT)
        .await
        .unwrap();

    student::delete(&ctx.db, &ctx.cache, students[0].id)
        .await
        .unwrap();

    let listing = enrollment::list_classes_with_occupancy(&ctx.db, &ctx.cache, 0, PAGE_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing[0].current_students, 0);
}

#[tokio::test]
async fn test_use_session_until_exhausted() {
    let ctx = setup().await;
    let students = create_students(&ctx, 1).await;
    let sub = create_subscription(&ctx, students[0].id, 5).await;
    subscription::update(
        &ctx.db,
        sub.id,
        SubscriptionPatch {
            used_sessions: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let used = subscription::use_session(&ctx.db, sub.id).await.unwrap();
    assert_eq!(used.used_sessions, 5);
    assert!(!used.is_active);
    assert_eq!(used.remaining_sessions(), 0);

    let err = subscription::use_session(&ctx.db, sub.id).await.unwrap_err();
    assert_eq!(conflict(&err), &ConflictReason::Exhausted);

    let stored = subscription::find_by_id(&ctx.db, sub.id).await.unwrap();
    assert_eq!(stored.used_sessions, 5);
}

#[tokio::test]
async fn test_use_session_on_inactive_or_missing() {
    let ctx = setup().await;
    let students = create_students(&ctx, 1).await;
    let sub = create_subscription(&ctx, students[0].id, 10).await;
    subscription::update(
        &ctx.db,
        sub.id,
        SubscriptionPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = subscription::use_session(&ctx.db, sub.id).await.unwrap_err();
    assert_eq!(conflict(&err), &ConflictReason::Inactive);

    let err = subscription::use_session(&ctx.db, 999).await.unwrap_err();
    assert_not_found(&err, EntityKind::Subscription);
}

#[tokio::test]
async fn test_subscription_counters_are_validated() {
    let ctx = setup().await;
    let students = create_students(&ctx, 1).await;
    let sub = create_subscription(&ctx, students[0].id, 5).await;
    assert!(sub.is_active);
    assert_eq!(sub.used_sessions, 0);

    let err = subscription::update(
        &ctx.db,
        sub.id,
        SubscriptionPatch {
            used_sessions: Some(6),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(lms_error(&err), LmsError::IllegalArgument(_)));

    // Reaching the total through an update deactivates as well
    let updated = subscription::update(
        &ctx.db,
        sub.id,
        SubscriptionPatch {
            used_sessions: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(!updated.is_active);

    let err = subscription::create(
        &ctx.db,
        NewSubscription {
            student_id: students[0].id,
            package_name: "Summer".to_string(),
            total_sessions: 8,
            start_date: date(2025, 8, 1),
            end_date: date(2025, 6, 1),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(lms_error(&err), LmsError::IllegalArgument(_)));

    let err = subscription::create(
        &ctx.db,
        NewSubscription {
            student_id: 999,
            package_name: "Summer".to_string(),
            total_sessions: 8,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 8, 1),
        },
    )
    .await
    .unwrap_err();
    assert_not_found(&err, EntityKind::Student);
}

#[tokio::test]
async fn test_subscriptions_by_student_and_delete() {
    let ctx = setup().await;
    let students = create_students(&ctx, 2).await;
    let first = create_subscription(&ctx, students[0].id, 5).await;
    let second = create_subscription(&ctx, students[0].id, 10).await;
    create_subscription(&ctx, students[1].id, 8).await;

    let held = subscription::find_by_student(&ctx.db, students[0].id)
        .await
        .unwrap();
    assert_eq!(held, vec![first.clone(), second]);
    assert_eq!(subscription::find_all(&ctx.db, 0, PAGE_LIMIT).await.unwrap().len(), 3);

    subscription::delete(&ctx.db, first.id).await.unwrap();
    let err = subscription::delete(&ctx.db, first.id).await.unwrap_err();
    assert_not_found(&err, EntityKind::Subscription);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let ctx = setup().await;
    let students = create_students(&ctx, 2).await;
    let monday = date(2025, 3, 3);
    let today = day_of_week_for(monday);
    assert_eq!(today, 1);

    let class = create_class(&ctx, "Math 4", today, t(8, 0), t(9, 30), 20).await;
    create_class(&ctx, "English 4", 3, t(8, 0), t(9, 30), 20).await;
    enrollment::register(&ctx.db, &ctx.cache, class.id, students[0].id)
        .await
        .unwrap();
    let sub = create_subscription(&ctx, students[1].id, 1).await;
    create_subscription(&ctx, students[0].id, 4).await;
    subscription::use_session(&ctx.db, sub.id).await.unwrap();

    let stats = dashboard::stats_on(&ctx.db, monday).await.unwrap();
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_parents, 1);
    assert_eq!(stats.total_classes, 2);
    assert_eq!(stats.total_registrations, 1);
    assert_eq!(stats.active_subscriptions, 1);
    assert_eq!(stats.classes_today, 1);
}
