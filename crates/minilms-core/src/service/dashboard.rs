//! Dashboard counters

use chrono::NaiveDate;
use sea_orm::*;

use minilms_common::day_of_week_for;
use minilms_persistence::DashboardStats;
use minilms_persistence::entity::{class, enrollment, parent, student, subscription};

/// Summary counts, with "classes today" taken from the local date
pub async fn stats(db: &DatabaseConnection) -> anyhow::Result<DashboardStats> {
    stats_on(db, chrono::Local::now().date_naive()).await
}

/// Summary counts, with "classes today" taken from `today`
pub async fn stats_on(db: &DatabaseConnection, today: NaiveDate) -> anyhow::Result<DashboardStats> {
    let (total_students, total_parents, total_classes, total_registrations) = tokio::try_join!(
        student::Entity::find().count(db),
        parent::Entity::find().count(db),
        class::Entity::find().count(db),
        enrollment::Entity::find().count(db),
    )?;

    let (active_subscriptions, classes_today) = tokio::try_join!(
        subscription::Entity::find()
            .filter(subscription::Column::IsActive.eq(true))
            .count(db),
        class::Entity::find()
            .filter(class::Column::DayOfWeek.eq(day_of_week_for(today)))
            .count(db),
    )?;

    Ok(DashboardStats {
        total_students,
        total_parents,
        total_classes,
        total_registrations,
        active_subscriptions,
        classes_today,
    })
}
