//! CLI command dispatch
//!
//! Each command runs one service operation and renders its result as JSON.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{Value, json};

use minilms_common::{LmsError, day_name};
use minilms_core::ListingCache;
use minilms_persistence::ClassOccupancy;
use minilms_core::service::{dashboard, enrollment, subscription};
use minilms_migration::{Migrator, MigratorTrait};

use crate::config::{Command, Configuration};
use crate::seed;

/// A listing row as the `classes` command prints it
#[derive(Debug, Serialize)]
pub struct ClassListingRow {
    #[serde(flatten)]
    pub class: ClassOccupancy,
    pub day_name: Option<&'static str>,
    pub available_seats: i64,
}

impl From<ClassOccupancy> for ClassListingRow {
    fn from(class: ClassOccupancy) -> Self {
        Self {
            day_name: day_name(class.day_of_week),
            available_seats: class.available_seats(),
            class,
        }
    }
}

/// Connect, bring the schema up to date and execute `command`
pub async fn run(configuration: &Configuration, command: Command) -> anyhow::Result<Value> {
    let db = configuration.database_connection().await?;

    Migrator::up(&db, None).await?;

    let cache = configuration.listing_cache();

    execute(&db, &cache, command).await
}

/// Execute `command` against a migrated database
pub async fn execute(
    db: &DatabaseConnection,
    cache: &ListingCache,
    command: Command,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::Migrate => {
            let applied = Migrator::get_applied_migrations(db).await?;
            json!({ "applied": applied.iter().map(|m| m.name()).collect::<Vec<_>>() })
        }
        Command::Seed => serde_json::to_value(seed::seed(db, cache).await?)?,
        Command::Stats => serde_json::to_value(dashboard::stats(db).await?)?,
        Command::Classes { offset, limit } => {
            let limit = limit.unwrap_or(cache.page_limit());
            let rows: Vec<ClassListingRow> =
                enrollment::list_classes_with_occupancy(db, cache, offset, limit)
                    .await?
                    .into_iter()
                    .map(ClassListingRow::from)
                    .collect();
            serde_json::to_value(rows)?
        }
        Command::Register {
            class_id,
            student_id,
        } => serde_json::to_value(enrollment::register(db, cache, class_id, student_id).await?)?,
        Command::Unregister {
            class_id,
            student_id,
        } => {
            enrollment::unregister(db, cache, class_id, student_id).await?;
            json!({ "class_id": class_id, "student_id": student_id, "unregistered": true })
        }
        Command::Roster { class_id } => {
            serde_json::to_value(enrollment::list_class_students(db, class_id).await?)?
        }
        Command::Timetable { student_id } => {
            serde_json::to_value(enrollment::list_student_classes(db, student_id).await?)?
        }
        Command::UseSession { subscription_id } => {
            serde_json::to_value(subscription::use_session(db, subscription_id).await?)?
        }
    };

    Ok(output)
}

/// JSON body describing a failed command
///
/// Domain errors carry their structured code and the HTTP status a transport
/// layer would answer with; anything else is reported as a server error.
pub fn error_response(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<LmsError>() {
        Some(lms) => json!({
            "error": lms.to_string(),
            "error_code": lms.error_code(),
            "http_status": lms.http_status(),
            "reason": lms.conflict().map(|reason| reason.as_str()),
        }),
        None => json!({
            "error": err.to_string(),
            "http_status": 500,
        }),
    }
}
