//! Read models returned by the store
//!
//! These types are produced by aggregate queries and are also the unit the
//! class listing cache stores.

use chrono::NaiveTime;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// A class together with its live occupancy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct ClassOccupancy {
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub teacher_name: String,
    pub day_of_week: i32,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub max_students: i32,
    /// Number of enrollment rows for this class
    pub current_students: i64,
}

impl ClassOccupancy {
    pub fn available_seats(&self) -> i64 {
        (i64::from(self.max_students) - self.current_students).max(0)
    }
}

/// Row counts shown on the dashboard
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_parents: u64,
    pub total_classes: u64,
    pub total_registrations: u64,
    pub active_subscriptions: u64,
    pub classes_today: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(max_students: i32, current_students: i64) -> ClassOccupancy {
        ClassOccupancy {
            id: 1,
            name: "Math 4".to_string(),
            subject: "Math".to_string(),
            teacher_name: "Ms. Mai".to_string(),
            day_of_week: 1,
            time_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            time_end: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            max_students,
            current_students,
        }
    }

    #[test]
    fn test_occupancy_seats() {
        assert_eq!(sample(20, 5).available_seats(), 15);
        assert_eq!(sample(2, 3).available_seats(), 0);
    }
}
