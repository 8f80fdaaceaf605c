//! Weekly time slots and overlap detection
//!
//! A class occupies the half-open range `[start, end)` of one day of the week.
//! Two slots collide only when they share the day and their ranges intersect;
//! back-to-back slots (one ends exactly when the other starts) do not collide.

use chrono::NaiveTime;

use minilms_common::{ConflictReason, LmsError};
use minilms_persistence::entity::class;

/// Number of enrollments per student the linear overlap scan is sized for
///
/// The scan walks every class the student holds. Timetables past this size
/// still work but are logged, since the store then returns a long list on
/// every registration.
pub const EXPECTED_MAX_ENROLLMENTS_PER_STUDENT: usize = 32;

/// One weekly occurrence of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// 0 = Sunday, 1 = Monday, ..., 6 = Saturday
    pub day_of_week: i32,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(day_of_week: i32, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            day_of_week,
            start,
            end,
        }
    }

    pub fn of(class: &class::Model) -> Self {
        Self::new(class.day_of_week, class.time_start, class.time_end)
    }

    /// `start` strictly before `end`
    pub fn is_valid_range(&self) -> bool {
        self.start < self.end
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day_of_week == other.day_of_week && self.start < other.end && self.end > other.start
    }
}

/// First class in `existing` whose slot overlaps `target`
///
/// `existing` is scanned in the order given, which is ascending class id when
/// it comes from the store. The class with id `skip_class` is ignored; pass the
/// class being moved when checking an update against its own roster.
pub fn find_overlap<'a>(
    target: &TimeSlot,
    existing: &'a [class::Model],
    skip_class: Option<i32>,
) -> Option<&'a class::Model> {
    if existing.len() > EXPECTED_MAX_ENROLLMENTS_PER_STUDENT {
        tracing::debug!(
            enrollments = existing.len(),
            "Overlap scan over an unusually large timetable"
        );
    }

    existing
        .iter()
        .filter(|class| Some(class.id) != skip_class)
        .find(|class| target.overlaps(&TimeSlot::of(class)))
}

/// Fails with `schedule_overlap` naming the first conflicting class
pub fn ensure_no_overlap(
    target: &TimeSlot,
    existing: &[class::Model],
    skip_class: Option<i32>,
) -> Result<(), LmsError> {
    match find_overlap(target, existing, skip_class) {
        Some(conflict) => Err(ConflictReason::ScheduleOverlap {
            class_id: conflict.id,
            class_name: conflict.name.clone(),
            start: conflict.time_start,
            end: conflict.time_end,
        }
        .into()),
        None => Ok(()),
    }
}
