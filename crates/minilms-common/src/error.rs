//! Error types and error codes for Mini LMS
//!
//! This module defines:
//! - `LmsError`: Application-specific error enum
//! - `EntityKind`: Which record a `NotFound` refers to
//! - `ConflictReason`: Why a write was refused
//! - `ErrorCode`: Structured error codes for API responses
//!
//! Services return `anyhow::Result` and raise `LmsError`; callers classify a
//! failure with `err.downcast_ref::<LmsError>()`.

use std::fmt::{Display, Formatter};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Records that can be reported missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Parent,
    Student,
    Class,
    Subscription,
    Registration,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Parent => "parent",
            EntityKind::Student => "student",
            EntityKind::Class => "class",
            EntityKind::Subscription => "subscription",
            EntityKind::Registration => "registration",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reasons a write is refused without touching the store
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    #[error("student is already registered for this class")]
    AlreadyRegistered,

    #[error("class is full ({current}/{max})")]
    ClassFull { current: u64, max: u32 },

    #[error(
        "schedule conflict: student already registered in '{class_name}' ({}-{}) on the same day",
        .start.format("%H:%M"),
        .end.format("%H:%M")
    )]
    ScheduleOverlap {
        class_id: i32,
        class_name: String,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("subscription is not active")]
    Inactive,

    #[error("no remaining sessions")]
    Exhausted,

    #[error("start time must be before end time")]
    InvalidTimeRange,

    #[error("phone number '{0}' already exists")]
    PhoneTaken(String),

    #[error("max students {requested} is below current occupancy {current}")]
    CapacityBelowOccupancy { current: u64, requested: u32 },
}

impl ConflictReason {
    /// Stable machine-readable name of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyRegistered => "already_registered",
            ConflictReason::ClassFull { .. } => "class_full",
            ConflictReason::ScheduleOverlap { .. } => "schedule_overlap",
            ConflictReason::Inactive => "inactive",
            ConflictReason::Exhausted => "exhausted",
            ConflictReason::InvalidTimeRange => "invalid_time_range",
            ConflictReason::PhoneTaken(_) => "phone_taken",
            ConflictReason::CapacityBelowOccupancy { .. } => "capacity_below_occupancy",
        }
    }
}

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum LmsError {
    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("{0}")]
    Conflict(ConflictReason),

    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<ConflictReason> for LmsError {
    fn from(reason: ConflictReason) -> Self {
        LmsError::Conflict(reason)
    }
}

impl LmsError {
    /// Structured code a transport layer should report for this error
    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            LmsError::NotFound(_) => RESOURCE_NOT_FOUND,
            LmsError::Conflict(reason) => match reason {
                ConflictReason::AlreadyRegistered => ALREADY_REGISTERED,
                ConflictReason::ClassFull { .. } => CLASS_FULL,
                ConflictReason::ScheduleOverlap { .. } => SCHEDULE_OVERLAP,
                ConflictReason::Inactive => SUBSCRIPTION_INACTIVE,
                ConflictReason::Exhausted => SESSIONS_EXHAUSTED,
                ConflictReason::InvalidTimeRange => INVALID_TIME_RANGE,
                ConflictReason::PhoneTaken(_) => PHONE_ALREADY_EXIST,
                ConflictReason::CapacityBelowOccupancy { .. } => CAPACITY_BELOW_OCCUPANCY,
            },
            LmsError::IllegalArgument(_) => PARAMETER_VALIDATE_ERROR,
            LmsError::DatabaseError(_) => DATA_ACCESS_ERROR,
            LmsError::ConfigError(_) => SERVER_ERROR,
        }
    }

    /// HTTP status a transport layer should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            LmsError::NotFound(_) => 404,
            LmsError::Conflict(_) | LmsError::IllegalArgument(_) => 400,
            LmsError::DatabaseError(_) | LmsError::ConfigError(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LmsError::NotFound(_))
    }

    /// The conflict reason, if this is a `Conflict`
    pub fn conflict(&self) -> Option<&ConflictReason> {
        match self {
            LmsError::Conflict(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General error codes
pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

// Enrollment errors
pub const ALREADY_REGISTERED: ErrorCode<'static> = ErrorCode {
    code: 21000,
    message: "student already registered",
};

pub const CLASS_FULL: ErrorCode<'static> = ErrorCode {
    code: 21001,
    message: "class is full",
};

pub const SCHEDULE_OVERLAP: ErrorCode<'static> = ErrorCode {
    code: 21002,
    message: "schedule overlap",
};

pub const INVALID_TIME_RANGE: ErrorCode<'static> = ErrorCode {
    code: 21003,
    message: "invalid time range",
};

pub const CAPACITY_BELOW_OCCUPANCY: ErrorCode<'static> = ErrorCode {
    code: 21004,
    message: "capacity below current occupancy",
};

// Subscription errors
pub const SUBSCRIPTION_INACTIVE: ErrorCode<'static> = ErrorCode {
    code: 22000,
    message: "subscription inactive",
};

pub const SESSIONS_EXHAUSTED: ErrorCode<'static> = ErrorCode {
    code: 22001,
    message: "sessions exhausted",
};

// Parent errors
pub const PHONE_ALREADY_EXIST: ErrorCode<'static> = ErrorCode {
    code: 23000,
    message: "phone already exist",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
