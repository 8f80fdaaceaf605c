//! Mini LMS Core - Enrollment engine and entity services
//!
//! This crate provides:
//! - The enrollment engine (register, unregister, rosters, timetables)
//! - The read-through cache of the class listing with occupancy
//! - Weekly time slot overlap detection
//! - Parent, student, class and subscription services
//! - Dashboard counters

pub mod cache;
pub mod model;
pub mod schedule;
pub mod service;
pub mod validation;

pub use cache::{ClassListingCache, ListingCache, ListingSnapshot, MokaListingCache, NoopListingCache};
pub use schedule::TimeSlot;
