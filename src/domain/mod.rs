//! Core lending rules
//!
//! Pure, clock-injected rule checks for stock counters, reservations and
//! schedules. Services load the aggregates, run these checks with a single
//! `now` captured at the start of the use case, and only then write —
//! every guard runs before the first mutation.

pub mod reservation_rules;
pub mod schedule_rules;
pub mod stock;
