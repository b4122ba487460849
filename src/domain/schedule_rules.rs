//! Scheduling guards: pickup-date legality and duplicate-booking throttle

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, schedule::ScheduleDetails},
};

/// A pickup may be booked at most this many days ahead
pub const PICKUP_WINDOW_DAYS: i64 = 7;

/// Look-back window for the duplicate-booking throttle, in days
pub const DUPLICATE_WINDOW_DAYS: i64 = 30;

/// A book already appearing in this many recent schedules cannot be booked again
pub const DUPLICATE_SCHEDULE_LIMIT: usize = 2;

/// Start of the duplicate-booking look-back window
pub fn duplicate_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(DUPLICATE_WINDOW_DAYS)
}

/// Validate the requested pickup date
///
/// The date must not lie in the past, must fall within the booking window,
/// and must not be a Sunday (the library is closed). Date comparisons use
/// calendar days so a booking for later today is still legal.
pub fn validate_pickup_date(now: DateTime<Utc>, pickup: DateTime<Utc>) -> AppResult<()> {
    let today = now.date_naive();
    let pickup_day = pickup.date_naive();

    if pickup_day < today {
        return Err(AppError::ScheduleDeadlineExceeded(
            "Pickup date has already passed".to_string(),
        ));
    }
    if pickup_day > today + Duration::days(PICKUP_WINDOW_DAYS) {
        return Err(AppError::ScheduleDeadlineExceeded(format!(
            "Pickup date must be within {} days",
            PICKUP_WINDOW_DAYS
        )));
    }
    if pickup_day.weekday() == Weekday::Sun {
        return Err(AppError::ScheduleDeadlineExceeded(
            "The library is closed on Sundays".to_string(),
        ));
    }
    Ok(())
}

/// Throttle repeated bookings of the same book
///
/// `recent` holds the patron's schedules created within the look-back
/// window, regardless of status. A requested book already present in
/// `DUPLICATE_SCHEDULE_LIMIT` or more of them is rejected; all offenders
/// are named.
pub fn check_duplicate_bookings(recent: &[ScheduleDetails], requested: &[Book]) -> AppResult<()> {
    let offenders: Vec<String> = requested
        .iter()
        .filter(|book| {
            recent.iter().filter(|s| s.contains_book(book.id)).count()
                >= DUPLICATE_SCHEDULE_LIMIT
        })
        .map(|book| book.title.clone())
        .collect();

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(AppError::DuplicateScheduleLimitExceeded(offenders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::{ScheduleLine, ScheduleStatus};
    use chrono::TimeZone;

    // a Monday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn book(id: i32, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author_id: None,
            publisher_id: None,
            quantity: 3,
            available: 3,
            crea_date: now(),
            modif_date: None,
        }
    }

    fn schedule(id: i32, status: ScheduleStatus, book_ids: &[i32]) -> ScheduleDetails {
        ScheduleDetails {
            id,
            user_id: 1,
            pickup_date: now() + Duration::days(1),
            status,
            crea_date: now() - Duration::days(5),
            lines: book_ids
                .iter()
                .map(|&book_id| ScheduleLine {
                    id: book_id,
                    schedule_id: id,
                    book_id,
                    book_title: format!("Book {book_id}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_pickup_within_window_accepted() {
        assert!(validate_pickup_date(now(), now()).is_ok());
        assert!(validate_pickup_date(now(), now() + Duration::days(5)).is_ok());
        // exactly seven days out, a Monday
        assert!(validate_pickup_date(now(), now() + Duration::days(7)).is_ok());
    }

    #[test]
    fn test_pickup_in_the_past_rejected() {
        let err = validate_pickup_date(now(), now() - Duration::days(1)).unwrap_err();
        assert!(matches!(err, AppError::ScheduleDeadlineExceeded(_)));
        // earlier the same day is still fine, comparison is per calendar day
        assert!(validate_pickup_date(now(), now() - Duration::hours(2)).is_ok());
    }

    #[test]
    fn test_pickup_beyond_window_rejected() {
        assert!(validate_pickup_date(now(), now() + Duration::days(8)).is_err());
        assert!(validate_pickup_date(now(), now() + Duration::days(30)).is_err());
    }

    #[test]
    fn test_sunday_pickup_rejected() {
        // 2025-03-16 is a Sunday, six days after the pinned Monday
        let sunday = now() + Duration::days(6);
        assert_eq!(sunday.date_naive().weekday(), Weekday::Sun);
        assert!(validate_pickup_date(now(), sunday).is_err());
        // the Saturday before passes
        assert!(validate_pickup_date(now(), now() + Duration::days(5)).is_ok());
    }

    #[test]
    fn test_duplicate_throttle_counts_any_status() {
        // two prior bookings of book 1, one pending and one canceled
        let recent = vec![
            schedule(1, ScheduleStatus::Pending, &[1]),
            schedule(2, ScheduleStatus::Canceled, &[1, 2]),
        ];
        let err = check_duplicate_bookings(&recent, &[book(1, "Dune")]).unwrap_err();
        match err {
            AppError::DuplicateScheduleLimitExceeded(titles) => {
                assert_eq!(titles, vec!["Dune".to_string()]);
            }
            other => panic!("expected DuplicateScheduleLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_single_prior_booking_passes() {
        let recent = vec![schedule(1, ScheduleStatus::Pending, &[1])];
        assert!(check_duplicate_bookings(&recent, &[book(1, "Dune")]).is_ok());
    }

    #[test]
    fn test_throttle_names_every_offender() {
        let recent = vec![
            schedule(1, ScheduleStatus::Pending, &[1, 2]),
            schedule(2, ScheduleStatus::Finished, &[1, 2]),
        ];
        let requested = vec![book(1, "Dune"), book(2, "Solaris"), book(3, "Ubik")];
        match check_duplicate_bookings(&recent, &requested) {
            Err(AppError::DuplicateScheduleLimitExceeded(titles)) => {
                assert_eq!(titles, vec!["Dune".to_string(), "Solaris".to_string()]);
            }
            other => panic!("expected DuplicateScheduleLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_no_recent_schedules_passes() {
        assert!(check_duplicate_bookings(&[], &[book(1, "Dune")]).is_ok());
    }
}
