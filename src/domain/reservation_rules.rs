//! Reservation guards and lifecycle rules
//!
//! All checks operate on aggregates already loaded by the service layer;
//! nothing here touches the database or the wall clock.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, reservation::ReservationLine},
};

/// Maximum unreturned items a patron may hold across all reservations
pub const MAX_HELD_ITEMS: i64 = 3;

/// Loan period and extension length, in days
pub const LOAN_PERIOD_DAYS: i64 = 30;

/// Expiration date for a line created now
pub fn initial_expiration(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(LOAN_PERIOD_DAYS)
}

/// A request may name each book at most once
pub fn check_distinct_books(book_ids: &[i32]) -> AppResult<()> {
    let mut seen = std::collections::HashSet::with_capacity(book_ids.len());
    if book_ids.iter().any(|id| !seen.insert(*id)) {
        return Err(AppError::BadRequest(
            "Duplicate book ids in request".to_string(),
        ));
    }
    Ok(())
}

/// Reject when any requested book has no loanable copy, naming every offender
pub fn check_availability(books: &[Book]) -> AppResult<()> {
    let unavailable: Vec<String> = books
        .iter()
        .filter(|b| b.available == 0)
        .map(|b| b.title.clone())
        .collect();
    if unavailable.is_empty() {
        Ok(())
    } else {
        Err(AppError::BookNotAvailable(unavailable))
    }
}

/// Cap the number of unreturned items a patron may hold
///
/// `held` counts unreturned lines across all of the patron's reservations.
pub fn check_holding_limit(held: i64, requested: usize) -> AppResult<()> {
    if held + requested as i64 > MAX_HELD_ITEMS {
        Err(AppError::ReserveLimitExceeded {
            held,
            cap: MAX_HELD_ITEMS,
        })
    } else {
        Ok(())
    }
}

/// A patron with any overdue unreturned line anywhere may not act
pub fn check_no_overdue(lines: &[ReservationLine], now: DateTime<Utc>) -> AppResult<()> {
    if lines.iter().any(|l| l.is_overdue(now)) {
        Err(AppError::OverdueItems)
    } else {
        Ok(())
    }
}

/// Validate an extension of one reservation before mutating anything
///
/// `patron_lines` are all lines of the patron across every reservation,
/// `reservation_lines` the lines of the reservation being extended. Every
/// check runs up front so a failure leaves no line partially extended.
pub fn validate_extension(
    patron_lines: &[ReservationLine],
    reservation_lines: &[ReservationLine],
    now: DateTime<Utc>,
) -> AppResult<()> {
    if patron_lines.iter().all(|l| l.returned) {
        return Err(AppError::AllItemsAlreadyReturned);
    }
    check_no_overdue(patron_lines, now)?;
    if reservation_lines.iter().any(|l| l.already_extended) {
        return Err(AppError::AlreadyExtended);
    }
    Ok(())
}

/// Validate returning a single line
pub fn validate_line_return(line: &ReservationLine) -> AppResult<()> {
    if line.returned {
        Err(AppError::AllItemsAlreadyReturned)
    } else {
        Ok(())
    }
}

/// Validate returning a whole reservation; yields the lines still out
pub fn unreturned_lines(lines: &[ReservationLine]) -> AppResult<Vec<&ReservationLine>> {
    let open: Vec<&ReservationLine> = lines.iter().filter(|l| !l.returned).collect();
    if open.is_empty() {
        Err(AppError::AllItemsAlreadyReturned)
    } else {
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn book(id: i32, title: &str, available: i32) -> Book {
        Book {
            id,
            title: title.to_string(),
            author_id: None,
            publisher_id: None,
            quantity: 5,
            available,
            crea_date: now(),
            modif_date: None,
        }
    }

    fn line(id: i32, expires_in_days: i64, extended: bool, returned: bool) -> ReservationLine {
        ReservationLine {
            id,
            reservation_id: 1,
            book_id: id,
            book_title: format!("Book {id}"),
            expiration_date: now() + Duration::days(expires_in_days),
            already_extended: extended,
            returned,
            returned_date: returned.then(now),
        }
    }

    #[test]
    fn test_distinct_books_rejects_repeats() {
        assert!(check_distinct_books(&[1, 2, 3]).is_ok());
        assert!(check_distinct_books(&[]).is_ok());
        assert!(matches!(
            check_distinct_books(&[1, 2, 1]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_availability_names_every_unavailable_title() {
        let books = vec![book(1, "Dune", 0), book(2, "Solaris", 2), book(3, "Ubik", 0)];
        match check_availability(&books) {
            Err(AppError::BookNotAvailable(titles)) => {
                assert_eq!(titles, vec!["Dune".to_string(), "Ubik".to_string()]);
            }
            other => panic!("expected BookNotAvailable, got {other:?}"),
        }
        assert!(check_availability(&[book(1, "Dune", 1)]).is_ok());
    }

    #[test]
    fn test_holding_limit_carries_held_count() {
        // 2 held + 2 requested = 4 > 3
        match check_holding_limit(2, 2) {
            Err(AppError::ReserveLimitExceeded { held, cap }) => {
                assert_eq!(held, 2);
                assert_eq!(cap, MAX_HELD_ITEMS);
            }
            other => panic!("expected ReserveLimitExceeded, got {other:?}"),
        }
        assert!(check_holding_limit(2, 1).is_ok());
        assert!(check_holding_limit(3, 1).is_err());
        assert!(check_holding_limit(0, 3).is_ok());
    }

    #[test]
    fn test_overdue_block_ignores_returned_lines() {
        // returned long-expired line does not block
        let lines = vec![line(1, -10, false, true), line(2, 5, false, false)];
        assert!(check_no_overdue(&lines, now()).is_ok());

        let lines = vec![line(1, -1, false, false), line(2, 5, false, false)];
        assert!(matches!(
            check_no_overdue(&lines, now()),
            Err(AppError::OverdueItems)
        ));
    }

    #[test]
    fn test_extension_requires_something_unreturned() {
        let all_returned = vec![line(1, 5, false, true), line(2, 5, true, true)];
        assert!(matches!(
            validate_extension(&all_returned, &all_returned, now()),
            Err(AppError::AllItemsAlreadyReturned)
        ));
    }

    #[test]
    fn test_extension_blocked_by_overdue_anywhere() {
        // the overdue line lives in another reservation of the same patron
        let patron_lines = vec![line(1, 5, false, false), line(9, -2, false, false)];
        let this_reservation = vec![line(1, 5, false, false)];
        assert!(matches!(
            validate_extension(&patron_lines, &this_reservation, now()),
            Err(AppError::OverdueItems)
        ));
    }

    #[test]
    fn test_extension_is_one_shot() {
        let patron_lines = vec![line(1, 1, true, false)];
        let this_reservation = vec![line(1, 1, true, false)];
        assert!(matches!(
            validate_extension(&patron_lines, &this_reservation, now()),
            Err(AppError::AlreadyExtended)
        ));

        let fresh = vec![line(1, 1, false, false)];
        assert!(validate_extension(&fresh, &fresh, now()).is_ok());
    }

    #[test]
    fn test_single_extended_line_fails_whole_reservation() {
        let lines = vec![line(1, 1, false, false), line(2, 1, true, false)];
        assert!(matches!(
            validate_extension(&lines, &lines, now()),
            Err(AppError::AlreadyExtended)
        ));
    }

    #[test]
    fn test_line_return_rejects_double_return() {
        assert!(validate_line_return(&line(1, 5, false, false)).is_ok());
        assert!(matches!(
            validate_line_return(&line(1, 5, false, true)),
            Err(AppError::AllItemsAlreadyReturned)
        ));
    }

    #[test]
    fn test_unreturned_lines_filters_and_rejects_empty() {
        let lines = vec![line(1, 5, false, true), line(2, 5, false, false)];
        let open = unreturned_lines(&lines).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, 2);

        let all_returned = vec![line(1, 5, false, true)];
        assert!(matches!(
            unreturned_lines(&all_returned),
            Err(AppError::AllItemsAlreadyReturned)
        ));
    }

    #[test]
    fn test_initial_expiration_is_thirty_days_out() {
        assert_eq!(initial_expiration(now()), now() + Duration::days(30));
    }
}
