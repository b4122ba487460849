//! Stock ledger for a single book
//!
//! All four mutations check their bounds before touching the counters, so
//! a rejected operation leaves the level exactly as it was.

use crate::error::{AppError, AppResult};

/// The quantity/available counter pair of one book
///
/// Invariant: `0 <= available <= quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    /// Total copies owned
    pub quantity: i32,
    /// Copies currently on the shelf
    pub available: i32,
}

impl StockLevel {
    fn check_amount(amount: i32) -> AppResult<()> {
        if amount <= 0 {
            return Err(AppError::BadRequest(format!(
                "Stock amount must be positive, got {}",
                amount
            )));
        }
        Ok(())
    }

    /// Stock receipt: new copies enter the collection, growing both counters
    pub fn receive(&mut self, amount: i32) -> AppResult<()> {
        Self::check_amount(amount)?;
        self.quantity += amount;
        self.available += amount;
        Ok(())
    }

    /// Stock removal: copies leave the collection for good
    ///
    /// Rejected if more copies would be removed than are on the shelf or
    /// than were ever owned.
    pub fn remove(&mut self, amount: i32) -> AppResult<()> {
        Self::check_amount(amount)?;
        if amount > self.available || amount > self.quantity {
            return Err(AppError::InsufficientStock {
                requested: amount,
                available: self.available,
            });
        }
        self.quantity -= amount;
        self.available -= amount;
        Ok(())
    }

    /// Checkout: copies leave the shelf but stay owned
    pub fn checkout(&mut self, amount: i32) -> AppResult<()> {
        Self::check_amount(amount)?;
        if amount > self.available {
            return Err(AppError::InsufficientStock {
                requested: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        Ok(())
    }

    /// Shelf return: checked-out copies come back
    ///
    /// Returning more copies than are checked out would push `available`
    /// past `quantity` and is rejected.
    pub fn shelf_return(&mut self, amount: i32) -> AppResult<()> {
        Self::check_amount(amount)?;
        if self.available + amount > self.quantity {
            return Err(AppError::Validation(format!(
                "Return of {} would exceed owned quantity ({} available of {})",
                amount, self.available, self.quantity
            )));
        }
        self.available += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_and_receive() {
        let mut level = StockLevel {
            quantity: 10,
            available: 10,
        };
        level.checkout(3).unwrap();
        assert_eq!(level, StockLevel { quantity: 10, available: 7 });

        level.receive(5).unwrap();
        assert_eq!(level, StockLevel { quantity: 15, available: 12 });
    }

    #[test]
    fn test_shelf_return_cannot_exceed_quantity() {
        let mut level = StockLevel {
            quantity: 10,
            available: 7,
        };
        // 12 > quantity, rejected without mutation
        assert!(level.shelf_return(5).is_err());
        assert_eq!(level, StockLevel { quantity: 10, available: 7 });

        level.shelf_return(3).unwrap();
        assert_eq!(level, StockLevel { quantity: 10, available: 10 });
    }

    #[test]
    fn test_checkout_rejection_leaves_state_untouched() {
        let mut level = StockLevel {
            quantity: 5,
            available: 2,
        };
        let err = level.checkout(3).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock { requested: 3, available: 2 }
        ));
        assert_eq!(level, StockLevel { quantity: 5, available: 2 });
    }

    #[test]
    fn test_remove_checks_both_counters() {
        let mut level = StockLevel {
            quantity: 4,
            available: 4,
        };
        assert!(level.remove(5).is_err());
        assert_eq!(level, StockLevel { quantity: 4, available: 4 });

        level.remove(4).unwrap();
        assert_eq!(level, StockLevel { quantity: 0, available: 0 });

        // checked-out copies block removal of the full quantity
        let mut level = StockLevel {
            quantity: 4,
            available: 1,
        };
        assert!(level.remove(2).is_err());
        level.remove(1).unwrap();
        assert_eq!(level, StockLevel { quantity: 3, available: 0 });
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let mut level = StockLevel {
            quantity: 3,
            available: 3,
        };
        assert!(level.receive(0).is_err());
        assert!(level.checkout(-1).is_err());
        assert!(level.remove(0).is_err());
        assert!(level.shelf_return(-2).is_err());
        assert_eq!(level, StockLevel { quantity: 3, available: 3 });
    }

    #[test]
    fn test_invariant_holds_across_operations() {
        let mut level = StockLevel {
            quantity: 2,
            available: 2,
        };
        let ops: Vec<(&str, i32)> = vec![
            ("checkout", 1),
            ("checkout", 1),
            ("checkout", 1), // fails
            ("shelf_return", 1),
            ("receive", 3),
            ("remove", 2),
            ("shelf_return", 5), // fails
            ("remove", 9),       // fails
        ];
        for (op, amount) in ops {
            let _ = match op {
                "checkout" => level.checkout(amount),
                "shelf_return" => level.shelf_return(amount),
                "receive" => level.receive(amount),
                _ => level.remove(amount),
            };
            assert!(level.available >= 0, "available went negative after {op}");
            assert!(
                level.available <= level.quantity,
                "available exceeded quantity after {op}"
            );
        }
    }
}
