use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Spendable points of a volunteer
///
/// The balance can only change through [`Ledger::credit`] and [`Ledger::debit`], which keep it
/// within `0..=u32::MAX` and record every change as a [`LedgerEntry`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    balance: u32,
    entries: Vec<LedgerEntry>,
}

/// Details for a single balance change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub entry_id: Uuid,
    /// Difference in points
    ///
    /// A positive number adds points to the balance. A negative number removes from it.
    pub delta_points: i64,
    /// Message explaining the reason for this entry.
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Trying to spend more points than available
    #[error("Insufficient points. Required: {required}, Available: {available}")]
    InsufficientPoints { required: u32, available: u32 },

    #[error("crediting {credit} points to a balance of {balance} would overflow")]
    Overflow { balance: u32, credit: u32 },
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger starting with an opening balance, e.g. when migrating existing volunteers
    pub fn with_opening_balance(points: u32, at: DateTime<Utc>) -> Self {
        let mut ledger = Self::new();
        if points > 0 {
            ledger.record(points, points as i64, "Opening balance".to_string(), at);
        }
        ledger
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Add points to the balance and return the new balance
    pub fn credit(
        &mut self,
        points: u32,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerError> {
        let balance = self
            .balance
            .checked_add(points)
            .ok_or(LedgerError::Overflow {
                balance: self.balance,
                credit: points,
            })?;

        self.record(balance, points as i64, reason.into(), at);
        Ok(balance)
    }

    /// Remove points from the balance and return the new balance
    ///
    /// The ledger is left untouched if the balance does not cover `points`.
    pub fn debit(
        &mut self,
        points: u32,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerError> {
        let balance = self
            .balance
            .checked_sub(points)
            .ok_or(LedgerError::InsufficientPoints {
                required: points,
                available: self.balance,
            })?;

        self.record(balance, -(points as i64), reason.into(), at);
        Ok(balance)
    }

    fn record(&mut self, balance: u32, delta_points: i64, reason: String, at: DateTime<Utc>) {
        self.balance = balance;
        self.entries.push(LedgerEntry {
            entry_id: Uuid::new_v4(),
            delta_points,
            reason,
            recorded_at: at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_credit_then_debit() {
        let mut ledger = Ledger::new();

        let res = ledger.credit(150, "Beach cleanup", Utc::now());
        assert_that!(res).is_ok().is_equal_to(150);

        let res = ledger.debit(150, "Cinema ticket", Utc::now());
        assert_that!(res).is_ok().is_equal_to(0);

        assert_that!(ledger.balance()).is_equal_to(0);
        assert_that!(ledger.entries().iter().map(|e| e.delta_points).collect::<Vec<_>>())
            .is_equal_to(vec![150, -150]);
    }

    #[test]
    fn test_debit_insufficient_leaves_ledger_untouched() {
        let mut ledger = Ledger::with_opening_balance(20, Utc::now());

        let res = ledger.debit(21, "Cinema ticket", Utc::now());

        assert_that!(res).is_err().is_equal_to(LedgerError::InsufficientPoints {
            required: 21,
            available: 20,
        });
        assert_that!(ledger.balance()).is_equal_to(20);
        assert_that!(ledger.entries().len()).is_equal_to(1);
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = Ledger::with_opening_balance(u32::MAX, Utc::now());

        let res = ledger.credit(1, "One too many", Utc::now());

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, LedgerError::Overflow { .. }));
        assert_that!(ledger.balance()).is_equal_to(u32::MAX);
    }

    #[test]
    fn test_insufficient_points_message() {
        let err = LedgerError::InsufficientPoints {
            required: 200,
            available: 50,
        };

        assert_that!(err.to_string())
            .is_equal_to("Insufficient points. Required: 200, Available: 50".to_string());
    }

    #[test]
    fn test_empty_opening_balance_has_no_entry() {
        let ledger = Ledger::with_opening_balance(0, Utc::now());

        assert_that!(ledger.entries().is_empty()).is_true();
    }
}
