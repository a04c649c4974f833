use chrono::{DateTime, Utc};
use uuid::Uuid;

mod catalog;
mod engagement;
mod ledger;

pub use catalog::{Benefit, BenefitCategory, BenefitUpdate, Redemption, RedemptionStatus};
pub use engagement::{
    Application, ApplicationStatus, Decision, Opportunity, OpportunityDetails, OpportunityStatus,
    TransitionError,
};
pub use ledger::{Ledger, LedgerEntry, LedgerError};

/// Volunteer profile together with its points ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volunteer {
    /// Unique identifier for the `Volunteer`
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Option<String>,
    /// Version of the stored record this value was read from
    ///
    /// Managed by the database adapter. A write based on a stale version is rejected.
    pub version: u64,
    /// Spendable points
    ///
    /// Profile edits never touch this. Only participation confirmation and redemptions do.
    ledger: Ledger,
}

impl Volunteer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: None,
            skills: None,
            version: 0,
            ledger: Ledger::new(),
        }
    }

    /// Volunteer carried over with points earned elsewhere
    pub fn with_opening_balance(
        name: impl Into<String>,
        email: impl Into<String>,
        points: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            ledger: Ledger::with_opening_balance(points, at),
            ..Self::new(name, email)
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn total_points(&self) -> u32 {
        self.ledger.balance()
    }

    /// Award points, see [`Ledger::credit`]
    pub fn credit(
        &mut self,
        points: u32,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerError> {
        self.ledger.credit(points, reason, at)
    }

    /// Spend points, see [`Ledger::debit`]
    pub fn debit(
        &mut self,
        points: u32,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerError> {
        self.ledger.debit(points, reason, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_points_only_move_through_the_ledger() {
        let mut volunteer =
            Volunteer::with_opening_balance("Ana", "ana@example.org", 40, Utc::now());

        assert_that!(volunteer.credit(60, "Participation", Utc::now()))
            .is_ok()
            .is_equal_to(100);
        assert_that!(volunteer.debit(150, "Redemption", Utc::now()))
            .is_err()
            .is_equal_to(LedgerError::InsufficientPoints {
                required: 150,
                available: 100,
            });
        assert_that!(volunteer.total_points()).is_equal_to(100);
        assert_that!(volunteer.ledger().entries().len()).is_equal_to(2);
    }
}
