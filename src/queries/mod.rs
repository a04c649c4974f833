//! Read-only projections over stored data
//!
//! These share [`DomainLogic`](crate::commands::DomainLogic) and its error type with the commands,
//! but never write anything.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Benefit, Redemption, RedemptionStatus};

pub mod catalog;
pub mod partner_stats;
pub mod points_summary;
pub mod redemption_history;

/// Redemption joined with the benefit it was for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedemptionRecord {
    pub redemption_id: Uuid,
    pub volunteer_id: Uuid,
    pub benefit_id: Uuid,
    pub benefit_name: String,
    pub provider: String,
    pub points_spent: u32,
    pub status: RedemptionStatus,
    pub redeemed_at: DateTime<Utc>,
}

impl RedemptionRecord {
    fn new(redemption: &Redemption, benefit: Option<&Benefit>) -> Self {
        Self {
            redemption_id: redemption.id,
            volunteer_id: redemption.volunteer_id,
            benefit_id: redemption.benefit_id,
            benefit_name: benefit.map(|b| b.name.clone()).unwrap_or_default(),
            provider: benefit.map(|b| b.provider.clone()).unwrap_or_default(),
            points_spent: redemption.points_spent,
            status: redemption.status,
            redeemed_at: redemption.redeemed_at,
        }
    }
}

/// Newest first
fn sort_recent(redemptions: &mut [Redemption]) {
    redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
}
