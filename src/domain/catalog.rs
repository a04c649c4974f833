use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenefitCategory {
    /// Issued by the institution itself, cannot be changed by partners
    Ua,
    /// Managed by an external partner
    Partner,
}

impl fmt::Display for BenefitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenefitCategory::Ua => f.write_str("UA"),
            BenefitCategory::Partner => f.write_str("PARTNER"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Benefit {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price of the benefit, always strictly positive
    pub points_required: u32,
    pub category: BenefitCategory,
    pub provider: String,
    pub image_url: Option<String>,
    /// Inactive benefits cannot be redeemed, but past redemptions still reference them
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a [`Benefit`]
///
/// Fields set to `None` keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenefitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<u32>,
    pub provider: Option<String>,
    pub image_url: Option<String>,
}

impl Benefit {
    pub fn is_partner_managed(&self) -> bool {
        self.category == BenefitCategory::Partner
    }

    pub fn apply(&mut self, update: BenefitUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(points_required) = update.points_required {
            self.points_required = points_required;
        }
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedemptionStatus {
    Completed,
    /// Not reachable yet: there is no cancellation flow
    Cancelled,
}

/// Points exchanged by a volunteer for a benefit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redemption {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub benefit_id: Uuid,
    /// Price of the benefit at the time of the redemption
    pub points_spent: u32,
    pub status: RedemptionStatus,
    pub redeemed_at: DateTime<Utc>,
}

impl Redemption {
    /// Completed redemption of `benefit` at its current price
    pub fn completed(volunteer_id: Uuid, benefit: &Benefit, redeemed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            volunteer_id,
            benefit_id: benefit.id,
            points_spent: benefit.points_required,
            status: RedemptionStatus::Completed,
            redeemed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;

    #[fixture]
    fn benefit() -> Benefit {
        Benefit {
            id: Uuid::new_v4(),
            name: "Cinema ticket".to_string(),
            description: "One 2D session".to_string(),
            points_required: 200,
            category: BenefitCategory::Partner,
            provider: "CineMax".to_string(),
            image_url: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn test_apply_only_set_fields(mut benefit: Benefit) {
        benefit.apply(BenefitUpdate {
            points_required: Some(250),
            image_url: Some("https://img.example/cinema.png".to_string()),
            ..Default::default()
        });

        assert_that!(benefit.name.as_str()).is_equal_to("Cinema ticket");
        assert_that!(benefit.description.as_str()).is_equal_to("One 2D session");
        assert_that!(benefit.provider.as_str()).is_equal_to("CineMax");
        assert_that!(benefit.points_required).is_equal_to(250);
        assert_that!(benefit.image_url)
            .is_some()
            .is_equal_to("https://img.example/cinema.png".to_string());
    }

    #[rstest]
    fn test_apply_empty_update(mut benefit: Benefit) {
        let before = benefit.clone();

        benefit.apply(BenefitUpdate::default());

        assert_that!(benefit).is_equal_to(before);
    }

    #[rstest]
    fn test_redemption_snapshots_price(mut benefit: Benefit) {
        let redemption = Redemption::completed(Uuid::new_v4(), &benefit, Utc::now());
        benefit.points_required = 999;

        assert_that!(redemption.points_spent).is_equal_to(200);
        assert_that!(redemption.status).is_equal_to(RedemptionStatus::Completed);
    }
}
