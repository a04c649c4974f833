use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    commands::{DomainLogic, Error},
    domain::{BenefitCategory, RedemptionStatus},
    ports::{
        clock::ClockPort,
        database::{BenefitFilter, DatabasePort, RedemptionFilter},
    },
};
use tower::Service;
use uuid::Uuid;

use super::RedemptionRecord;

/// Redemption statistics for the partner benefits of one provider
pub struct PartnerRedemptionStatsRequest {
    /// Matched case-insensitively against benefit providers
    pub provider: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PartnerRedemptionStatsResponse {
    pub provider: String,
    pub total_benefits: usize,
    pub total_redemptions: u64,
    pub total_points_redeemed: u64,
    pub benefit_details: Vec<BenefitRedemptionDetail>,
    /// Redemptions of all the provider's partner benefits, newest first
    pub recent_redemptions: Vec<RedemptionRecord>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BenefitRedemptionDetail {
    pub benefit_id: Uuid,
    pub benefit_name: String,
    pub benefit_description: String,
    pub points_required: u32,
    pub provider: String,
    pub active: bool,
    /// Completed redemptions only
    pub total_redemptions: u64,
    pub total_points_redeemed: u64,
}

impl<D, C> Service<PartnerRedemptionStatsRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = PartnerRedemptionStatsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: PartnerRedemptionStatsRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            // Inactive benefits are included, their past redemptions still count
            let mut benefits = database
                .benefits(BenefitFilter {
                    category: Some(BenefitCategory::Partner),
                    provider: Some(req.provider.clone()),
                    ..Default::default()
                })
                .await?;
            if benefits.is_empty() {
                return Err(Error::not_found("Partner benefits of provider", &req.provider));
            }
            benefits.sort_by(|a, b| a.name.cmp(&b.name));

            let mut benefit_details = Vec::with_capacity(benefits.len());
            let mut recent_redemptions = Vec::new();
            for benefit in &benefits {
                let redemptions = database
                    .redemptions(RedemptionFilter {
                        benefit_id: Some(benefit.id),
                        ..Default::default()
                    })
                    .await?;
                let completed = redemptions
                    .iter()
                    .filter(|r| r.status == RedemptionStatus::Completed);

                benefit_details.push(BenefitRedemptionDetail {
                    benefit_id: benefit.id,
                    benefit_name: benefit.name.clone(),
                    benefit_description: benefit.description.clone(),
                    points_required: benefit.points_required,
                    provider: benefit.provider.clone(),
                    active: benefit.active,
                    total_redemptions: completed.clone().count() as u64,
                    total_points_redeemed: completed.map(|r| r.points_spent as u64).sum(),
                });

                recent_redemptions.extend(
                    redemptions
                        .iter()
                        .map(|redemption| RedemptionRecord::new(redemption, Some(benefit))),
                );
            }
            recent_redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));

            Ok(PartnerRedemptionStatsResponse {
                provider: req.provider,
                total_benefits: benefits.len(),
                total_redemptions: benefit_details.iter().map(|d| d.total_redemptions).sum(),
                total_points_redeemed: benefit_details
                    .iter()
                    .map(|d| d.total_points_redeemed)
                    .sum(),
                benefit_details,
                recent_redemptions,
            })
        })
    }
}
