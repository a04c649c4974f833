use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{LedgerError, Redemption, RedemptionStatus},
    ports::{
        clock::ClockPort,
        database::{DatabasePort, UnitOfWork},
    },
};
use chrono::{DateTime, Utc};
use tower::Service;
use tracing::{info, warn};
use uuid::Uuid;

use super::{DomainLogic, Error};

/// Exchange points for a benefit
pub struct RedeemPointsRequest {
    pub volunteer_id: Uuid,
    pub benefit_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RedeemPointsResponse {
    pub redemption_id: Uuid,
    pub volunteer_id: Uuid,
    pub volunteer_name: String,
    pub volunteer_email: String,
    pub benefit_id: Uuid,
    pub benefit_name: String,
    pub benefit_description: String,
    pub provider: String,
    pub points_spent: u32,
    pub status: RedemptionStatus,
    pub redeemed_at: DateTime<Utc>,
    /// Volunteer balance after the redemption
    pub remaining_points: u32,
}

impl<D, C> Service<RedeemPointsRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = RedeemPointsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RedeemPointsRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            // Fetch necessary data
            let mut volunteer = database
                .find_volunteer(req.volunteer_id)
                .await?
                .ok_or_else(|| Error::not_found("Volunteer", req.volunteer_id))?;
            let benefit = database
                .find_benefit(req.benefit_id)
                .await?
                .ok_or_else(|| Error::not_found("Benefit", req.benefit_id))?;

            if !benefit.active {
                return Err(Error::InvalidState(
                    format!("Benefit is not active: {}", benefit.name).into(),
                ));
            }

            // Debit the ledger, this also checks the balance
            let now = clock.now();
            let remaining_points = volunteer
                .debit(
                    benefit.points_required,
                    format!("Redeemed \"{}\"", benefit.name),
                    now,
                )
                .map_err(|err| {
                    if let LedgerError::InsufficientPoints {
                        required,
                        available,
                    } = err
                    {
                        warn!(
                            volunteer_id = %volunteer.id,
                            benefit_id = %benefit.id,
                            required,
                            available,
                            "redemption with insufficient points"
                        );
                    }
                    err
                })?;
            let redemption = Redemption::completed(volunteer.id, &benefit, now);

            let response = RedeemPointsResponse {
                redemption_id: redemption.id,
                volunteer_id: volunteer.id,
                volunteer_name: volunteer.name.clone(),
                volunteer_email: volunteer.email.clone(),
                benefit_id: benefit.id,
                benefit_name: benefit.name,
                benefit_description: benefit.description,
                provider: benefit.provider,
                points_spent: redemption.points_spent,
                status: redemption.status,
                redeemed_at: redemption.redeemed_at,
                remaining_points,
            };

            // Store the new balance and the redemption together
            database
                .commit(
                    UnitOfWork::new()
                        .save_volunteer(volunteer)
                        .save_redemption(redemption),
                )
                .await?;

            info!(
                volunteer_id = %response.volunteer_id,
                benefit_id = %response.benefit_id,
                points_spent = response.points_spent,
                remaining_points,
                "points redeemed"
            );
            Ok(response)
        })
    }
}
