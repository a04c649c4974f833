use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    commands::{DomainLogic, Error},
    domain::{LedgerEntry, RedemptionStatus},
    ports::{
        clock::ClockPort,
        database::{ApplicationFilter, DatabasePort, RedemptionFilter},
    },
};
use chrono::{DateTime, Utc};
use tower::Service;
use uuid::Uuid;

pub struct PointsSummaryRequest {
    pub volunteer_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PointsSummaryResponse {
    pub volunteer_id: Uuid,
    pub volunteer_name: String,
    /// Current balance
    pub total_points: u32,
    /// Sum of the points of every confirmed participation
    pub points_earned: u64,
    /// Sum of the points of every completed redemption
    pub points_spent: u64,
    pub completed_redemptions: usize,
    /// Confirmed participations, most recent first
    pub participations: Vec<Participation>,
    /// Every balance change, oldest first
    pub ledger: Vec<LedgerEntry>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Participation {
    pub application_id: Uuid,
    pub opportunity_id: Uuid,
    pub points_awarded: u32,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl<D, C> Service<PointsSummaryRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = PointsSummaryResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: PointsSummaryRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let volunteer = database
                .find_volunteer(req.volunteer_id)
                .await?
                .ok_or_else(|| Error::not_found("Volunteer", req.volunteer_id))?;

            let mut confirmed = database
                .applications(ApplicationFilter {
                    volunteer_id: Some(volunteer.id),
                    participation_confirmed: Some(true),
                    ..Default::default()
                })
                .await?;
            confirmed.sort_by(|a, b| b.confirmed_at().cmp(&a.confirmed_at()));
            let redemptions = database
                .redemptions(RedemptionFilter {
                    volunteer_id: Some(volunteer.id),
                    status: Some(RedemptionStatus::Completed),
                    ..Default::default()
                })
                .await?;

            Ok(PointsSummaryResponse {
                volunteer_id: volunteer.id,
                volunteer_name: volunteer.name.clone(),
                total_points: volunteer.total_points(),
                points_earned: confirmed.iter().map(|a| a.points_awarded() as u64).sum(),
                points_spent: redemptions.iter().map(|r| r.points_spent as u64).sum(),
                completed_redemptions: redemptions.len(),
                participations: confirmed
                    .iter()
                    .map(|application| Participation {
                        application_id: application.id,
                        opportunity_id: application.opportunity_id,
                        points_awarded: application.points_awarded(),
                        confirmed_at: application.confirmed_at(),
                    })
                    .collect(),
                ledger: volunteer.ledger().entries().to_vec(),
            })
        })
    }
}
