use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    commands::{DomainLogic, Error},
    domain::Benefit,
    ports::{
        clock::ClockPort,
        database::{BenefitFilter, DatabasePort},
    },
};
use tower::Service;
use uuid::Uuid;

/// Active benefits a volunteer can currently pay for
pub struct AffordableBenefitsRequest {
    pub volunteer_id: Uuid,
}

impl<D, C> Service<AffordableBenefitsRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    /// Cheapest first
    type Response = Vec<Benefit>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AffordableBenefitsRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let volunteer = database
                .find_volunteer(req.volunteer_id)
                .await?
                .ok_or_else(|| Error::not_found("Volunteer", req.volunteer_id))?;

            let mut benefits = database
                .benefits(BenefitFilter {
                    active: Some(true),
                    max_points_required: Some(volunteer.total_points()),
                    ..Default::default()
                })
                .await?;
            benefits.sort_by(|a, b| {
                a.points_required
                    .cmp(&b.points_required)
                    .then_with(|| a.name.cmp(&b.name))
            });

            Ok(benefits)
        })
    }
}
