use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Application, Decision},
    ports::{
        clock::ClockPort,
        database::{DatabasePort, UnitOfWork},
    },
};
use tower::Service;
use tracing::info;
use uuid::Uuid;

use super::{ApplicationResponse, DomainLogic, Error};

/// Volunteer candidacy for an open opportunity
pub struct ApplyToOpportunityRequest {
    pub opportunity_id: Uuid,
    pub volunteer_id: Uuid,
    pub motivation: Option<String>,
}

/// Promoter decision on a pending application
pub struct DecideApplicationRequest {
    pub application_id: Uuid,
    pub promoter_id: Uuid,
    pub decision: Decision,
}

impl<D, C> Service<ApplyToOpportunityRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = ApplicationResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ApplyToOpportunityRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let opportunity = database
                .find_opportunity(req.opportunity_id)
                .await?
                .ok_or_else(|| Error::not_found("Opportunity", req.opportunity_id))?;
            let volunteer = database
                .find_volunteer(req.volunteer_id)
                .await?
                .ok_or_else(|| Error::not_found("Volunteer", req.volunteer_id))?;

            if !opportunity.is_open() {
                return Err(Error::InvalidState(
                    "Cannot apply to a concluded opportunity".into(),
                ));
            }
            if database
                .application_exists(volunteer.id, opportunity.id)
                .await?
            {
                return Err(Error::InvalidState(
                    "You have already applied to this opportunity".into(),
                ));
            }

            let application =
                Application::new(volunteer.id, opportunity.id, req.motivation, clock.now());
            let response = ApplicationResponse::from(&application);
            database
                .commit(UnitOfWork::new().save_application(application))
                .await?;

            info!(
                application_id = %response.application_id,
                opportunity_id = %response.opportunity_id,
                "application created"
            );
            Ok(response)
        })
    }
}

impl<D, C> Service<DecideApplicationRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = ApplicationResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DecideApplicationRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let mut application = database
                .find_application(req.application_id)
                .await?
                .ok_or_else(|| Error::not_found("Application", req.application_id))?;
            let opportunity = database
                .find_opportunity(application.opportunity_id)
                .await?
                .ok_or_else(|| Error::not_found("Opportunity", application.opportunity_id))?;

            if !opportunity.is_owned_by(req.promoter_id) {
                return Err(Error::InvalidState(
                    "Only the promoter who created this opportunity can decide on applications"
                        .into(),
                ));
            }
            if !opportunity.is_open() {
                return Err(Error::InvalidState(
                    "Applications of a concluded opportunity cannot be changed".into(),
                ));
            }

            application.decide(req.decision)?;
            let response = ApplicationResponse::from(&application);
            database
                .commit(UnitOfWork::new().save_application(application))
                .await?;

            info!(
                application_id = %response.application_id,
                status = %response.status,
                "application decided"
            );
            Ok(response)
        })
    }
}
