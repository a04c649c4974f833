use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::{
    clock::ClockPort,
    database::{DatabasePort, UnitOfWork},
};
use tower::Service;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ApplicationResponse, DomainLogic, Error};

/// Confirm that the volunteer of an accepted application took part
pub struct ConfirmParticipationRequest {
    pub application_id: Uuid,
    /// Promoter performing the action, must own the opportunity
    pub promoter_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmParticipationResponse {
    pub application: ApplicationResponse,
    /// Volunteer balance after the points were credited
    pub volunteer_total_points: u32,
}

impl<D, C> Service<ConfirmParticipationRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = ConfirmParticipationResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConfirmParticipationRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
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
                warn!(
                    application_id = %application.id,
                    promoter_id = %req.promoter_id,
                    "participation confirmation by a promoter who does not own the opportunity"
                );
                return Err(Error::InvalidState(
                    "Only the promoter who created this opportunity can confirm participation"
                        .into(),
                ));
            }
            application.ensure_confirmable()?;

            let mut volunteer = database
                .find_volunteer(application.volunteer_id)
                .await?
                .ok_or_else(|| Error::not_found("Volunteer", application.volunteer_id))?;

            // Update both records, then persist them together
            let now = clock.now();
            application.confirm_participation(opportunity.points, now)?;
            let total_points = volunteer.credit(
                opportunity.points,
                format!("Participation in \"{}\"", opportunity.title),
                now,
            )?;

            let response = ConfirmParticipationResponse {
                application: ApplicationResponse::from(&application),
                volunteer_total_points: total_points,
            };
            database
                .commit(
                    UnitOfWork::new()
                        .save_application(application)
                        .save_volunteer(volunteer),
                )
                .await?;

            info!(
                application_id = %req.application_id,
                points = opportunity.points,
                total_points,
                "participation confirmed"
            );
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::MemoryDatabase,
        commands::fixtures,
        domain::{ApplicationStatus, Decision},
    };
    use rstest::*;
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn promoter_id() -> Uuid {
        Uuid::new_v4()
    }

    #[rstest]
    #[tokio::test]
    async fn test_call(promoter_id: Uuid) -> Result<(), BoxError> {
        // GIVEN an accepted application for a 100 points opportunity
        let database = MemoryDatabase::default();
        let volunteer = fixtures::volunteer(&database, 40).await;
        let opportunity = fixtures::opportunity(&database, promoter_id, 100).await;
        let application = fixtures::application(
            &database,
            volunteer.id,
            opportunity.id,
            Some(Decision::Accept),
        )
        .await;
        let domain = fixtures::domain(&database);

        // WHEN the owning promoter confirms participation
        let req = ConfirmParticipationRequest {
            application_id: application.id,
            promoter_id,
        };
        let res = domain.clone().oneshot(req).await;

        // THEN
        // * the application is confirmed with the opportunity points
        // * the volunteer is credited once
        assert_that!(res).is_ok().matches(|res| {
            res.application.participation_confirmed
                && res.application.points_awarded == 100
                && res.application.confirmed_at.is_some()
                && res.volunteer_total_points == 140
        });
        assert_that!(fixtures::balance(&database, volunteer.id).await).is_equal_to(140);
        let stored = database.find_application(application.id).await?.unwrap();
        assert_that!(stored.participation_confirmed()).is_true();

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_double_confirmation(promoter_id: Uuid) -> Result<(), BoxError> {
        // GIVEN an application that was already confirmed
        let database = MemoryDatabase::default();
        let volunteer = fixtures::volunteer(&database, 0).await;
        let opportunity = fixtures::opportunity(&database, promoter_id, 100).await;
        let application = fixtures::application(
            &database,
            volunteer.id,
            opportunity.id,
            Some(Decision::Accept),
        )
        .await;
        let domain = fixtures::domain(&database);
        domain
            .clone()
            .oneshot(ConfirmParticipationRequest {
                application_id: application.id,
                promoter_id,
            })
            .await?;

        // WHEN confirming it again
        let res = domain
            .clone()
            .oneshot(ConfirmParticipationRequest {
                application_id: application.id,
                promoter_id,
            })
            .await;

        // THEN it fails and the points were only credited once
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidState(msg) if msg.contains("already confirmed")));
        assert_that!(fixtures::balance(&database, volunteer.id).await).is_equal_to(100);

        Ok(())
    }

    #[rstest]
    #[case(None, ApplicationStatus::Pending)]
    #[case(Some(Decision::Reject), ApplicationStatus::Rejected)]
    #[tokio::test]
    async fn test_not_accepted(
        promoter_id: Uuid,
        #[case] decision: Option<Decision>,
        #[case] status: ApplicationStatus,
    ) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let volunteer = fixtures::volunteer(&database, 0).await;
        let opportunity = fixtures::opportunity(&database, promoter_id, 100).await;
        let application =
            fixtures::application(&database, volunteer.id, opportunity.id, decision).await;
        let domain = fixtures::domain(&database);

        let res = domain
            .clone()
            .oneshot(ConfirmParticipationRequest {
                application_id: application.id,
                promoter_id,
            })
            .await;

        assert_that!(res).is_err().matches(
            |err| matches!(err, Error::InvalidState(msg) if msg.contains(&status.to_string())),
        );
        assert_that!(fixtures::balance(&database, volunteer.id).await).is_equal_to(0);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_wrong_promoter(promoter_id: Uuid) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let volunteer = fixtures::volunteer(&database, 0).await;
        let opportunity = fixtures::opportunity(&database, promoter_id, 100).await;
        let application = fixtures::application(
            &database,
            volunteer.id,
            opportunity.id,
            Some(Decision::Accept),
        )
        .await;
        let domain = fixtures::domain(&database);

        let res = domain
            .clone()
            .oneshot(ConfirmParticipationRequest {
                application_id: application.id,
                promoter_id: Uuid::new_v4(),
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidState(_)));
        assert_that!(fixtures::balance(&database, volunteer.id).await).is_equal_to(0);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_application(promoter_id: Uuid) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let domain = fixtures::domain(&database);

        let res = domain
            .clone()
            .oneshot(ConfirmParticipationRequest {
                application_id: Uuid::new_v4(),
                promoter_id,
            })
            .await;

        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::NotFound {
                    entity: "Application",
                    ..
                }
            )
        });

        Ok(())
    }
}
