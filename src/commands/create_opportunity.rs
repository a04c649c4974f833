use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Opportunity, OpportunityDetails},
    ports::{
        clock::ClockPort,
        database::{DatabasePort, UnitOfWork},
    },
};
use tower::Service;
use tracing::info;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct CreateOpportunityRequest {
    pub promoter_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: String,
    pub category: String,
    pub duration: u32,
    pub vacancies: u32,
    /// Points awarded to each confirmed participant
    pub points: u32,
}

impl<D, C> Service<CreateOpportunityRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = Opportunity;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CreateOpportunityRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            if req.title.trim().is_empty() {
                return Err(Error::InvalidArgument("title must not be empty".into()));
            }

            let details = OpportunityDetails {
                title: req.title,
                description: req.description,
                skills: req.skills,
                category: req.category,
                duration: req.duration,
                vacancies: req.vacancies,
                points: req.points,
            };
            let opportunity = Opportunity::new(req.promoter_id, details, clock.now());
            database
                .commit(UnitOfWork::new().save_opportunity(opportunity.clone()))
                .await?;

            info!(
                opportunity_id = %opportunity.id,
                points = opportunity.points,
                "opportunity created"
            );
            Ok(opportunity)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::MemoryDatabase, commands::fixtures,
        ports::clock::MockClockPort,
    };
    use crate::domain::OpportunityStatus;
    use chrono::{TimeZone, Utc};
    use rstest::*;
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    fn request(title: &str) -> CreateOpportunityRequest {
        CreateOpportunityRequest {
            promoter_id: Uuid::new_v4(),
            title: title.to_string(),
            description: "Help at the shelter".to_string(),
            skills: "patience".to_string(),
            category: "Animals".to_string(),
            duration: 4,
            vacancies: 3,
            points: 120,
        }
    }

    #[tokio::test]
    async fn test_call() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut clock = MockClockPort::new();
        clock.expect_now().times(1).return_const(created_at);
        let domain = DomainLogic::new(database.clone(), clock, Default::default());

        let res = domain.oneshot(request("Dog walking")).await?;

        assert_that!(res.status()).is_equal_to(OpportunityStatus::Open);
        assert_that!(res.created_at).is_equal_to(created_at);
        assert_that!(res.concluded_at()).is_none();
        let stored = database.find_opportunity(res.id).await?;
        assert_that!(stored)
            .is_some()
            .matches(|stored| stored.title == res.title && stored.created_at == created_at);

        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_empty_title(#[case] title: &str) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();

        let res = fixtures::domain(&database).oneshot(request(title)).await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidArgument(_)));

        Ok(())
    }
}
