//! Benefit management by partners
//!
//! Partners can only add, change or deactivate benefits of the `Partner` category. Benefits
//! issued by the institution (`Ua`) are never modified through these operations.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use crate::{
    domain::{Benefit, BenefitCategory, BenefitUpdate},
    ports::{
        clock::ClockPort,
        database::{DatabasePort, UnitOfWork},
    },
};
use tower::Service;
use tracing::{info, warn};
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct CreatePartnerBenefitRequest {
    pub name: String,
    pub description: String,
    pub points_required: u32,
    pub provider: String,
    pub image_url: Option<String>,
}

pub struct UpdatePartnerBenefitRequest {
    pub benefit_id: Uuid,
    pub update: BenefitUpdate,
}

pub struct DeactivatePartnerBenefitRequest {
    pub benefit_id: Uuid,
}

/// Fetch a benefit that partners are allowed to modify
async fn find_partner_benefit<D: DatabasePort>(
    database: &Arc<D>,
    benefit_id: Uuid,
    action: &str,
) -> Result<Benefit, Error> {
    let benefit = database
        .find_benefit(benefit_id)
        .await?
        .ok_or_else(|| Error::not_found("Benefit", benefit_id))?;

    if !benefit.is_partner_managed() {
        warn!(
            %benefit_id,
            category = %benefit.category,
            action,
            "partner change on a non-partner benefit"
        );
        return Err(Error::InvalidState(
            format!("Only PARTNER benefits can be {action} by partners").into(),
        ));
    }

    Ok(benefit)
}

impl<D, C> Service<CreatePartnerBenefitRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = Benefit;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CreatePartnerBenefitRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            if req.name.trim().is_empty() {
                return Err(Error::InvalidArgument("name must not be empty".into()));
            }
            if req.points_required == 0 {
                return Err(Error::InvalidArgument(
                    "points required must be positive".into(),
                ));
            }

            let benefit = Benefit {
                id: Uuid::new_v4(),
                name: req.name,
                description: req.description,
                points_required: req.points_required,
                category: BenefitCategory::Partner,
                provider: req.provider,
                image_url: req.image_url,
                active: true,
                created_at: clock.now(),
            };
            database
                .commit(UnitOfWork::new().save_benefit(benefit.clone()))
                .await?;

            info!(
                benefit_id = %benefit.id,
                provider = %benefit.provider,
                "partner benefit created"
            );
            Ok(benefit)
        })
    }
}

impl<D, C> Service<UpdatePartnerBenefitRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = Benefit;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdatePartnerBenefitRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let mut benefit = find_partner_benefit(&database, req.benefit_id, "updated").await?;
            if req.update.points_required == Some(0) {
                return Err(Error::InvalidArgument(
                    "points required must be positive".into(),
                ));
            }

            benefit.apply(req.update);
            database
                .commit(UnitOfWork::new().save_benefit(benefit.clone()))
                .await?;

            info!(benefit_id = %benefit.id, "partner benefit updated");
            Ok(benefit)
        })
    }
}

impl<D, C> Service<DeactivatePartnerBenefitRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = Benefit;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeactivatePartnerBenefitRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let mut benefit =
                find_partner_benefit(&database, req.benefit_id, "deactivated").await?;

            benefit.active = false;
            database
                .commit(UnitOfWork::new().save_benefit(benefit.clone()))
                .await?;

            info!(benefit_id = %benefit.id, "partner benefit deactivated");
            Ok(benefit)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::database::memory::MemoryDatabase, commands::fixtures};
    use rstest::*;
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    #[tokio::test]
    async fn test_create() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();

        let res = fixtures::domain(&database)
            .oneshot(CreatePartnerBenefitRequest {
                name: "Gym day pass".to_string(),
                description: "One day of access".to_string(),
                points_required: 150,
                provider: "FitPlace".to_string(),
                image_url: None,
            })
            .await?;

        assert_that!(res.category).is_equal_to(BenefitCategory::Partner);
        assert_that!(res.active).is_true();
        let stored = database.find_benefit(res.id).await?;
        assert_that!(stored).is_some().is_equal_to(res);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_free_benefit() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();

        let res = fixtures::domain(&database)
            .oneshot(CreatePartnerBenefitRequest {
                name: "Gym day pass".to_string(),
                description: "One day of access".to_string(),
                points_required: 0,
                provider: "FitPlace".to_string(),
                image_url: None,
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidArgument(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_update() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let benefit = fixtures::benefit(&database, BenefitCategory::Partner, 200, true).await;

        let res = fixtures::domain(&database)
            .oneshot(UpdatePartnerBenefitRequest {
                benefit_id: benefit.id,
                update: BenefitUpdate {
                    description: Some("Any session, 3D included".to_string()),
                    points_required: Some(260),
                    ..Default::default()
                },
            })
            .await?;

        assert_that!(res.name).is_equal_to(benefit.name.clone());
        assert_that!(res.provider).is_equal_to(benefit.provider.clone());
        assert_that!(res.description.as_str()).is_equal_to("Any session, 3D included");
        assert_that!(res.points_required).is_equal_to(260);
        let stored = database.find_benefit(benefit.id).await?;
        assert_that!(stored).is_some().is_equal_to(res);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_zero_points() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let benefit = fixtures::benefit(&database, BenefitCategory::Partner, 200, true).await;

        let res = fixtures::domain(&database)
            .oneshot(UpdatePartnerBenefitRequest {
                benefit_id: benefit.id,
                update: BenefitUpdate {
                    points_required: Some(0),
                    ..Default::default()
                },
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidArgument(_)));
        let stored = database.find_benefit(benefit.id).await?;
        assert_that!(stored)
            .is_some()
            .matches(|stored| stored.points_required == 200);

        Ok(())
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn test_ua_benefit_is_protected(#[case] deactivate: bool) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let benefit = fixtures::benefit(&database, BenefitCategory::Ua, 200, true).await;
        let domain = fixtures::domain(&database);

        let res = if deactivate {
            domain
                .oneshot(DeactivatePartnerBenefitRequest {
                    benefit_id: benefit.id,
                })
                .await
        } else {
            domain
                .oneshot(UpdatePartnerBenefitRequest {
                    benefit_id: benefit.id,
                    update: BenefitUpdate {
                        points_required: Some(1),
                        ..Default::default()
                    },
                })
                .await
        };

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidState(msg) if msg.contains("Only PARTNER")));
        let stored = database.find_benefit(benefit.id).await?;
        assert_that!(stored).is_some().is_equal_to(benefit);

        Ok(())
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn test_deactivate(#[case] active: bool) -> Result<(), BoxError> {
        let database = MemoryDatabase::default();
        let benefit = fixtures::benefit(&database, BenefitCategory::Partner, 200, active).await;

        let res = fixtures::domain(&database)
            .oneshot(DeactivatePartnerBenefitRequest {
                benefit_id: benefit.id,
            })
            .await?;

        assert_that!(res.active).is_false();
        let stored = database.find_benefit(benefit.id).await?;
        assert_that!(stored).is_some().matches(|stored| !stored.active);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_benefit() -> Result<(), BoxError> {
        let database = MemoryDatabase::default();

        let res = fixtures::domain(&database)
            .oneshot(DeactivatePartnerBenefitRequest {
                benefit_id: Uuid::new_v4(),
            })
            .await;

        assert_that!(res).is_err().matches(|err| {
            matches!(
                err,
                Error::NotFound {
                    entity: "Benefit",
                    ..
                }
            )
        });

        Ok(())
    }
}
