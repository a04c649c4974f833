use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    commands::{DomainLogic, Error},
    domain::RedemptionStatus,
    ports::{
        clock::ClockPort,
        database::{DatabasePort, RedemptionFilter},
    },
};
use tower::Service;
use uuid::Uuid;

use super::{sort_recent, RedemptionRecord};

pub struct RedemptionHistoryRequest {
    pub volunteer_id: Uuid,
    /// Only redemptions with this status, all of them if `None`
    pub status: Option<RedemptionStatus>,
}

impl<D, C> Service<RedemptionHistoryRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = Vec<RedemptionRecord>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RedemptionHistoryRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            if database.find_volunteer(req.volunteer_id).await?.is_none() {
                return Err(Error::not_found("Volunteer", req.volunteer_id));
            }

            let mut redemptions = database
                .redemptions(RedemptionFilter {
                    volunteer_id: Some(req.volunteer_id),
                    status: req.status,
                    ..Default::default()
                })
                .await?;
            sort_recent(&mut redemptions);

            let mut benefits = HashMap::new();
            let mut records = Vec::with_capacity(redemptions.len());
            for redemption in &redemptions {
                if !benefits.contains_key(&redemption.benefit_id) {
                    let benefit = database.find_benefit(redemption.benefit_id).await?;
                    benefits.insert(redemption.benefit_id, benefit);
                }
                let benefit = benefits.get(&redemption.benefit_id).and_then(Option::as_ref);
                records.push(RedemptionRecord::new(redemption, benefit));
            }

            Ok(records)
        })
    }
}
