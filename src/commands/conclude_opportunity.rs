use std::{
    collections::{HashMap, HashSet},
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{ApplicationStatus, OpportunityStatus, TransitionError, Volunteer},
    ports::{
        clock::ClockPort,
        database::{DatabasePort, UnitOfWork},
    },
};
use chrono::{DateTime, Utc};
use tower::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DomainLogic, Error};

/// Close an opportunity and confirm which accepted applicants took part
pub struct ConcludeOpportunityRequest {
    pub opportunity_id: Uuid,
    /// Promoter performing the action, must own the opportunity
    pub promoter_id: Uuid,
    /// Applications to confirm, possibly empty
    pub application_ids: Vec<Uuid>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConcludeOpportunityResponse {
    pub opportunity_id: Uuid,
    pub opportunity_title: String,
    pub status: OpportunityStatus,
    pub concluded_at: DateTime<Utc>,
    /// Applications confirmed by this call, already confirmed ones are not counted
    pub total_participants_confirmed: usize,
    pub total_points_awarded: u64,
    pub confirmed_participants: Vec<ParticipantSummary>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub volunteer_id: Uuid,
    pub volunteer_name: String,
    pub volunteer_email: String,
    pub points_awarded: u32,
    /// Volunteer balance after this conclusion
    pub total_points: u32,
}

impl<D, C> Service<ConcludeOpportunityRequest> for DomainLogic<D, C>
where
    D: DatabasePort + 'static,
    C: ClockPort + 'static,
{
    type Response = ConcludeOpportunityResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConcludeOpportunityRequest) -> Self::Future {
        let database = self.database.clone();
        let clock = self.clock.clone();
        let max_batch = self.config.max_conclusion_batch;
        Box::pin(async move {
            let mut opportunity = database
                .find_opportunity(req.opportunity_id)
                .await?
                .ok_or_else(|| Error::not_found("Opportunity", req.opportunity_id))?;
            if !opportunity.is_owned_by(req.promoter_id) {
                warn!(
                    opportunity_id = %opportunity.id,
                    promoter_id = %req.promoter_id,
                    "conclusion by a promoter who does not own the opportunity"
                );
                return Err(Error::InvalidState(
                    "Only the promoter who created this opportunity can conclude it".into(),
                ));
            }
            if !opportunity.is_open() {
                return Err(TransitionError::AlreadyConcluded.into());
            }
            if let Some(max) = max_batch.filter(|max| req.application_ids.len() > *max) {
                return Err(Error::InvalidArgument(
                    format!(
                        "at most {max} applications can be confirmed at once, got {}",
                        req.application_ids.len()
                    )
                    .into(),
                ));
            }

            // Validate every application before touching anything
            let mut pending = Vec::with_capacity(req.application_ids.len());
            let mut seen = HashSet::new();
            for application_id in &req.application_ids {
                let application = database
                    .find_application(*application_id)
                    .await?
                    .ok_or_else(|| Error::not_found("Application", application_id))?;
                if application.opportunity_id != opportunity.id {
                    return Err(Error::InvalidState(
                        format!("Application {application_id} does not belong to this opportunity")
                            .into(),
                    ));
                }
                if application.status() != ApplicationStatus::Accepted {
                    return Err(TransitionError::NotAccepted(application.status()).into());
                }
                if application.participation_confirmed() || !seen.insert(application.id) {
                    debug!(%application_id, "application already confirmed, skipping");
                    continue;
                }
                pending.push(application);
            }

            let mut volunteers: HashMap<Uuid, Volunteer> = HashMap::new();
            for application in &pending {
                if volunteers.contains_key(&application.volunteer_id) {
                    continue;
                }
                let volunteer = database
                    .find_volunteer(application.volunteer_id)
                    .await?
                    .ok_or_else(|| Error::not_found("Volunteer", application.volunteer_id))?;
                volunteers.insert(volunteer.id, volunteer);
            }

            // Everything is valid: apply the changes in memory, then commit them at once
            let now = clock.now();
            let reason = format!("Participation in \"{}\"", opportunity.title);
            let mut unit = UnitOfWork::new();
            let mut confirmed_participants = Vec::with_capacity(pending.len());
            let mut total_points_awarded = 0u64;
            for mut application in pending {
                let volunteer = volunteers
                    .get_mut(&application.volunteer_id)
                    .ok_or_else(|| Error::not_found("Volunteer", application.volunteer_id))?;

                application.confirm_participation(opportunity.points, now)?;
                let total_points = volunteer.credit(opportunity.points, &reason, now)?;

                confirmed_participants.push(ParticipantSummary {
                    volunteer_id: volunteer.id,
                    volunteer_name: volunteer.name.clone(),
                    volunteer_email: volunteer.email.clone(),
                    points_awarded: opportunity.points,
                    total_points,
                });
                total_points_awarded += opportunity.points as u64;
                unit = unit.save_application(application);
            }
            for volunteer in volunteers.into_values() {
                unit = unit.save_volunteer(volunteer);
            }

            opportunity.conclude(now)?;
            let response = ConcludeOpportunityResponse {
                opportunity_id: opportunity.id,
                opportunity_title: opportunity.title.clone(),
                status: opportunity.status(),
                concluded_at: now,
                total_participants_confirmed: confirmed_participants.len(),
                total_points_awarded,
                confirmed_participants,
            };
            database.commit(unit.save_opportunity(opportunity)).await?;

            info!(
                opportunity_id = %response.opportunity_id,
                participants = response.total_participants_confirmed,
                points = response.total_points_awarded,
                "opportunity concluded"
            );
            Ok(response)
        })
    }
}
