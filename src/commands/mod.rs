use std::{borrow::Cow, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    domain::{Application, ApplicationStatus, LedgerError, TransitionError},
};

pub mod apply;
pub mod conclude_opportunity;
pub mod confirm_participation;
pub mod create_opportunity;
pub mod partner_benefits;
pub mod redeem_points;

/// Entry point of the service
///
/// Every operation is exposed as a [`tower::Service`] implementation for its request type.
pub struct DomainLogic<D, C> {
    pub(crate) database: Arc<D>,
    pub(crate) clock: Arc<C>,
    pub(crate) config: Arc<Config>,
}

impl<D, C> DomainLogic<D, C> {
    pub fn new(database: D, clock: C, config: Config) -> Self {
        Self {
            database: Arc::new(database),
            clock: Arc::new(clock),
            config: Arc::new(config),
        }
    }
}

impl<D, C> Clone for DomainLogic<D, C> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database port error: {0:?}")]
    Database(#[from] crate::ports::database::Error),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("invalid state: {0}")]
    InvalidState(Cow<'static, str>),
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        Self::InvalidState(err.to_string().into())
    }
}

impl From<TransitionError> for Error {
    fn from(err: TransitionError) -> Self {
        Self::InvalidState(err.to_string().into())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationResponse {
    pub application_id: Uuid,
    pub volunteer_id: Uuid,
    pub opportunity_id: Uuid,
    pub status: ApplicationStatus,
    pub participation_confirmed: bool,
    pub points_awarded: u32,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl From<&Application> for ApplicationResponse {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.id,
            volunteer_id: application.volunteer_id,
            opportunity_id: application.opportunity_id,
            status: application.status(),
            participation_confirmed: application.participation_confirmed(),
            points_awarded: application.points_awarded(),
            confirmed_at: application.confirmed_at(),
        }
    }
}
