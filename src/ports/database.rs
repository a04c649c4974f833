use uuid::Uuid;

use crate::domain::{
    Application, ApplicationStatus, Benefit, BenefitCategory, Opportunity, Redemption,
    RedemptionStatus, Volunteer,
};

#[mockall::automock]
#[async_trait::async_trait]
pub trait DatabasePort {
    async fn find_volunteer(&self, volunteer_id: Uuid) -> Result<Option<Volunteer>, Error>;
    async fn find_opportunity(&self, opportunity_id: Uuid) -> Result<Option<Opportunity>, Error>;
    async fn find_application(&self, application_id: Uuid) -> Result<Option<Application>, Error>;
    async fn find_benefit(&self, benefit_id: Uuid) -> Result<Option<Benefit>, Error>;
    async fn find_redemption(&self, redemption_id: Uuid) -> Result<Option<Redemption>, Error>;

    async fn applications(&self, filter: ApplicationFilter) -> Result<Vec<Application>, Error>;
    async fn application_exists(
        &self,
        volunteer_id: Uuid,
        opportunity_id: Uuid,
    ) -> Result<bool, Error>;
    async fn benefits(&self, filter: BenefitFilter) -> Result<Vec<Benefit>, Error>;
    async fn redemptions(&self, filter: RedemptionFilter) -> Result<Vec<Redemption>, Error>;

    /// Persist every record of the unit of work, or none of them
    async fn commit(&self, unit: UnitOfWork) -> Result<(), Error>;
}

/// Set of records to persist atomically
///
/// Volunteers and opportunities are written with an optimistic lock: the `version` they carry
/// must match the stored one, otherwise the whole unit is rejected with
/// [`Error::VersionConflict`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitOfWork {
    pub volunteers: Vec<Volunteer>,
    pub opportunities: Vec<Opportunity>,
    pub applications: Vec<Application>,
    pub benefits: Vec<Benefit>,
    pub redemptions: Vec<Redemption>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_volunteer(mut self, volunteer: Volunteer) -> Self {
        self.volunteers.push(volunteer);
        self
    }

    pub fn save_opportunity(mut self, opportunity: Opportunity) -> Self {
        self.opportunities.push(opportunity);
        self
    }

    pub fn save_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }

    pub fn save_benefit(mut self, benefit: Benefit) -> Self {
        self.benefits.push(benefit);
        self
    }

    pub fn save_redemption(mut self, redemption: Redemption) -> Self {
        self.redemptions.push(redemption);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub opportunity_id: Option<Uuid>,
    pub volunteer_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
    pub participation_confirmed: Option<bool>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.opportunity_id
            .map_or(true, |id| application.opportunity_id == id)
            && self
                .volunteer_id
                .map_or(true, |id| application.volunteer_id == id)
            && self.status.map_or(true, |status| application.status() == status)
            && self
                .participation_confirmed
                .map_or(true, |confirmed| application.participation_confirmed() == confirmed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenefitFilter {
    pub category: Option<BenefitCategory>,
    /// Case-insensitive substring of the provider name
    pub provider: Option<String>,
    pub active: Option<bool>,
    /// Only benefits that cost at most this many points
    pub max_points_required: Option<u32>,
}

impl BenefitFilter {
    pub fn matches(&self, benefit: &Benefit) -> bool {
        self.category
            .map_or(true, |category| benefit.category == category)
            && self.provider.as_ref().map_or(true, |provider| {
                benefit
                    .provider
                    .to_lowercase()
                    .contains(&provider.to_lowercase())
            })
            && self.active.map_or(true, |active| benefit.active == active)
            && self
                .max_points_required
                .map_or(true, |max| benefit.points_required <= max)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedemptionFilter {
    pub volunteer_id: Option<Uuid>,
    pub benefit_id: Option<Uuid>,
    pub status: Option<RedemptionStatus>,
}

impl RedemptionFilter {
    pub fn matches(&self, redemption: &Redemption) -> bool {
        self.volunteer_id
            .map_or(true, |id| redemption.volunteer_id == id)
            && self.benefit_id.map_or(true, |id| redemption.benefit_id == id)
            && self.status.map_or(true, |status| redemption.status == status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A volunteer or opportunity was modified since it was read
    ///
    /// Retrying the whole operation with fresh data is safe.
    #[error("{entity} {id} was modified concurrently: expected version {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        id: Uuid,
        expected: u64,
        actual: u64,
    },

    /// Another application already exists for the same volunteer and opportunity
    #[error("volunteer {volunteer_id} already applied to opportunity {opportunity_id}")]
    DuplicateApplication {
        volunteer_id: Uuid,
        opportunity_id: Uuid,
    },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
