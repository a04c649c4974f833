use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpportunityStatus {
    Open,
    Concluded,
}

/// Descriptive fields a promoter provides when posting an opportunity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpportunityDetails {
    pub title: String,
    pub description: String,
    pub skills: String,
    pub category: String,
    /// Expected duration in hours
    pub duration: u32,
    pub vacancies: u32,
    /// Points awarded to each confirmed participant
    pub points: u32,
}

/// Volunteering opportunity posted by a promoter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opportunity {
    pub id: Uuid,
    /// Promoter who created the opportunity
    ///
    /// Only this promoter can decide on applications, confirm participation and conclude it.
    pub promoter_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: String,
    pub category: String,
    /// Expected duration in hours
    pub duration: u32,
    pub vacancies: u32,
    /// Points awarded to each confirmed participant
    pub points: u32,
    pub created_at: DateTime<Utc>,
    /// Version of the stored record this value was read from
    ///
    /// Managed by the database adapter, like [`crate::domain::Volunteer::version`].
    pub version: u64,
    status: OpportunityStatus,
    concluded_at: Option<DateTime<Utc>>,
}

impl Opportunity {
    /// New opportunity, open for applications
    pub fn new(promoter_id: Uuid, details: OpportunityDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            promoter_id,
            title: details.title,
            description: details.description,
            skills: details.skills,
            category: details.category,
            duration: details.duration,
            vacancies: details.vacancies,
            points: details.points,
            created_at,
            version: 0,
            status: OpportunityStatus::Open,
            concluded_at: None,
        }
    }

    pub fn status(&self) -> OpportunityStatus {
        self.status
    }

    /// Set once, when the opportunity is concluded
    pub fn concluded_at(&self) -> Option<DateTime<Utc>> {
        self.concluded_at
    }

    pub fn is_owned_by(&self, promoter_id: Uuid) -> bool {
        self.promoter_id == promoter_id
    }

    pub fn is_open(&self) -> bool {
        self.status == OpportunityStatus::Open
    }

    /// Close the opportunity for good
    pub fn conclude(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if !self.is_open() {
            return Err(TransitionError::AlreadyConcluded);
        }

        self.status = OpportunityStatus::Concluded;
        self.concluded_at = Some(at);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => f.write_str("PENDING"),
            ApplicationStatus::Accepted => f.write_str("ACCEPTED"),
            ApplicationStatus::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Promoter decision on a pending application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

/// Candidacy of one volunteer for one opportunity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Application {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub opportunity_id: Uuid,
    pub motivation: Option<String>,
    pub applied_at: DateTime<Utc>,
    status: ApplicationStatus,
    participation_confirmed: bool,
    points_awarded: u32,
    confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Opportunity is already concluded")]
    AlreadyConcluded,
    #[error("Application was already decided: {0}")]
    AlreadyDecided(ApplicationStatus),
    #[error("Only accepted applications can have participation confirmed (current status: {0})")]
    NotAccepted(ApplicationStatus),
    #[error("Participation is already confirmed for this application")]
    AlreadyConfirmed,
}

impl Application {
    pub fn new(
        volunteer_id: Uuid,
        opportunity_id: Uuid,
        motivation: Option<String>,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            volunteer_id,
            opportunity_id,
            motivation,
            applied_at,
            status: ApplicationStatus::Pending,
            participation_confirmed: false,
            points_awarded: 0,
            confirmed_at: None,
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn participation_confirmed(&self) -> bool {
        self.participation_confirmed
    }

    pub fn points_awarded(&self) -> u32 {
        self.points_awarded
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    /// Move a pending application to accepted or rejected
    pub fn decide(&mut self, decision: Decision) -> Result<(), TransitionError> {
        if self.status != ApplicationStatus::Pending {
            return Err(TransitionError::AlreadyDecided(self.status));
        }

        self.status = match decision {
            Decision::Accept => ApplicationStatus::Accepted,
            Decision::Reject => ApplicationStatus::Rejected,
        };
        Ok(())
    }

    /// Check that participation could be confirmed right now, without changing anything
    pub fn ensure_confirmable(&self) -> Result<(), TransitionError> {
        if self.status != ApplicationStatus::Accepted {
            return Err(TransitionError::NotAccepted(self.status));
        }
        if self.participation_confirmed {
            return Err(TransitionError::AlreadyConfirmed);
        }
        Ok(())
    }

    /// Mark participation as confirmed and record the awarded points
    ///
    /// The confirmation fields are only ever written here, together and once.
    pub fn confirm_participation(
        &mut self,
        points: u32,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.ensure_confirmable()?;

        self.participation_confirmed = true;
        self.points_awarded = points;
        self.confirmed_at = Some(at);
        Ok(())
    }
}
