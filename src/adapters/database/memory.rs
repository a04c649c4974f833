use crate::{
    domain::{Application, Benefit, Opportunity, Redemption, Volunteer},
    ports::database::{
        ApplicationFilter, BenefitFilter, DatabasePort, Error, RedemptionFilter, UnitOfWork,
    },
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    volunteers: HashMap<Uuid, Volunteer>,
    opportunities: HashMap<Uuid, Opportunity>,
    applications: HashMap<Uuid, Application>,
    benefits: HashMap<Uuid, Benefit>,
    redemptions: HashMap<Uuid, Redemption>,
}

impl Tables {
    /// Check every constraint of the unit before anything is written
    fn validate(&self, unit: &UnitOfWork) -> Result<(), Error> {
        // A record that was never stored counts as version 0
        for volunteer in &unit.volunteers {
            let actual = self.volunteers.get(&volunteer.id).map_or(0, |v| v.version);
            check_version("volunteer", volunteer.id, volunteer.version, actual)?;
        }
        for opportunity in &unit.opportunities {
            let actual = self.opportunities.get(&opportunity.id).map_or(0, |o| o.version);
            check_version("opportunity", opportunity.id, opportunity.version, actual)?;
        }

        for application in &unit.applications {
            let duplicate = self
                .applications
                .values()
                .chain(unit.applications.iter())
                .any(|other| {
                    other.id != application.id
                        && other.volunteer_id == application.volunteer_id
                        && other.opportunity_id == application.opportunity_id
                });
            if duplicate {
                return Err(Error::DuplicateApplication {
                    volunteer_id: application.volunteer_id,
                    opportunity_id: application.opportunity_id,
                });
            }
        }

        Ok(())
    }

    fn apply(&mut self, unit: UnitOfWork) {
        for mut volunteer in unit.volunteers {
            volunteer.version += 1;
            self.volunteers.insert(volunteer.id, volunteer);
        }
        for mut opportunity in unit.opportunities {
            opportunity.version += 1;
            self.opportunities.insert(opportunity.id, opportunity);
        }
        for application in unit.applications {
            self.applications.insert(application.id, application);
        }
        for benefit in unit.benefits {
            self.benefits.insert(benefit.id, benefit);
        }
        for redemption in unit.redemptions {
            self.redemptions.insert(redemption.id, redemption);
        }
    }
}

fn check_version(entity: &'static str, id: Uuid, expected: u64, actual: u64) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::VersionConflict {
            entity,
            id,
            expected,
            actual,
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl DatabasePort for MemoryDatabase {
    async fn find_volunteer(&self, volunteer_id: Uuid) -> Result<Option<Volunteer>, Error> {
        Ok(self.tables.lock()?.volunteers.get(&volunteer_id).cloned())
    }

    async fn find_opportunity(&self, opportunity_id: Uuid) -> Result<Option<Opportunity>, Error> {
        Ok(self.tables.lock()?.opportunities.get(&opportunity_id).cloned())
    }

    async fn find_application(&self, application_id: Uuid) -> Result<Option<Application>, Error> {
        Ok(self.tables.lock()?.applications.get(&application_id).cloned())
    }

    async fn find_benefit(&self, benefit_id: Uuid) -> Result<Option<Benefit>, Error> {
        Ok(self.tables.lock()?.benefits.get(&benefit_id).cloned())
    }

    async fn find_redemption(&self, redemption_id: Uuid) -> Result<Option<Redemption>, Error> {
        Ok(self.tables.lock()?.redemptions.get(&redemption_id).cloned())
    }

    async fn applications(&self, filter: ApplicationFilter) -> Result<Vec<Application>, Error> {
        let applications = self
            .tables
            .lock()?
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect();

        Ok(applications)
    }

    async fn application_exists(
        &self,
        volunteer_id: Uuid,
        opportunity_id: Uuid,
    ) -> Result<bool, Error> {
        let exists = self.tables.lock()?.applications.values().any(|application| {
            application.volunteer_id == volunteer_id && application.opportunity_id == opportunity_id
        });

        Ok(exists)
    }

    async fn benefits(&self, filter: BenefitFilter) -> Result<Vec<Benefit>, Error> {
        let benefits = self
            .tables
            .lock()?
            .benefits
            .values()
            .filter(|benefit| filter.matches(benefit))
            .cloned()
            .collect();

        Ok(benefits)
    }

    async fn redemptions(&self, filter: RedemptionFilter) -> Result<Vec<Redemption>, Error> {
        let redemptions = self
            .tables
            .lock()?
            .redemptions
            .values()
            .filter(|redemption| filter.matches(redemption))
            .cloned()
            .collect();

        Ok(redemptions)
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), Error> {
        // The lock is held across validation and writes, so a commit is all-or-nothing
        let mut tables = self.tables.lock()?;
        tables.validate(&unit)?;
        tables.apply(unit);

        Ok(())
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }
}

/// Poisoned table lock, reduced to its message since the guard inside is not `Send`
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
