use crate::database::surrdb_utils::{CasOutcome, THROW_ACCOUNT_MISSING};
use crate::entities::points_credit::{PointsAward, PointsCreditEntity};
use crate::entities::task::SizeClass;
use crate::interfaces::repositories::points_ledger_ifce::PointsLedgerRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;
use tracing::{info, warn};

/// Points paid per completed task, by size class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tariff {
    pub small: u32,
    pub medium: u32,
    pub large: u32,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            small: 10,
            medium: 25,
            large: 50,
        }
    }
}

impl Tariff {
    pub fn points_for(&self, size_class: SizeClass) -> u32 {
        match size_class {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
        }
    }
}

pub struct PointsLedger<'a, L>
where
    L: PointsLedgerRepositoryInterface,
{
    repository: &'a L,
    tariff: &'a Tariff,
}

impl<'a, L> PointsLedger<'a, L>
where
    L: PointsLedgerRepositoryInterface,
{
    pub fn new(repository: &'a L, tariff: &'a Tariff) -> Self {
        Self { repository, tariff }
    }

    pub fn prepare(&self, picker: &Thing, task: &Thing, size_class: SizeClass) -> PointsAward {
        PointsAward {
            account: picker.clone(),
            task: task.clone(),
            size_class,
            points: self.tariff.points_for(size_class),
        }
    }

    /// Adds the credit statements to a transaction that already holds the
    /// task's completion CAS, so both commit or neither does.
    pub fn build_award_query<'b>(&self, query: Query<'b, Any>, award: &PointsAward) -> Query<'b, Any> {
        self.repository.build_award_query(query, award)
    }

    /// Credits `picker` for `task` on its own. Returns 0 when the task was already paid.
    pub async fn award(&self, picker: &Thing, task: &Thing, size_class: SizeClass) -> AppResult<u32> {
        let award = self.prepare(picker, task, size_class);
        match self.repository.award(&award).await? {
            CasOutcome::Applied => {
                info!("credited {} points to {picker} for {task}", award.points);
                Ok(award.points)
            }
            CasOutcome::Rejected(THROW_ACCOUNT_MISSING) => Err(AppError::EntityFailIdNotFound {
                ident: picker.to_string(),
            }),
            CasOutcome::Rejected(_) => {
                warn!("{task} already credited, skipping award");
                Ok(0)
            }
        }
    }

    pub async fn credits(&self, account: &Thing) -> AppResult<Vec<PointsCreditEntity>> {
        self.repository.list_by_account(account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tariff() {
        let tariff = Tariff::default();
        assert_eq!(tariff.points_for(SizeClass::Small), 10);
        assert_eq!(tariff.points_for(SizeClass::Medium), 25);
        assert_eq!(tariff.points_for(SizeClass::Large), 50);
    }

    #[test]
    fn configured_tariff_is_used() {
        let tariff = Tariff {
            small: 1,
            medium: 2,
            large: 3,
        };
        assert_eq!(tariff.points_for(SizeClass::Large), 3);
    }
}
