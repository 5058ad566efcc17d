use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils::CasOutcome;
use crate::entities::points_credit::{PointsAward, PointsCreditEntity};
use crate::middleware::error::AppResult;
use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;

#[async_trait]
pub trait PointsLedgerRepositoryInterface: RepositoryCore {
    fn build_award_query<'b>(&self, query: Query<'b, Any>, award: &PointsAward) -> Query<'b, Any>;
    async fn award(&self, award: &PointsAward) -> Result<CasOutcome, surrealdb::Error>;
    async fn list_by_account(&self, account: &Thing) -> AppResult<Vec<PointsCreditEntity>>;
}
