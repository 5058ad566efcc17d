use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils::CasOutcome;
use crate::entities::task::{TaskCreate, TaskEntity, TaskTransition};
use crate::middleware::error::AppResult;
use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;

#[async_trait]
pub trait TaskRepositoryInterface: RepositoryCore {
    async fn create(&self, record: TaskCreate) -> AppResult<TaskEntity>;
    async fn get(&self, id: &str) -> AppResult<Option<TaskEntity>>;

    /// Existing tasks among `ids`, missing ids are skipped.
    async fn get_many(&self, ids: Vec<Thing>) -> AppResult<Vec<TaskEntity>>;
    async fn list_open(&self) -> AppResult<Vec<TaskEntity>>;
    async fn list_by_reporter(&self, reporter: &Thing) -> AppResult<Vec<TaskEntity>>;
    async fn list_by_claimant(&self, claimant: &Thing) -> AppResult<Vec<TaskEntity>>;

    /// Appends the guarded update to an open transaction. The statement THROWs
    /// when the stored state no longer matches `transition.from`.
    fn build_transition_query<'b>(
        &self,
        query: Query<'b, Any>,
        task: &Thing,
        transition: &TaskTransition,
    ) -> Query<'b, Any>;

    async fn transition(
        &self,
        task: &Thing,
        transition: &TaskTransition,
    ) -> Result<CasOutcome, surrealdb::Error>;
}
