use crate::database::repository_impl::Repository;
use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils::{
    execute_cas, with_conflict_retry, CasOutcome, THROW_CAS_REJECTED,
};
use crate::entities::account::TABLE_NAME as ACCOUNT_TABLE_NAME;
use crate::entities::task::{
    TaskCreate, TaskEntity, TaskStatus, TaskTransition, TransitionExtra, TABLE_NAME,
};
use crate::interfaces::repositories::task_ifce::TaskRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;
use uuid::Uuid;

impl Repository<TaskEntity> {
    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS reporter ON TABLE {TABLE_NAME} TYPE record<{ACCOUNT_TABLE_NAME}> READONLY;
    DEFINE FIELD IF NOT EXISTS lat ON TABLE {TABLE_NAME} TYPE float ASSERT $value >= -90 AND $value <= 90 READONLY;
    DEFINE FIELD IF NOT EXISTS lng ON TABLE {TABLE_NAME} TYPE float ASSERT $value >= -180 AND $value <= 180 READONLY;
    DEFINE FIELD IF NOT EXISTS size_class ON TABLE {TABLE_NAME} TYPE 'Small'|'Medium'|'Large' READONLY;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE 'Open'|'Claimed'|'Completed';
    DEFINE FIELD IF NOT EXISTS claimant ON TABLE {TABLE_NAME} TYPE option<record<{ACCOUNT_TABLE_NAME}>>;
    DEFINE FIELD IF NOT EXISTS before_image_ref ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0 READONLY;
    DEFINE FIELD IF NOT EXISTS after_image_ref ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS claimed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS completed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS idx_status ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE INDEX IF NOT EXISTS idx_reporter ON TABLE {TABLE_NAME} COLUMNS reporter;
    DEFINE INDEX IF NOT EXISTS idx_claimant ON TABLE {TABLE_NAME} COLUMNS claimant;
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepositoryInterface for Repository<TaskEntity> {
    async fn create(&self, record: TaskCreate) -> AppResult<TaskEntity> {
        let id = Thing::from((TABLE_NAME, Uuid::new_v4().simple().to_string().as_str()));
        let mut res = self
            .client
            .query(
                "CREATE ONLY $id SET
                    reporter=$reporter,
                    lat=$lat,
                    lng=$lng,
                    size_class=$size_class,
                    status=$status,
                    before_image_ref=$before_image_ref,
                    description=$description;",
            )
            .bind(("id", id.clone()))
            .bind(("reporter", record.reporter))
            .bind(("lat", record.lat))
            .bind(("lng", record.lng))
            .bind(("size_class", record.size_class))
            .bind(("status", TaskStatus::Open))
            .bind(("before_image_ref", record.before_image_ref))
            .bind(("description", record.description))
            .await?;
        let task: Option<TaskEntity> = res.take(0)?;
        task.ok_or(AppError::EntityFailIdNotFound {
            ident: id.to_string(),
        })
    }

    async fn get(&self, id: &str) -> AppResult<Option<TaskEntity>> {
        Ok(self.select_by_id(id).await?)
    }

    async fn get_many(&self, ids: Vec<Thing>) -> AppResult<Vec<TaskEntity>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut res = self
            .client
            .query("SELECT * FROM $ids;")
            .bind(("ids", ids))
            .await?;
        let tasks: Vec<TaskEntity> = res.take(0)?;
        Ok(tasks)
    }

    async fn list_open(&self) -> AppResult<Vec<TaskEntity>> {
        let mut res = self
            .client
            .query(format!("SELECT * FROM {TABLE_NAME} WHERE status=$status;"))
            .bind(("status", TaskStatus::Open))
            .await?;
        let tasks: Vec<TaskEntity> = res.take(0)?;
        Ok(tasks)
    }

    async fn list_by_reporter(&self, reporter: &Thing) -> AppResult<Vec<TaskEntity>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE reporter=$reporter ORDER BY created_at DESC;"
            ))
            .bind(("reporter", reporter.clone()))
            .await?;
        let tasks: Vec<TaskEntity> = res.take(0)?;
        Ok(tasks)
    }

    async fn list_by_claimant(&self, claimant: &Thing) -> AppResult<Vec<TaskEntity>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE claimant=$claimant ORDER BY claimed_at DESC;"
            ))
            .bind(("claimant", claimant.clone()))
            .await?;
        let tasks: Vec<TaskEntity> = res.take(0)?;
        Ok(tasks)
    }

    fn build_transition_query<'b>(
        &self,
        query: Query<'b, Any>,
        task: &Thing,
        transition: &TaskTransition,
    ) -> Query<'b, Any> {
        let qry = match &transition.extra {
            TransitionExtra::Claim { .. } => query.query(
                "LET $_task_res = UPDATE $_task_id SET
                    status=$_task_to,
                    claimant=$_task_claimant,
                    claimed_at=time::now()
                WHERE status=$_task_from RETURN AFTER;",
            ),
            TransitionExtra::Complete {
                after_image_ref, ..
            } => query
                .query(
                    "LET $_task_res = UPDATE $_task_id SET
                        status=$_task_to,
                        after_image_ref=$_task_after_image_ref,
                        completed_at=time::now()
                    WHERE status=$_task_from AND claimant=$_task_claimant RETURN AFTER;",
                )
                .bind(("_task_after_image_ref", after_image_ref.clone())),
        };

        qry.query(format!(
            "IF array::len($_task_res) == 0 {{ THROW \"{THROW_CAS_REJECTED}\" }};"
        ))
        .bind(("_task_id", task.clone()))
        .bind(("_task_from", transition.from))
        .bind(("_task_to", transition.to))
        .bind(("_task_claimant", transition.claimant().clone()))
    }

    async fn transition(
        &self,
        task: &Thing,
        transition: &TaskTransition,
    ) -> Result<CasOutcome, surrealdb::Error> {
        with_conflict_retry(self.retry_attempts(), move || {
            let qry = self.client.query("BEGIN TRANSACTION;");
            let qry = self
                .build_transition_query(qry, task, transition)
                .query("COMMIT TRANSACTION;");
            execute_cas(qry)
        })
        .await
    }
}
