use crate::database::repository_impl::Repository;
use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils::{
    execute_cas, with_conflict_retry, CasOutcome, THROW_ACCOUNT_MISSING,
};
use crate::entities::account::TABLE_NAME as ACCOUNT_TABLE_NAME;
use crate::entities::points_credit::{PointsAward, PointsCreditEntity, TABLE_NAME};
use crate::entities::task::TABLE_NAME as TASK_TABLE_NAME;
use crate::interfaces::repositories::points_ledger_ifce::PointsLedgerRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;

impl Repository<PointsCreditEntity> {
    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS account ON TABLE {TABLE_NAME} TYPE record<{ACCOUNT_TABLE_NAME}> READONLY;
    DEFINE FIELD IF NOT EXISTS task ON TABLE {TABLE_NAME} TYPE record<{TASK_TABLE_NAME}> READONLY;
    DEFINE FIELD IF NOT EXISTS size_class ON TABLE {TABLE_NAME} TYPE 'Small'|'Medium'|'Large' READONLY;
    DEFINE FIELD IF NOT EXISTS points ON TABLE {TABLE_NAME} TYPE int ASSERT $value > 0 READONLY;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS idx_task_unique ON TABLE {TABLE_NAME} COLUMNS task UNIQUE;
    DEFINE INDEX IF NOT EXISTS idx_account ON TABLE {TABLE_NAME} COLUMNS account;
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }
}

#[async_trait]
impl PointsLedgerRepositoryInterface for Repository<PointsCreditEntity> {
    fn build_award_query<'b>(&self, query: Query<'b, Any>, award: &PointsAward) -> Query<'b, Any> {
        query
            .query(
                "LET $_award_acc = UPDATE $_award_account SET points += $_award_points RETURN AFTER;",
            )
            .query(format!(
                "IF array::len($_award_acc) == 0 {{ THROW \"{THROW_ACCOUNT_MISSING}\" }};"
            ))
            .query(format!(
                "CREATE {TABLE_NAME} SET
                    account=$_award_account,
                    task=$_award_task,
                    size_class=$_award_size_class,
                    points=$_award_points;"
            ))
            .bind(("_award_account", award.account.clone()))
            .bind(("_award_task", award.task.clone()))
            .bind(("_award_size_class", award.size_class))
            .bind(("_award_points", award.points))
    }

    async fn award(&self, award: &PointsAward) -> Result<CasOutcome, surrealdb::Error> {
        with_conflict_retry(self.retry_attempts(), move || {
            let qry = self.client.query("BEGIN TRANSACTION;");
            let qry = self
                .build_award_query(qry, award)
                .query("COMMIT TRANSACTION;");
            execute_cas(qry)
        })
        .await
    }

    async fn list_by_account(&self, account: &Thing) -> AppResult<Vec<PointsCreditEntity>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE account=$account ORDER BY created_at DESC;"
            ))
            .bind(("account", account.clone()))
            .await?;
        let credits: Vec<PointsCreditEntity> = res.take(0)?;
        Ok(credits)
    }
}
