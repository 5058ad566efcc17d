use crate::database::repository_impl::Repository;
use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils::get_thing;
use crate::entities::account::{AccountCreate, AccountEntity, AccountRole, TABLE_NAME};
use crate::interfaces::repositories::account_ifce::AccountRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use async_trait::async_trait;
use surrealdb::sql::Thing;
use uuid::Uuid;

impl Repository<AccountEntity> {
    pub(in crate::database) async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS display_name ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS role ON TABLE {TABLE_NAME} TYPE 'Reporter'|'Picker' READONLY;
    DEFINE FIELD IF NOT EXISTS points ON TABLE {TABLE_NAME} TYPE int DEFAULT 0 ASSERT $value >= 0 AND $value >= ($before OR 0);
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS idx_role_points ON TABLE {TABLE_NAME} COLUMNS role, points;
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepositoryInterface for Repository<AccountEntity> {
    async fn create(&self, record: AccountCreate) -> AppResult<AccountEntity> {
        let id = match record.id {
            Some(ref id) => get_thing(TABLE_NAME, id),
            None => Thing::from((TABLE_NAME, Uuid::new_v4().simple().to_string().as_str())),
        };
        let mut res = self
            .client
            .query("CREATE ONLY $id SET display_name=$display_name, role=$role, points=0;")
            .bind(("id", id.clone()))
            .bind(("display_name", record.display_name))
            .bind(("role", record.role))
            .await?;
        let created: Result<Option<AccountEntity>, surrealdb::Error> = res.take(0);
        match created {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(AppError::EntityFailIdNotFound {
                ident: id.to_string(),
            }),
            Err(err) if err.to_string().contains("already exists") => {
                Err(AppError::AlreadyExists {
                    ident: id.id.to_raw(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: &str) -> AppResult<Option<AccountEntity>> {
        Ok(self.select_by_id(id).await?)
    }

    async fn top_by_points(&self, role: AccountRole, limit: u16) -> AppResult<Vec<AccountEntity>> {
        let mut res = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE role=$role ORDER BY points DESC, id ASC LIMIT {limit};"
            ))
            .bind(("role", role))
            .await?;
        let accounts: Vec<AccountEntity> = res.take(0)?;
        Ok(accounts)
    }
}
