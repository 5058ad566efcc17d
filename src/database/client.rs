use std::sync::Arc;

use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::database::repository_impl::Repository;
use crate::database::repository_traits::RepositoryCore;
use crate::entities::account::{self, AccountEntity};
use crate::entities::points_credit::{self, PointsCreditEntity};
use crate::entities::task::{self, TaskEntity};
use crate::middleware::error::AppResult;

pub type Db = Surreal<Any>;

#[derive(Debug)]
pub struct DbConfig<'a> {
    pub url: &'a str,
    pub database: &'a str,
    pub namespace: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub retry_attempts: u8,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub client: Arc<Db>,
    pub tasks: Repository<TaskEntity>,
    pub accounts: Repository<AccountEntity>,
    pub points_credits: Repository<PointsCreditEntity>,
}

impl Database {
    pub async fn connect(config: DbConfig<'_>) -> AppResult<Self> {
        info!("->> connecting DB url={} ns={} db={}", config.url, config.namespace, config.database);
        let conn = connect(config.url).await?;

        if let (Some(password), Some(username)) = (config.password, config.username) {
            conn.signin(Root { username, password }).await?;
        }

        conn.use_ns(config.namespace)
            .use_db(config.database)
            .await?;

        let version = conn.version().await?;
        info!("->> connected DB version: {version}");

        let client = Arc::new(conn);
        let attempts = config.retry_attempts;
        Ok(Self {
            tasks: Repository::<TaskEntity>::new(client.clone(), task::TABLE_NAME.to_string(), attempts),
            accounts: Repository::<AccountEntity>::new(
                client.clone(),
                account::TABLE_NAME.to_string(),
                attempts,
            ),
            points_credits: Repository::<PointsCreditEntity>::new(
                client.clone(),
                points_credit::TABLE_NAME.to_string(),
                attempts,
            ),
            client,
        })
    }

    pub async fn run_migrations(&self) -> AppResult<()> {
        self.accounts.mutate_db().await?;
        self.tasks.mutate_db().await?;
        self.points_credits.mutate_db().await?;
        info!("->> schema migrations applied");
        Ok(())
    }
}
