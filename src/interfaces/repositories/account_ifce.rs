use crate::database::repository_traits::RepositoryCore;
use crate::entities::account::{AccountCreate, AccountEntity, AccountRole};
use crate::middleware::error::AppResult;
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepositoryInterface: RepositoryCore {
    async fn create(&self, record: AccountCreate) -> AppResult<AccountEntity>;
    async fn get(&self, id: &str) -> AppResult<Option<AccountEntity>>;
    /// Ordered by points descending, ties by id ascending.
    async fn top_by_points(&self, role: AccountRole, limit: u16) -> AppResult<Vec<AccountEntity>>;
}
