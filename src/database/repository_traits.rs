use async_trait::async_trait;
use std::string::String;
use surrealdb::sql::Thing;

#[async_trait]
pub trait RepositoryCore {
    type Connection;
    type Error: std::error::Error + Send;
    type QueryResultItem;

    fn new(conn: Self::Connection, table_name: String, retry_attempts: u8) -> Self
    where
        Self: Sized;

    fn get_thing(&self, id: &str) -> Thing;
    fn retry_attempts(&self) -> u8;

    async fn select_by_id(
        &self,
        record_id: &str,
    ) -> Result<Option<Self::QueryResultItem>, Self::Error>;
    async fn count_records(&self) -> Result<u64, Self::Error>;
}
