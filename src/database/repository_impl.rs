use crate::database::client::Db;
use crate::database::repository_traits::RepositoryCore;
use crate::database::surrdb_utils;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::{marker::PhantomData, string::String};
use surrealdb::sql::Thing;

#[derive(Debug)]
pub struct Repository<E> {
    pub client: Arc<Db>,
    pub table_name: String,
    retry_attempts: u8,
    _phantom: PhantomData<E>,
}

// no `E: Clone` bound, the entity type is only a marker
impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            table_name: self.table_name.clone(),
            retry_attempts: self.retry_attempts,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Serialize + for<'de> serde::Deserialize<'de> + Send + Sync + 'static> RepositoryCore
    for Repository<E>
{
    type Connection = Arc<Db>;
    type Error = surrealdb::Error;
    type QueryResultItem = E;

    fn new(client: Self::Connection, table_name: String, retry_attempts: u8) -> Self {
        Repository {
            client,
            table_name,
            retry_attempts,
            _phantom: PhantomData,
        }
    }

    fn get_thing(&self, id: &str) -> Thing {
        surrdb_utils::get_thing(&self.table_name, id)
    }

    fn retry_attempts(&self) -> u8 {
        self.retry_attempts
    }

    async fn select_by_id(&self, record_id: &str) -> Result<Option<E>, Self::Error> {
        let thing = self.get_thing(record_id);
        let res: Option<E> = self
            .client
            .select((self.table_name.as_str(), thing.id.to_raw()))
            .await?;
        Ok(res)
    }

    async fn count_records(&self) -> Result<u64, surrealdb::Error> {
        let query = format!(
            "(SELECT count() as count FROM {} GROUP ALL)[0].count OR 0;",
            self.table_name
        );
        let mut res = self.client.query(&query).await?;
        let res: Option<u64> = res.take(0)?;
        Ok(res.unwrap_or(0))
    }
}
