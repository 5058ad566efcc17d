use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

pub const TABLE_NAME: &str = "account";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntity {
    pub id: Thing,
    pub display_name: String,
    pub role: AccountRole,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

impl AccountEntity {
    pub fn id_str(&self) -> String {
        self.id.id.to_raw()
    }
}

/// Fixed when the account is created, a user is never both.
#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRole {
    Reporter,
    Picker,
}

#[derive(Debug)]
pub struct AccountCreate {
    pub id: Option<String>,
    pub display_name: String,
    pub role: AccountRole,
}
