use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::account::{AccountEntity, AccountRole};
use crate::entities::points_credit::PointsCreditEntity;
use crate::entities::task::SizeClass;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub display_name: String,
    pub role: AccountRole,
    pub points: u64,
}

impl From<AccountEntity> for AccountView {
    fn from(account: AccountEntity) -> Self {
        AccountView {
            id: account.id_str(),
            display_name: account.display_name,
            role: account.role,
            points: account.points,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointsCreditView {
    pub task_id: String,
    pub size_class: SizeClass,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

impl From<PointsCreditEntity> for PointsCreditView {
    fn from(credit: PointsCreditEntity) -> Self {
        PointsCreditView {
            task_id: credit.task.id.to_raw(),
            size_class: credit.size_class,
            points: credit.points,
            created_at: credit.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub image_ref: String,
}
