use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::task::SizeClass;

pub const TABLE_NAME: &str = "points_credit";

/// One ledger row per completed task, the task column is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsCreditEntity {
    pub id: Thing,
    pub account: Thing,
    pub task: Thing,
    pub size_class: SizeClass,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PointsAward {
    pub account: Thing,
    pub task: Thing,
    pub size_class: SizeClass,
    pub points: u32,
}
