use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::middleware::error::{AppError, AppResult};

pub const TABLE_NAME: &str = "task";

/// A reported waste pile tracked through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntity {
    pub id: Thing,
    pub reporter: Thing,
    pub lat: f64,
    pub lng: f64,
    pub size_class: SizeClass,
    pub status: TaskStatus,
    pub claimant: Option<Thing>,
    pub before_image_ref: String,
    pub after_image_ref: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TaskEntity {
    pub fn id_str(&self) -> String {
        self.id.id.to_raw()
    }

    pub fn is_claimed_by(&self, account_id: &str) -> bool {
        self.claimant
            .as_ref()
            .map(|c| c.id.to_raw() == account_id)
            .unwrap_or(false)
    }
}

#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Open,
    Claimed,
    Completed,
}

impl TaskStatus {
    /// Open -> Claimed -> Completed is the whole graph.
    pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
        matches!(
            (from, to),
            (TaskStatus::Open, TaskStatus::Claimed) | (TaskStatus::Claimed, TaskStatus::Completed)
        )
    }
}

#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

#[derive(Debug)]
pub struct TaskCreate {
    pub reporter: Thing,
    pub lat: f64,
    pub lng: f64,
    pub size_class: SizeClass,
    pub before_image_ref: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TransitionExtra {
    Claim {
        claimant: Thing,
    },
    Complete {
        claimant: Thing,
        after_image_ref: String,
    },
}

/// A lifecycle edge checked against the transition graph before it reaches storage.
#[derive(Debug, Clone)]
pub struct TaskTransition {
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub extra: TransitionExtra,
}

impl TaskTransition {
    pub fn new(from: TaskStatus, to: TaskStatus, extra: TransitionExtra) -> AppResult<Self> {
        let extra_fits = match (&extra, to) {
            (TransitionExtra::Claim { .. }, TaskStatus::Claimed) => true,
            (TransitionExtra::Complete { .. }, TaskStatus::Completed) => true,
            _ => false,
        };
        if !TaskStatus::can_transition(from, to) || !extra_fits {
            return Err(AppError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to, extra })
    }

    pub fn claimant(&self) -> &Thing {
        match &self.extra {
            TransitionExtra::Claim { claimant } => claimant,
            TransitionExtra::Complete { claimant, .. } => claimant,
        }
    }
}
