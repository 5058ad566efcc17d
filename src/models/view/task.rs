use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::task::{SizeClass, TaskEntity, TaskStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub task_id: String,
    pub reporter_id: String,
    pub lat: f64,
    pub lng: f64,
    pub size_class: SizeClass,
    pub status: TaskStatus,
    pub claimant_id: Option<String>,
    pub before_image_ref: String,
    pub after_image_ref: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskEntity> for TaskView {
    fn from(task: TaskEntity) -> Self {
        TaskView {
            task_id: task.id_str(),
            reporter_id: task.reporter.id.to_raw(),
            lat: task.lat,
            lng: task.lng,
            size_class: task.size_class,
            status: task.status,
            claimant_id: task.claimant.map(|c| c.id.to_raw()),
            before_image_ref: task.before_image_ref,
            after_image_ref: task.after_image_ref,
            description: task.description,
            created_at: task.created_at,
            claimed_at: task.claimed_at,
            completed_at: task.completed_at,
            updated_at: task.updated_at,
        }
    }
}

/// One row of a nearby query, closest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyTaskView {
    pub task_id: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_meters: f64,
    pub size_class: SizeClass,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub before_image_ref: String,
}

impl NearbyTaskView {
    pub fn new(task: TaskEntity, distance_meters: f64) -> Self {
        NearbyTaskView {
            task_id: task.id_str(),
            lat: task.lat,
            lng: task.lng,
            distance_meters,
            size_class: task.size_class,
            description: task.description,
            status: task.status,
            before_image_ref: task.before_image_ref,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub ok: bool,
    pub points_awarded: u32,
}
