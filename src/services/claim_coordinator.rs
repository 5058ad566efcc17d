use crate::database::surrdb_utils::CasOutcome;
use crate::entities::task::{TaskStatus, TaskTransition, TransitionExtra};
use crate::geo::GeoIndex;
use crate::interfaces::repositories::task_ifce::TaskRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use surrealdb::sql::Thing;
use tracing::{info, warn};

/// Grants exclusive pickup of an open task. The storage CAS is the only
/// serialization point, the index is updated after the fact.
pub struct ClaimCoordinator<'a, T>
where
    T: TaskRepositoryInterface,
{
    tasks: &'a T,
    geo_index: &'a GeoIndex,
}

impl<'a, T> ClaimCoordinator<'a, T>
where
    T: TaskRepositoryInterface,
{
    pub fn new(tasks: &'a T, geo_index: &'a GeoIndex) -> Self {
        Self { tasks, geo_index }
    }

    pub async fn claim(&self, task_id: &str, picker: &Thing) -> AppResult<()> {
        let task = self.tasks.get_thing(task_id);
        let key = task.id.to_raw();
        let transition = TaskTransition::new(
            TaskStatus::Open,
            TaskStatus::Claimed,
            TransitionExtra::Claim {
                claimant: picker.clone(),
            },
        )?;

        match self.tasks.transition(&task, &transition).await? {
            CasOutcome::Applied => {
                self.geo_index.remove(&key);
                info!("{task} claimed by {picker}");
                Ok(())
            }
            CasOutcome::Rejected(_) => {
                let current = self.tasks.get(&key).await?;
                let picker_key = picker.id.to_raw();
                match current {
                    Some(t) if t.status == TaskStatus::Claimed && t.is_claimed_by(&picker_key) => {
                        self.geo_index.remove(&key);
                        info!("{task} already claimed by {picker}, nothing to do");
                        Ok(())
                    }
                    current => {
                        if current.map_or(true, |t| t.status != TaskStatus::Open) {
                            self.geo_index.remove(&key);
                        }
                        warn!("claim on {task} by {picker} lost");
                        Err(AppError::Conflict { ident: key })
                    }
                }
            }
        }
    }
}
