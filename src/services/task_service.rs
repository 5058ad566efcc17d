use std::collections::HashMap;

use crate::database::client::Db;
use crate::database::surrdb_utils::{
    execute_cas, with_conflict_retry, CasOutcome, THROW_ACCOUNT_MISSING,
};
use crate::entities::account::AccountRole;
use crate::entities::task::{
    SizeClass, TaskCreate, TaskEntity, TaskStatus, TaskTransition, TransitionExtra,
};
use crate::geo::{is_valid_coord, GeoIndex, GeoPoint};
use crate::interfaces::repositories::points_ledger_ifce::PointsLedgerRepositoryInterface;
use crate::interfaces::repositories::task_ifce::TaskRepositoryInterface;
use crate::middleware::ctx::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::mw_ctx::DispatchLimits;
use crate::models::view::task::NearbyTaskView;
use crate::services::claim_coordinator::ClaimCoordinator;
use crate::services::points_ledger::{PointsLedger, Tariff};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

// each pass evicts the stale hits it found, so this bounds index repair per query
const NEARBY_PASSES: usize = 3;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubmitTaskInput {
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be within [-90, 90]"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "lng must be within [-180, 180]"))]
    pub lng: f64,
    pub size_class: SizeClass,
    #[validate(length(min = 1, message = "before_image_ref is required"))]
    pub before_image_ref: String,
    #[validate(length(max = 1000, message = "Max 1000 characters for description"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CompleteTaskInput {
    #[validate(length(min = 1, message = "after_image_ref is required"))]
    pub after_image_ref: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: Option<f64>,
    pub limit: Option<u16>,
}

pub struct TaskService<'a, T, L>
where
    T: TaskRepositoryInterface,
    L: PointsLedgerRepositoryInterface,
{
    db: &'a Db,
    tasks_repository: &'a T,
    geo_index: &'a GeoIndex,
    limits: &'a DispatchLimits,
    claim_coordinator: ClaimCoordinator<'a, T>,
    points_ledger: PointsLedger<'a, L>,
}

impl<'a, T, L> TaskService<'a, T, L>
where
    T: TaskRepositoryInterface + Sync,
    L: PointsLedgerRepositoryInterface + Sync,
{
    pub fn new(
        db: &'a Db,
        tasks_repository: &'a T,
        points_repository: &'a L,
        geo_index: &'a GeoIndex,
        tariff: &'a Tariff,
        limits: &'a DispatchLimits,
    ) -> Self {
        Self {
            db,
            tasks_repository,
            geo_index,
            limits,
            claim_coordinator: ClaimCoordinator::new(tasks_repository, geo_index),
            points_ledger: PointsLedger::new(points_repository, tariff),
        }
    }

    pub async fn submit(&self, identity: &Identity, input: SubmitTaskInput) -> AppResult<TaskEntity> {
        identity.require_role(AccountRole::Reporter)?;
        input.validate()?;
        if !is_valid_coord(input.lat, input.lng) {
            return Err(AppError::Validation {
                description: "invalid coordinate".to_string(),
            });
        }
        let before_image_ref = input.before_image_ref.trim().to_string();
        if before_image_ref.is_empty() {
            return Err(AppError::Validation {
                description: "before_image_ref is required".to_string(),
            });
        }
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let task = self
            .tasks_repository
            .create(TaskCreate {
                reporter: identity.account_thing(),
                lat: input.lat,
                lng: input.lng,
                size_class: input.size_class,
                before_image_ref,
                description,
            })
            .await?;

        self.geo_index.insert(
            &task.id_str(),
            GeoPoint {
                lat: task.lat,
                lng: task.lng,
            },
        );
        info!("{} reported {} at ({}, {})", identity.account_id, task.id, task.lat, task.lng);
        Ok(task)
    }

    /// Open tasks around a point, closest first. Index hits whose task is no
    /// longer open are dropped from the result and evicted from the index.
    pub async fn nearby(&self, query: NearbyQuery) -> AppResult<Vec<NearbyTaskView>> {
        if !is_valid_coord(query.lat, query.lng) {
            return Err(AppError::Validation {
                description: "lat must be within [-90, 90] and lng within [-180, 180]".to_string(),
            });
        }
        let radius = query.radius.unwrap_or(self.limits.nearby_default_radius_m);
        if !(radius > 0.0 && radius <= self.limits.nearby_max_radius_m) {
            return Err(AppError::Validation {
                description: format!(
                    "radius must be > 0 and <= {}",
                    self.limits.nearby_max_radius_m
                ),
            });
        }
        let limit = match query.limit {
            Some(0) => {
                return Err(AppError::Validation {
                    description: "limit must be >= 1".to_string(),
                })
            }
            Some(l) => l.min(self.limits.nearby_max_limit),
            None => self.limits.nearby_default_limit,
        } as usize;

        let mut result = Vec::new();
        for _ in 0..NEARBY_PASSES {
            let hits = self.geo_index.nearest(query.lat, query.lng, radius, limit);
            let ids = hits
                .iter()
                .map(|h| self.tasks_repository.get_thing(&h.id))
                .collect();
            let mut by_id: HashMap<String, TaskEntity> = self
                .tasks_repository
                .get_many(ids)
                .await?
                .into_iter()
                .map(|t| (t.id_str(), t))
                .collect();

            let mut stale: Vec<&str> = Vec::new();
            result.clear();
            for hit in &hits {
                match by_id.remove(&hit.id) {
                    Some(task) if task.status == TaskStatus::Open => {
                        result.push(NearbyTaskView::new(task, hit.distance_m))
                    }
                    _ => stale.push(hit.id.as_str()),
                }
            }
            if stale.is_empty() || hits.len() < limit {
                if !stale.is_empty() {
                    debug!("evicting {} stale index entries", stale.len());
                    self.geo_index.remove_many(stale);
                }
                break;
            }
            debug!("evicting {} stale index entries, querying again", stale.len());
            self.geo_index.remove_many(stale);
        }
        Ok(result)
    }

    pub async fn get(&self, task_id: &str) -> AppResult<TaskEntity> {
        self.tasks_repository
            .get(task_id)
            .await?
            .ok_or(AppError::EntityFailIdNotFound {
                ident: task_id.to_string(),
            })
    }

    pub async fn list_reported(&self, identity: &Identity) -> AppResult<Vec<TaskEntity>> {
        identity.require_role(AccountRole::Reporter)?;
        self.tasks_repository
            .list_by_reporter(&identity.account_thing())
            .await
    }

    pub async fn list_claimed(&self, identity: &Identity) -> AppResult<Vec<TaskEntity>> {
        identity.require_role(AccountRole::Picker)?;
        self.tasks_repository
            .list_by_claimant(&identity.account_thing())
            .await
    }

    pub async fn claim(&self, identity: &Identity, task_id: &str) -> AppResult<()> {
        identity.require_role(AccountRole::Picker)?;
        self.claim_coordinator
            .claim(task_id, &identity.account_thing())
            .await
    }

    /// Finishes a claimed task and pays the claimant. The state change and the
    /// credit run in one transaction guarded by the completion CAS.
    pub async fn complete(
        &self,
        identity: &Identity,
        task_id: &str,
        input: CompleteTaskInput,
    ) -> AppResult<u32> {
        identity.require_role(AccountRole::Picker)?;
        input.validate()?;
        let after_image_ref = input.after_image_ref.trim().to_string();
        if after_image_ref.is_empty() {
            return Err(AppError::Validation {
                description: "after_image_ref is required".to_string(),
            });
        }

        let task = self.get(task_id).await?;
        self.check_completable(&task, &identity.account_id)?;

        let picker = identity.account_thing();
        let transition = TaskTransition::new(
            TaskStatus::Claimed,
            TaskStatus::Completed,
            TransitionExtra::Complete {
                claimant: picker.clone(),
                after_image_ref,
            },
        )?;
        let award = self.points_ledger.prepare(&picker, &task.id, task.size_class);

        let db = self.db;
        let tasks_repository = self.tasks_repository;
        let points_ledger = &self.points_ledger;
        let (task_thing, transition, award_ref) = (&task.id, &transition, &award);
        let outcome = with_conflict_retry(tasks_repository.retry_attempts(), move || {
            let qry = db.query("BEGIN TRANSACTION;");
            let qry = tasks_repository.build_transition_query(qry, task_thing, transition);
            let qry = points_ledger
                .build_award_query(qry, award_ref)
                .query("COMMIT TRANSACTION;");
            execute_cas(qry)
        })
        .await?;

        match outcome {
            CasOutcome::Applied => {
                info!(
                    "{} completed by {}, {} points credited",
                    task.id, picker, award.points
                );
                Ok(award.points)
            }
            CasOutcome::Rejected(THROW_ACCOUNT_MISSING) => Err(AppError::EntityFailIdNotFound {
                ident: identity.account_id.clone(),
            }),
            CasOutcome::Rejected(_) => {
                warn!("completion of {} by {} rejected", task.id, picker);
                let current = self.get(task_id).await?;
                self.check_completable(&current, &identity.account_id)?;
                Err(AppError::Conflict {
                    ident: current.id_str(),
                })
            }
        }
    }

    fn check_completable(&self, task: &TaskEntity, account_id: &str) -> AppResult<()> {
        match task.status {
            TaskStatus::Completed => Err(AppError::Conflict {
                ident: task.id_str(),
            }),
            TaskStatus::Claimed if task.is_claimed_by(account_id) => Ok(()),
            TaskStatus::Open | TaskStatus::Claimed => Err(AppError::NotClaimant {
                ident: task.id_str(),
            }),
        }
    }
}
