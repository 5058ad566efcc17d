use std::future::Future;
use std::time::Duration;

use rand::Rng;
use surrealdb::engine::any::Any;
use surrealdb::method::Query;
use surrealdb::sql::Thing;
use tracing::warn;

pub const THROW_CAS_REJECTED: &str = "cas_rejected";
pub const THROW_ACCOUNT_MISSING: &str = "account_missing";
pub const DUPLICATE_CREDIT: &str = "duplicate_credit";

/// Outcome of a guarded multi-statement write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    Rejected(&'static str),
}

// accepts either `table:key` or a bare key
pub fn get_thing(table_name: &str, id: &str) -> Thing {
    let key = match id.split_once(':') {
        Some((tb, key)) if tb == table_name => key,
        _ => id,
    };
    Thing::from((table_name, key))
}

pub fn is_retryable(error: &surrealdb::Error) -> bool {
    let msg = error.to_string();
    msg.contains("can be retried")
        || msg.contains("read or write conflict")
        || msg.contains("Transaction conflict")
}

fn is_not_executed(error: &surrealdb::Error) -> bool {
    error.to_string().contains("not executed")
}

fn is_unique_violation(error: &surrealdb::Error) -> bool {
    error.to_string().contains("already contains")
}

/// Runs a transaction built by the caller and classifies the per-statement
/// errors: a THROWn guard marker means the guarded write did not apply.
pub async fn execute_cas(query: Query<'_, Any>) -> Result<CasOutcome, surrealdb::Error> {
    let mut response = query.await?;
    let mut errors: Vec<(usize, surrealdb::Error)> = response.take_errors().into_iter().collect();
    if errors.is_empty() {
        return Ok(CasOutcome::Applied);
    }
    errors.sort_by_key(|(idx, _)| *idx);

    for marker in [THROW_CAS_REJECTED, THROW_ACCOUNT_MISSING] {
        if errors.iter().any(|(_, e)| e.to_string().contains(marker)) {
            return Ok(CasOutcome::Rejected(marker));
        }
    }
    if errors.iter().any(|(_, e)| is_unique_violation(e)) {
        return Ok(CasOutcome::Rejected(DUPLICATE_CREDIT));
    }
    if let Some(pos) = errors.iter().position(|(_, e)| is_retryable(e)) {
        return Err(errors.swap_remove(pos).1);
    }
    let pos = errors
        .iter()
        .position(|(_, e)| !is_not_executed(e))
        .unwrap_or(0);
    Err(errors.swap_remove(pos).1)
}

/// Re-runs `op` while the storage engine reports an optimistic transaction
/// conflict. The operation is rebuilt on every attempt so guards are re-evaluated.
pub async fn with_conflict_retry<T, F, Fut>(
    attempts: u8,
    mut op: F,
) -> Result<T, surrealdb::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, surrealdb::Error>>,
{
    let attempts = attempts.max(1);
    let mut attempt: u8 = 1;
    loop {
        match op().await {
            Err(err) if is_retryable(&err) && attempt < attempts => {
                let backoff_ms = 5u64 * (1u64 << attempt.min(6)) + rand::thread_rng().gen_range(0..5);
                warn!("storage conflict, retry {attempt}/{attempts} in {backoff_ms}ms: {err}");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                attempt += 1;
            }
            res => return res,
        }
    }
}
