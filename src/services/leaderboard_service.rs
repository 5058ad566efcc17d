use crate::entities::account::{AccountEntity, AccountRole};
use crate::interfaces::repositories::account_ifce::AccountRepositoryInterface;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::mw_ctx::DispatchLimits;
use crate::models::view::leaderboard::LeaderboardEntryView;

/// Ranks pickers straight from the account totals, so a completion is
/// visible on the next read.
pub struct LeaderboardAggregator<'a, A>
where
    A: AccountRepositoryInterface,
{
    accounts_repository: &'a A,
    limits: &'a DispatchLimits,
}

impl<'a, A> LeaderboardAggregator<'a, A>
where
    A: AccountRepositoryInterface + Sync,
{
    pub fn new(accounts_repository: &'a A, limits: &'a DispatchLimits) -> Self {
        Self {
            accounts_repository,
            limits,
        }
    }

    pub async fn top_n(&self, n: Option<u16>) -> AppResult<Vec<LeaderboardEntryView>> {
        let n = match n {
            Some(0) => {
                return Err(AppError::Validation {
                    description: "limit must be >= 1".to_string(),
                })
            }
            Some(n) => n.min(self.limits.leaderboard_max_limit),
            None => self.limits.leaderboard_default_limit,
        };
        let accounts = self
            .accounts_repository
            .top_by_points(AccountRole::Picker, n)
            .await?;
        let mut ranked = rank_accounts(accounts);
        ranked.truncate(n as usize);
        Ok(ranked)
    }
}

/// Points descending, ties by account id ascending, rank is the 1-based position.
pub fn rank_accounts(mut accounts: Vec<AccountEntity>) -> Vec<LeaderboardEntryView> {
    accounts.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.id_str().cmp(&b.id_str()))
    });
    accounts
        .into_iter()
        .enumerate()
        .map(|(i, account)| LeaderboardEntryView {
            account_id: account.id_str(),
            display_name: account.display_name,
            points: account.points,
            rank: i as u32 + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use surrealdb::sql::Thing;

    fn picker(id: &str, points: u64) -> AccountEntity {
        AccountEntity {
            id: Thing::from(("account", id)),
            display_name: id.to_uppercase(),
            role: AccountRole::Picker,
            points,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ties_break_by_account_id() {
        let ranked = rank_accounts(vec![picker("b", 50), picker("a", 50), picker("c", 30)]);
        let got: Vec<(&str, u64, u32)> = ranked
            .iter()
            .map(|e| (e.account_id.as_str(), e.points, e.rank))
            .collect();
        assert_eq!(got, vec![("a", 50, 1), ("b", 50, 2), ("c", 30, 3)]);
    }

    #[test]
    fn empty_board() {
        assert!(rank_accounts(vec![]).is_empty());
    }
}
