use crate::entities::account::{AccountCreate, AccountEntity, AccountRole};
use crate::entities::points_credit::PointsCreditEntity;
use crate::interfaces::repositories::account_ifce::AccountRepositoryInterface;
use crate::interfaces::repositories::points_ledger_ifce::PointsLedgerRepositoryInterface;
use crate::middleware::ctx::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::services::points_ledger::{PointsLedger, Tariff};
use crate::utils::jwt::JWT;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64, message = "display_name must have 1 to 64 characters"))]
    pub display_name: String,
    pub role: AccountRole,
}

pub struct AccountService<'a, A, L>
where
    A: AccountRepositoryInterface,
    L: PointsLedgerRepositoryInterface,
{
    accounts_repository: &'a A,
    points_ledger: PointsLedger<'a, L>,
    jwt: &'a JWT,
}

impl<'a, A, L> AccountService<'a, A, L>
where
    A: AccountRepositoryInterface + Sync,
    L: PointsLedgerRepositoryInterface + Sync,
{
    pub fn new(
        accounts_repository: &'a A,
        points_repository: &'a L,
        tariff: &'a Tariff,
        jwt: &'a JWT,
    ) -> Self {
        Self {
            accounts_repository,
            points_ledger: PointsLedger::new(points_repository, tariff),
            jwt,
        }
    }

    /// Creates the account and issues its bearer token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(AccountEntity, String)> {
        input.validate()?;
        let display_name = input.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AppError::Validation {
                description: "display_name must have 1 to 64 characters".to_string(),
            });
        }
        let account = self
            .accounts_repository
            .create(AccountCreate {
                id: None,
                display_name,
                role: input.role,
            })
            .await?;
        let token = self.jwt.create_for_account(&account.id_str(), account.role)?;
        info!("registered {} as {}", account.id, account.role);
        Ok((account, token))
    }

    pub async fn current(&self, identity: &Identity) -> AppResult<AccountEntity> {
        self.accounts_repository
            .get(&identity.account_id)
            .await?
            .ok_or(AppError::EntityFailIdNotFound {
                ident: identity.account_id.clone(),
            })
    }

    pub async fn credits(&self, identity: &Identity) -> AppResult<Vec<PointsCreditEntity>> {
        identity.require_role(AccountRole::Picker)?;
        self.points_ledger
            .credits(&identity.account_thing())
            .await
    }
}
